use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Paths of the input files of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFiles {
    /// Assembly graph in GFA format (`assembly_graph_with_scaffolds.gfa`).
    pub graph: PathBuf,
    /// Contig paths (`contigs.paths`).
    pub paths: PathBuf,
    /// Contig sequences (`contigs.fasta`), needed for the export only.
    pub contigs: Option<PathBuf>,
    pub initial: PathBuf,
    pub final_bins: PathBuf,
    /// Column delimiter of both binning files.
    pub delimiter: u8,
}

/// Parse a delimiter given on the command line. Accepts a single
/// character or one of `tab`, `\t`, `comma`, `space`, `semicolon`.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    let d = match s {
        "tab" | "\\t" | "\t" => b'\t',
        "comma" => b',',
        "space" => b' ',
        "semicolon" => b';',
        _ => {
            let bytes = s.as_bytes();
            if bytes.len() != 1 {
                bail!("Delimiter must be a single character, got `{}`", s);
            }
            bytes[0]
        }
    };
    Ok(d)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Svg => "svg",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "svg" => Ok(ImageFormat::Svg),
            other => bail!("Unsupported image type `{}` (use png, jpg or svg)", other),
        }
    }
}

/// How images are drawn. Sizes of vertices and labels are in points
/// and scale with `dpi`; width, height and margin are in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub vertex_size: f64,
    pub label_size: f64,
    pub margin: u32,
    pub format: ImageFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 2000,
            height: 2000,
            dpi: 300,
            vertex_size: 12.0,
            label_size: 8.0,
            margin: 10,
            format: ImageFormat::Png,
        }
    }
}

impl RenderConfig {
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    /// Radius of a node disc in pixels.
    pub fn vertex_radius(&self) -> f64 {
        (self.points_to_pixels(self.vertex_size) / 2.0).max(1.0)
    }

    /// Label height in pixels.
    pub fn label_height(&self) -> f64 {
        self.points_to_pixels(self.label_size)
    }
}

/// Names of the files a run writes into `dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFiles {
    pub dir: PathBuf,
    pub prefix: String,
}

impl OutputFiles {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str) -> Self {
        OutputFiles {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, name))
    }

    pub fn initial_image(&self, format: ImageFormat) -> PathBuf {
        self.file(&format!("initial_binning_result.{}", format.extension()))
    }

    pub fn final_image(&self, format: ImageFormat) -> PathBuf {
        self.file(&format!(
            "final_GraphBin_binning_result.{}",
            format.extension()
        ))
    }

    pub fn json(&self) -> PathBuf {
        self.file("interactive_graph.json")
    }

    pub fn transitions(&self) -> PathBuf {
        self.file("bin_transitions.tsv")
    }
}
