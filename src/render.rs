use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use log::{info, warn};

use crate::config::{ImageFormat, RenderConfig};
use crate::export::Snapshot;
use crate::graph::ContigGraph;
use crate::layout::{Coordinates, Point};
use crate::palette::{Colour, Palette};
use crate::parser::{is_unbinned_label, BinAssignment};
use crate::pipeline::{Annotations, AssemblyGraph};

const BACKGROUND: Colour = Colour::rgb(0xff, 0xff, 0xff);
const EDGE_COLOUR: Colour = Colour::rgb(0x80, 0x80, 0x80);
const OUTLINE_COLOUR: Colour = Colour::rgb(0x33, 0x33, 0x33);
const TEXT_COLOUR: Colour = Colour::rgb(0x00, 0x00, 0x00);

/// Fill colour of every node for one snapshot. In the final snapshot,
/// labels such as `unbinned` count as no bin at all.
pub fn node_colours(
    snapshot: Snapshot,
    bins: &BinAssignment,
    palette: &Palette,
    node_count: usize,
) -> Vec<Colour> {
    let mut unknown = 0usize;
    let colours = (0..node_count)
        .map(|node| {
            let label = match (snapshot, bins.label(node)) {
                (Snapshot::Final, Some(l)) if is_unbinned_label(l) => None,
                (_, label) => label,
            };
            if let Some(l) = label {
                if palette.get(l).is_none() {
                    unknown += 1;
                }
            }
            palette.colour_of(label)
        })
        .collect();
    if unknown > 0 {
        warn!(
            "{} contigs have a bin that is not in the initial binning result",
            unknown
        );
    }
    colours
}

/// What gets drawn: the graph, where each node sits, its label and its
/// fill colour.
pub struct Scene<'a> {
    pub graph: &'a ContigGraph,
    pub coords: &'a Coordinates,
    pub labels: Vec<String>,
    pub colours: Vec<Colour>,
}

impl<'a> Scene<'a> {
    pub fn new(
        assembly: &'a AssemblyGraph,
        ann: &Annotations,
        coords: &'a Coordinates,
        snapshot: Snapshot,
    ) -> Result<Self> {
        let n = assembly.node_count();
        let labels = (0..n)
            .map(|node| assembly.index().node_name(node))
            .collect::<Result<Vec<_>, _>>()?;
        let colours = node_colours(snapshot, snapshot.bins(ann), &ann.palette, n);
        Ok(Scene {
            graph: &assembly.graph,
            coords,
            labels,
            colours,
        })
    }
}

/// Maps layout coordinates onto the image, keeping every disc inside
/// the margin. Layout axes with no extent are centred.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Projection {
    min: Point,
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    fn new(coords: &Coordinates, config: &RenderConfig) -> Self {
        let pad = config.margin as f64 + config.vertex_radius();
        let avail_w = (config.width as f64 - 2.0 * pad).max(0.0);
        let avail_h = (config.height as f64 - 2.0 * pad).max(0.0);
        let (x0, y0, x1, y1) = coords.bounds().unwrap_or((0.0, 0.0, 0.0, 0.0));

        let axis = |lo: f64, hi: f64, avail: f64| {
            if hi > lo {
                (avail / (hi - lo), pad)
            } else {
                (0.0, pad + avail / 2.0)
            }
        };
        let (scale_x, offset_x) = axis(x0, x1, avail_w);
        let (scale_y, offset_y) = axis(y0, y1, avail_h);

        Projection {
            min: Point { x: x0, y: y0 },
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        }
    }

    fn project(&self, p: Point) -> (f64, f64) {
        (
            self.offset_x + (p.x - self.min.x) * self.scale_x,
            self.offset_y + (p.y - self.min.y) * self.scale_y,
        )
    }
}

fn pixel(c: Colour) -> Rgb<u8> {
    Rgb([c.r, c.g, c.b])
}

fn put(image: &mut RgbImage, x: i64, y: i64, c: Colour) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, pixel(c));
    }
}

fn draw_line(image: &mut RgbImage, from: (f64, f64), to: (f64, f64), c: Colour) {
    let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(image, x0, y0, c);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_disc(image: &mut RgbImage, centre: (f64, f64), radius: f64, fill: Colour) {
    let (cx, cy) = centre;
    let r = radius.ceil() as i64;
    let inner = (radius - 1.0).max(0.0);
    for dy in -r..=r {
        for dx in -r..=r {
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if d > radius {
                continue;
            }
            let c = if d > inner { OUTLINE_COLOUR } else { fill };
            put(image, cx.round() as i64 + dx, cy.round() as i64 + dy, c);
        }
    }
}

/// 5x8 glyphs for the characters of node names.
fn glyph(c: char) -> Option<[u8; 8]> {
    let g = match c {
        'N' => [0x88, 0xC8, 0xA8, 0x98, 0x88, 0x88, 0x88, 0x00],
        'O' => [0x70, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70, 0x00],
        'D' => [0xE0, 0x90, 0x88, 0x88, 0x88, 0x90, 0xE0, 0x00],
        'E' => [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0xF8, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8, 0x00],
        '0' => [0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70, 0x00],
        '1' => [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00],
        '2' => [0x70, 0x88, 0x08, 0x30, 0x40, 0x80, 0xF8, 0x00],
        '3' => [0xF8, 0x10, 0x20, 0x10, 0x08, 0x88, 0x70, 0x00],
        '4' => [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10, 0x00],
        '5' => [0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70, 0x00],
        '6' => [0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70, 0x00],
        '7' => [0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40, 0x00],
        '8' => [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70, 0x00],
        '9' => [0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60, 0x00],
        _ => return None,
    };
    Some(g)
}

fn write_char(image: &mut RgbImage, base_x: i64, base_y: i64, data: &[u8; 8], ratio: i64) {
    for (j, row) in data.iter().enumerate() {
        let y = base_y + j as i64 * ratio;
        for z in (0..8).rev() {
            if (row >> z) & 1 == 1 {
                let x = base_x + (7 - z) as i64 * ratio;
                for rx in 0..ratio {
                    for ry in 0..ratio {
                        put(image, x + rx, y + ry, TEXT_COLOUR);
                    }
                }
            }
        }
    }
}

fn write_text(image: &mut RgbImage, x: i64, y: i64, text: &str, ratio: i64) {
    for (i, c) in text.chars().enumerate() {
        if let Some(g) = glyph(c) {
            write_char(image, x + i as i64 * 6 * ratio, y, &g, ratio);
        }
    }
}

/// Draw the scene into an RGB image: edges first, then the nodes, each
/// with its name to the right.
pub fn draw_raster(scene: &Scene<'_>, config: &RenderConfig) -> RgbImage {
    let mut image = RgbImage::from_pixel(config.width, config.height, pixel(BACKGROUND));
    let proj = Projection::new(scene.coords, config);
    let radius = config.vertex_radius();
    let ratio = (config.label_height() / 8.0).round().max(1.0) as i64;

    let at = |node: usize| proj.project(scene.coords.get(node).unwrap_or_default());

    for &(u, v) in scene.graph.edges() {
        draw_line(&mut image, at(u), at(v), EDGE_COLOUR);
    }
    for (node, &fill) in scene.colours.iter().enumerate() {
        draw_disc(&mut image, at(node), radius, fill);
    }
    for (node, label) in scene.labels.iter().enumerate() {
        let (x, y) = at(node);
        let lx = (x + radius).round() as i64 + ratio;
        let ly = y.round() as i64 - 4 * ratio;
        write_text(&mut image, lx, ly, label, ratio);
    }
    image
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Same picture as `draw_raster`, as SVG with real text labels.
pub fn draw_svg(scene: &Scene<'_>, config: &RenderConfig) -> String {
    let proj = Projection::new(scene.coords, config);
    let radius = config.vertex_radius();
    let font_size = config.label_height();
    let at = |node: usize| proj.project(scene.coords.get(node).unwrap_or_default());

    let mut svg = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<style>
  .label {{ font-family: 'DejaVu Sans', sans-serif; font-size: {f:.1}px; }}
</style>
<rect width="100%" height="100%" fill="{bg}"/>
"#,
        w = config.width,
        h = config.height,
        f = font_size,
        bg = BACKGROUND
    );

    for &(u, v) in scene.graph.edges() {
        let (x1, y1) = at(u);
        let (x2, y2) = at(v);
        svg.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}"/>"#,
            x1, y1, x2, y2, EDGE_COLOUR
        ));
        svg.push('\n');
    }
    for (node, fill) in scene.colours.iter().enumerate() {
        let (x, y) = at(node);
        svg.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}"/>"#,
            x, y, radius, fill, OUTLINE_COLOUR
        ));
        svg.push('\n');
    }
    for (node, label) in scene.labels.iter().enumerate() {
        let (x, y) = at(node);
        svg.push_str(&format!(
            r#"<text class="label" x="{:.2}" y="{:.2}" dominant-baseline="middle" fill="{}">{}</text>"#,
            x + radius + 2.0,
            y,
            TEXT_COLOUR,
            escape_xml(label)
        ));
        svg.push('\n');
    }
    svg.push_str("</svg>\n");
    svg
}

/// Render the scene and write it to `path` in `config.format`.
pub fn save_scene<P: AsRef<Path>>(
    scene: &Scene<'_>,
    config: &RenderConfig,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    match config.format {
        ImageFormat::Svg => {
            let file = File::create(path)
                .with_context(|| format!("Could not create {:?}", path))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(draw_svg(scene, config).as_bytes())?;
            writer.flush()?;
        }
        ImageFormat::Png | ImageFormat::Jpeg => {
            let format = if config.format == ImageFormat::Png {
                image::ImageFormat::Png
            } else {
                image::ImageFormat::Jpeg
            };
            draw_raster(scene, config)
                .save_with_format(path, format)
                .with_context(|| format!("Could not write image {:?}", path))?;
        }
    }
    info!("Saved {:?}", path);
    Ok(())
}
