use std::path::Path;

use log::info;

use crate::config::InputFiles;
use crate::graph::ContigGraph;
use crate::index::ContigIndex;
use crate::palette::Palette;
use crate::parser::{
    read_bin_labels, BinAssignment, ContigPaths, LinkIndex, ParseResult,
    SequenceStats,
};

/// Contig graph reconstructed from the paths and links files, together
/// with the path information it was derived from.
#[derive(Debug, Clone)]
pub struct AssemblyGraph {
    pub paths: ContigPaths,
    pub graph: ContigGraph,
}

impl AssemblyGraph {
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        graph_file: P,
        paths_file: Q,
    ) -> ParseResult<Self> {
        let paths = ContigPaths::parse_file(paths_file)?;
        let links = LinkIndex::parse_file(graph_file)?;
        Self::from_parts(paths, &links)
    }

    pub fn from_parts(paths: ContigPaths, links: &LinkIndex) -> ParseResult<Self> {
        let graph = ContigGraph::build(&paths, links)?;
        Ok(AssemblyGraph { paths, graph })
    }

    pub fn index(&self) -> &ContigIndex {
        &self.paths.index
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Bin palette for a run: every label in the initial binning file.
pub fn load_palette<P: AsRef<Path>>(
    initial: P,
    delimiter: u8,
) -> ParseResult<Palette> {
    let labels = read_bin_labels(initial, delimiter)?;
    let palette = Palette::from_labels(labels);
    info!("Found {} bins in the initial binning result", palette.len());
    Ok(palette)
}

/// Per-node attributes resolved against a built graph.
#[derive(Debug, Clone)]
pub struct Annotations {
    pub initial: BinAssignment,
    pub final_bins: BinAssignment,
    pub sequences: SequenceStats,
    pub degrees: Vec<usize>,
    pub palette: Palette,
}

impl Annotations {
    /// Resolve bins, sequence statistics, degrees and the palette. The
    /// readers only share the immutable index, so they run in
    /// parallel. Without a contigs file every node gets empty
    /// sequence statistics.
    pub fn resolve(
        assembly: &AssemblyGraph,
        inputs: &InputFiles,
    ) -> ParseResult<Self> {
        let index = assembly.index();
        let delimiter = inputs.delimiter;

        let ((initial, final_bins), (sequences, palette)) = rayon::join(
            || {
                rayon::join(
                    || BinAssignment::parse_file(&inputs.initial, delimiter, index),
                    || {
                        BinAssignment::parse_file(
                            &inputs.final_bins,
                            delimiter,
                            index,
                        )
                    },
                )
            },
            || {
                rayon::join(
                    || match &inputs.contigs {
                        Some(contigs) => SequenceStats::parse_file(contigs, index),
                        None => Ok(SequenceStats::empty(index.len())),
                    },
                    || load_palette(&inputs.initial, delimiter),
                )
            },
        );

        Ok(Annotations {
            initial: initial?,
            final_bins: final_bins?,
            sequences: sequences?,
            degrees: assembly.graph.degrees(),
            palette: palette?,
        })
    }
}
