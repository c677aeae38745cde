//! Reconstruct the contig-level assembly graph of a SPAdes assembly from
//! its GFA links and `contigs.paths`, annotate it with two binning
//! results, and draw or export it.

pub mod config;
pub mod contig;
pub mod export;
pub mod graph;
pub mod index;
pub mod layout;
pub mod palette;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod segment;
pub mod transitions;

pub use crate::contig::ContigNumber;
pub use crate::graph::ContigGraph;
pub use crate::index::ContigIndex;
pub use crate::pipeline::{Annotations, AssemblyGraph};
