use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::parser::{bin_changed, BinAssignment};

/// Stand-in label for contigs without a bin.
pub const UNBINNED: &str = "(unbinned)";

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Count only contigs whose bin changed.
    pub only_changed: bool,
    /// Leave out every pair with an unbinned side.
    pub hide_unbinned: bool,
}

/// Number of contigs moving from one initial bin to one final bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub initial: String,
    #[serde(rename = "final")]
    pub final_bin: String,
    pub count: usize,
}

/// How contigs move between the bins of two binning snapshots,
/// sorted by initial then final label.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinTransitions {
    pub transitions: Vec<Transition>,
}

impl BinTransitions {
    pub fn compute(
        initial: &BinAssignment,
        final_bins: &BinAssignment,
        node_count: usize,
        opts: TransitionOptions,
    ) -> Self {
        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();

        for node in 0..node_count {
            let from = initial.label(node);
            let to = final_bins.label(node);
            if opts.only_changed && !bin_changed(from, to) {
                continue;
            }
            let from = from.unwrap_or(UNBINNED);
            let to = to.unwrap_or(UNBINNED);
            if opts.hide_unbinned && (from == UNBINNED || to == UNBINNED) {
                continue;
            }
            *counts
                .entry((from.to_string(), to.to_string()))
                .or_insert(0) += 1;
        }

        let transitions = counts
            .into_iter()
            .map(|((initial, final_bin), count)| Transition {
                initial,
                final_bin,
                count,
            })
            .collect();

        BinTransitions { transitions }
    }

    /// Total number of contigs counted.
    pub fn total(&self) -> usize {
        self.transitions.iter().map(|t| t.count).sum()
    }

    pub fn write_tsv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "initial\tfinal\tcount")?;
        for t in self.transitions.iter() {
            writeln!(out, "{}\t{}\t{}", t.initial, t.final_bin, t.count)?;
        }
        Ok(())
    }
}
