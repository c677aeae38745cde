use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::contig::ContigNumber;
use crate::graph::ContigGraph;
use crate::layout::Coordinates;
use crate::palette::{Colour, Palette, UNBINNED_COLOUR};
use crate::parser::{bin_changed, BinAssignment};
use crate::pipeline::{AssemblyGraph, Annotations};
use crate::transitions::UNBINNED;

/// Which binning snapshot a view is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Initial,
    Final,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot::Final
    }
}

impl Snapshot {
    pub fn bins<'a>(&self, ann: &'a Annotations) -> &'a BinAssignment {
        match self {
            Snapshot::Initial => &ann.initial,
            Snapshot::Final => &ann.final_bins,
        }
    }
}

/// Restricts an export to a subset of nodes. The default keeps
/// everything.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct NodeFilter {
    /// Snapshot used by `bin` and `hide_unbinned`.
    pub snapshot: Snapshot,
    /// Keep only nodes in this bin.
    pub bin: Option<String>,
    pub hide_unbinned: bool,
    pub only_changed: bool,
    /// Keep only nodes within `k` edges of this contig.
    pub k_hop: Option<(ContigNumber, usize)>,
    /// Drop tips and isolated nodes (degree 0 or 1).
    pub collapse_tips: bool,
}

impl NodeFilter {
    /// Visibility of every node, by index.
    pub fn visible(
        &self,
        assembly: &AssemblyGraph,
        ann: &Annotations,
    ) -> Result<Vec<bool>> {
        let n = assembly.node_count();
        let bins = self.snapshot.bins(ann);

        let hood = match self.k_hop {
            Some((contig, k)) => {
                let start = assembly.index().node_of(contig)?;
                Some(assembly.graph.k_hop(start, k))
            }
            None => None,
        };

        Ok((0..n)
            .map(|node| {
                let label = bins.label(node);
                if self.hide_unbinned && label.map_or(true, str::is_empty) {
                    return false;
                }
                if self.only_changed
                    && !bin_changed(ann.initial.label(node), ann.final_bins.label(node))
                {
                    return false;
                }
                if let Some(bin) = &self.bin {
                    if label != Some(bin.as_str()) {
                        return false;
                    }
                }
                if let Some(hood) = &hood {
                    if !hood.contains(&node) {
                        return false;
                    }
                }
                if self.collapse_tips && assembly.graph.degree(node) <= 1 {
                    return false;
                }
                true
            })
            .collect())
    }
}

/// One contig in the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub len: usize,
    pub gc: Option<f64>,
    pub initial_bin: Option<String>,
    pub final_bin: Option<String>,
    pub changed: bool,
    pub degree: usize,
    pub cov: Option<f64>,
}

/// Everything an interactive viewer needs, in one JSON document.
/// Edges name their endpoints by node id, not by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveGraph {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<[String; 2]>,
    pub bin_colors: Palette,
    pub unbinned_color: Colour,
}

impl InteractiveGraph {
    pub fn build(
        assembly: &AssemblyGraph,
        ann: &Annotations,
        coords: &Coordinates,
    ) -> Result<Self> {
        Self::build_filtered(assembly, ann, coords, &NodeFilter::default())
    }

    /// Build the export from the nodes `filter` keeps, and the edges
    /// between them. Nodes stay in index order.
    pub fn build_filtered(
        assembly: &AssemblyGraph,
        ann: &Annotations,
        coords: &Coordinates,
        filter: &NodeFilter,
    ) -> Result<Self> {
        let index = assembly.index();
        let visible = filter.visible(assembly, ann)?;

        let mut nodes = Vec::new();
        for node in (0..visible.len()).filter(|&node| visible[node]) {
            let point = coords
                .get(node)
                .with_context(|| format!("No layout position for node {}", node))?;
            let initial_bin = ann.initial.label(node).map(String::from);
            let final_bin = ann.final_bins.label(node).map(String::from);
            nodes.push(NodeRecord {
                id: index.node_name(node)?,
                x: point.x,
                y: point.y,
                len: ann.sequences.length(node),
                gc: ann.sequences.gc_percent(node),
                changed: bin_changed(initial_bin.as_deref(), final_bin.as_deref()),
                initial_bin,
                final_bin,
                degree: ann.degrees.get(node).copied().unwrap_or(0),
                cov: ann.sequences.coverage(node),
            });
        }

        let mut edges = Vec::new();
        for &(u, v) in assembly.graph.edges() {
            if visible[u] && visible[v] {
                edges.push([index.node_name(u)?, index.node_name(v)?]);
            }
        }

        Ok(InteractiveGraph {
            nodes,
            edges,
            bin_colors: ann.palette.clone(),
            unbinned_color: UNBINNED_COLOUR,
        })
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Could not create {:?}", path))?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer.flush()?;
        info!(
            "Wrote {} nodes and {} edges to {:?}",
            self.nodes.len(),
            self.edges.len(),
            path
        );
        Ok(())
    }
}

/// Bin labels of a node's neighbours with their counts, most common
/// first (ties by label), at most five.
pub fn neighbour_bin_mix(
    graph: &ContigGraph,
    bins: &BinAssignment,
    node: usize,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &other in graph.neighbours(node) {
        *counts.entry(bins.label(other).unwrap_or(UNBINNED)).or_insert(0) += 1;
    }
    let mut mix: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    mix.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    mix.truncate(5);
    mix
}

/// Plain-text description of one contig.
pub fn describe_node(
    assembly: &AssemblyGraph,
    ann: &Annotations,
    contig: ContigNumber,
    snapshot: Snapshot,
) -> Result<String> {
    use std::fmt::Write as _;

    let node = assembly.index().node_of(contig)?;
    let fmt_opt = |v: Option<f64>| match v {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    };
    let mix = neighbour_bin_mix(&assembly.graph, snapshot.bins(ann), node)
        .into_iter()
        .map(|(label, count)| format!("{}:{}", label, count))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    writeln!(out, "{}", contig.node_name())?;
    writeln!(out, "length: {}bp", ann.sequences.length(node))?;
    writeln!(out, "GC%: {}", fmt_opt(ann.sequences.gc_percent(node)))?;
    writeln!(out, "coverage: {}", fmt_opt(ann.sequences.coverage(node)))?;
    writeln!(out, "degree: {}", assembly.graph.degree(node))?;
    writeln!(out, "initial: {}", ann.initial.label(node).unwrap_or(UNBINNED))?;
    writeln!(out, "final: {}", ann.final_bins.label(node).unwrap_or(UNBINNED))?;
    writeln!(
        out,
        "adjacent bins: {}",
        if mix.is_empty() { "n/a" } else { &mix }
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;
    use crate::parser::{ContigPaths, LinkIndex, SequenceStats};

    fn assembly() -> AssemblyGraph {
        let paths = "NODE_1_length_8
1+
NODE_2_length_8
2+
NODE_3_length_8
3+
NODE_4_length_8
4+
";
        let links = "L\t1\t+\t2\t+\t0M
L\t2\t+\t3\t+\t0M
";
        let paths = ContigPaths::parse_reader(paths.as_bytes()).unwrap();
        let links = LinkIndex::parse_reader(links.as_bytes()).unwrap();
        AssemblyGraph::from_parts(paths, &links).unwrap()
    }

    fn labels(l: &[Option<&str>]) -> BinAssignment {
        BinAssignment::from_labels(l.iter().map(|s| s.map(String::from)).collect())
    }

    fn annotations(assembly: &AssemblyGraph) -> Annotations {
        let fasta = ">NODE_1_length_8_cov_16.379288\nGGCCAATT\n>NODE_2_length_0\n";
        Annotations {
            initial: labels(&[Some("binA"), Some("binA"), None, None]),
            final_bins: labels(&[Some("binA"), None, Some("binB"), None]),
            sequences: SequenceStats::parse_reader(fasta.as_bytes(), assembly.index())
                .unwrap(),
            degrees: assembly.graph.degrees(),
            palette: Palette::from_labels(vec!["binA", "binA"]),
        }
    }

    fn coords(n: usize) -> Coordinates {
        Coordinates::from_points(
            (0..n).map(|i| Point { x: i as f64, y: -(i as f64) }).collect(),
        )
    }

    #[test]
    fn builds_full_export() {
        let assembly = assembly();
        let ann = annotations(&assembly);
        let export = InteractiveGraph::build(&assembly, &ann, &coords(4)).unwrap();

        assert_eq!(export.nodes.len(), 4);
        let n1 = &export.nodes[0];
        assert_eq!(n1.id, "NODE_1");
        assert_eq!(n1.len, 8);
        assert_eq!(n1.gc, Some(50.0));
        assert_eq!(n1.cov, Some(16.379288));
        assert!(!n1.changed);
        assert_eq!(n1.degree, 1);

        let n2 = &export.nodes[1];
        assert_eq!(n2.gc, None);
        assert_eq!(n2.initial_bin.as_deref(), Some("binA"));
        assert_eq!(n2.final_bin, None);
        assert!(n2.changed);

        assert!(!export.nodes[3].changed);
        assert_eq!(export.nodes[3].len, 0);

        assert_eq!(
            export.edges,
            vec![
                ["NODE_1".to_string(), "NODE_2".to_string()],
                ["NODE_2".to_string(), "NODE_3".to_string()],
            ]
        );
    }

    #[test]
    fn json_layout() {
        let assembly = assembly();
        let ann = annotations(&assembly);
        let export = InteractiveGraph::build(&assembly, &ann, &coords(4)).unwrap();
        let mut out = Vec::new();
        export.write_json(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["unbinned_color"], "#d3d3d3");
        assert_eq!(value["bin_colors"]["binA"], "#e6194b");
        assert_eq!(value["edges"][0][1], "NODE_2");
        assert_eq!(value["nodes"][1]["final_bin"], serde_json::Value::Null);
        assert_eq!(value["nodes"][0]["x"], 0.0);
        assert_eq!(value["nodes"][2]["y"], -2.0);
    }

    #[test]
    fn filters_select_induced_subgraphs() {
        let assembly = assembly();
        let ann = annotations(&assembly);
        let c = coords(4);

        let filter = NodeFilter {
            hide_unbinned: true,
            snapshot: Snapshot::Initial,
            ..Default::default()
        };
        let export = InteractiveGraph::build_filtered(&assembly, &ann, &c, &filter).unwrap();
        let ids: Vec<_> = export.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["NODE_1", "NODE_2"]);
        assert_eq!(export.edges.len(), 1);

        let filter = NodeFilter {
            k_hop: Some((ContigNumber(3), 1)),
            ..Default::default()
        };
        let export = InteractiveGraph::build_filtered(&assembly, &ann, &c, &filter).unwrap();
        let ids: Vec<_> = export.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["NODE_2", "NODE_3"]);

        let filter = NodeFilter {
            only_changed: true,
            ..Default::default()
        };
        let export = InteractiveGraph::build_filtered(&assembly, &ann, &c, &filter).unwrap();
        let ids: Vec<_> = export.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["NODE_2", "NODE_3"]);

        let filter = NodeFilter {
            collapse_tips: true,
            ..Default::default()
        };
        let export = InteractiveGraph::build_filtered(&assembly, &ann, &c, &filter).unwrap();
        assert_eq!(export.nodes.len(), 1);
        assert!(export.edges.is_empty());

        let filter = NodeFilter {
            bin: Some("binB".to_string()),
            ..Default::default()
        };
        let export = InteractiveGraph::build_filtered(&assembly, &ann, &c, &filter).unwrap();
        assert_eq!(export.nodes[0].id, "NODE_3");

        let filter = NodeFilter {
            k_hop: Some((ContigNumber(99), 1)),
            ..Default::default()
        };
        assert!(InteractiveGraph::build_filtered(&assembly, &ann, &c, &filter).is_err());
    }

    #[test]
    fn empty_labels_count_as_unbinned() {
        let assembly = assembly();
        let mut ann = annotations(&assembly);
        ann.final_bins = labels(&[Some(""), Some("binA"), None, Some("binB")]);
        let filter = NodeFilter {
            hide_unbinned: true,
            ..Default::default()
        };
        let export =
            InteractiveGraph::build_filtered(&assembly, &ann, &coords(4), &filter).unwrap();
        let ids: Vec<_> = export.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["NODE_2", "NODE_4"]);
    }

    #[test]
    fn neighbour_mix_and_description() {
        let assembly = assembly();
        let ann = annotations(&assembly);

        let mix = neighbour_bin_mix(&assembly.graph, &ann.final_bins, 1);
        assert_eq!(
            mix,
            vec![("binA".to_string(), 1), ("binB".to_string(), 1)]
        );
        assert!(neighbour_bin_mix(&assembly.graph, &ann.final_bins, 3).is_empty());

        let text = describe_node(&assembly, &ann, ContigNumber(2), Snapshot::Final).unwrap();
        assert!(text.starts_with("NODE_2\n"));
        assert!(text.contains("GC%: n/a"));
        assert!(text.contains("initial: binA"));
        assert!(text.contains("final: (unbinned)"));
        assert!(text.contains("adjacent bins: binA:1, binB:1"));
    }
}
