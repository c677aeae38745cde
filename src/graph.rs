use std::collections::{BTreeSet, VecDeque};

use fnv::FnvHashSet;
use log::{debug, info};

use crate::parser::{ContigPaths, LinkIndex, ParseResult};

/// Simple undirected graph over contig node indices `0..node_count`.
/// Edges are stored once, as `(u, v)` with `u < v`, in sorted order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ContigGraph {
    node_count: usize,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl ContigGraph {
    /// Build a graph from a raw edge list. Self-loops and parallel
    /// edges are dropped.
    pub fn from_edges<I>(node_count: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let edge_set: BTreeSet<(usize, usize)> = edges
            .into_iter()
            .filter(|&(u, v)| u != v && u < node_count && v < node_count)
            .map(|(u, v)| if u < v { (u, v) } else { (v, u) })
            .collect();

        let mut adjacency = vec![Vec::new(); node_count];
        for &(u, v) in edge_set.iter() {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        for neighbours in adjacency.iter_mut() {
            neighbours.sort_unstable();
        }

        ContigGraph {
            node_count,
            edges: edge_set.into_iter().collect(),
            adjacency,
        }
    }

    /// Derive contig adjacency from segment links. For each contig, the
    /// links of both strands of its first and last segment are
    /// followed, and every contig containing a linked segment becomes a
    /// neighbour.
    pub fn build(paths: &ContigPaths, links: &LinkIndex) -> ParseResult<Self> {
        let node_count = paths.node_count();
        let mut edges = Vec::new();

        for (i, contig) in paths.index.iter() {
            let ends = match paths.endpoints_of(contig) {
                Some(ends) => ends,
                None => continue,
            };

            let start_rev = ends.start.flipped();
            let end_rev = ends.end.flipped();
            let linked: FnvHashSet<_> = [&ends.start, &start_rev, &ends.end, &end_rev]
                .iter()
                .flat_map(|seg| links.neighbours(seg))
                .collect();

            for segment in linked {
                for other in paths.membership.contigs_of(segment) {
                    let j = paths.index.node_of(other)?;
                    if i != j {
                        edges.push((i, j));
                    }
                }
            }
        }

        debug!("Collected {} raw contig edges", edges.len());
        let graph = Self::from_edges(node_count, edges);
        info!(
            "Built contig graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn neighbours(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.neighbours(u).binary_search(&v).is_ok()
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbours(node).len()
    }

    /// Degree of every node, in index order.
    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency.iter().map(|n| n.len()).collect()
    }

    /// Nodes at most `k` edges away from `start`, including `start`.
    /// Empty if `start` isn't a node.
    pub fn k_hop(&self, start: usize, k: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        if start >= self.node_count {
            return seen;
        }
        seen.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back((start, 0));
        while let Some((node, dist)) = queue.pop_front() {
            if dist == k {
                continue;
            }
            for &next in self.neighbours(node) {
                if seen.insert(next) {
                    queue.push_back((next, dist + 1));
                }
            }
        }
        seen
    }
}
