use fnv::FnvHashMap;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::graph::ContigGraph;

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One position per node, indexed by node index.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Coordinates {
    points: Vec<Point>,
}

impl Coordinates {
    pub fn from_points(points: Vec<Point>) -> Self {
        Coordinates { points }
    }

    pub fn get(&self, node: usize) -> Option<Point> {
        self.points.get(node).copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(min_x, min_y, max_x, max_y)`, or `None` without points.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(self.points.iter().fold(init, |(x0, y0, x1, y1), p| {
            (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y))
        }))
    }
}

/// Anything that can place the nodes of a contig graph in the plane.
/// Only the topology is used.
pub trait Layout {
    fn layout(&self, graph: &ContigGraph) -> Coordinates;
}

/// Above this many nodes, repulsion only acts between nodes closer
/// than `GRID_CELL`, found through a grid of that cell size.
const GRID_THRESHOLD: usize = 1000;
const GRID_CELL: f64 = 2.0;

#[inline]
fn repel(p: Point, q: Point, acc: &mut (f64, f64)) {
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    let d2 = (dx * dx + dy * dy).max(1e-9);
    acc.0 += dx / d2;
    acc.1 += dy / d2;
}

fn repulsion_exact(pos: &[Point]) -> Vec<(f64, f64)> {
    pos.par_iter()
        .enumerate()
        .map(|(i, &p)| {
            let mut acc = (0.0, 0.0);
            for (j, &q) in pos.iter().enumerate() {
                if i != j {
                    repel(p, q, &mut acc);
                }
            }
            acc
        })
        .collect()
}

fn grid_cell(p: Point) -> (i64, i64) {
    ((p.x / GRID_CELL).floor() as i64, (p.y / GRID_CELL).floor() as i64)
}

fn repulsion_grid(pos: &[Point]) -> Vec<(f64, f64)> {
    let mut grid: FnvHashMap<(i64, i64), Vec<usize>> = FnvHashMap::default();
    for (i, &p) in pos.iter().enumerate() {
        grid.entry(grid_cell(p)).or_default().push(i);
    }

    pos.par_iter()
        .enumerate()
        .map(|(i, &p)| {
            let (cx, cy) = grid_cell(p);
            let mut acc = (0.0, 0.0);
            for gx in cx - 1..=cx + 1 {
                for gy in cy - 1..=cy + 1 {
                    let members = match grid.get(&(gx, gy)) {
                        Some(members) => members,
                        None => continue,
                    };
                    for &j in members {
                        let q = pos[j];
                        let d2 = (p.x - q.x).powi(2) + (p.y - q.y).powi(2);
                        if i != j && d2 < GRID_CELL * GRID_CELL {
                            repel(p, q, &mut acc);
                        }
                    }
                }
            }
            acc
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FruchtermanReingold {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for FruchtermanReingold {
    fn default() -> Self {
        FruchtermanReingold {
            iterations: 500,
            seed: 1_234_567,
        }
    }
}

impl FruchtermanReingold {
    pub fn new(iterations: usize, seed: u64) -> Self {
        FruchtermanReingold { iterations, seed }
    }
}

impl Layout for FruchtermanReingold {
    /// Spring embedder with unit ideal edge length: nodes repel with
    /// force `1/d`, edges attract with `d^2`, and the maximum step
    /// cools linearly to zero. Large graphs use grid-limited
    /// repulsion. Seeded, so the same graph always gets the same
    /// layout.
    fn layout(&self, graph: &ContigGraph) -> Coordinates {
        let n = graph.node_count();
        if n == 0 {
            return Coordinates::default();
        }
        if n == 1 {
            return Coordinates::from_points(vec![Point::default()]);
        }

        let side = (n as f64).sqrt();
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(self.seed);
        let mut pos: Vec<Point> = (0..n)
            .map(|_| Point {
                x: rng.gen_range(-side / 2.0..side / 2.0),
                y: rng.gen_range(-side / 2.0..side / 2.0),
            })
            .collect();

        let start_temp = side / 10.0 + 0.1;

        for iter in 0..self.iterations {
            let temp = start_temp * (1.0 - iter as f64 / self.iterations as f64);

            let mut disp = if n > GRID_THRESHOLD {
                repulsion_grid(&pos)
            } else {
                repulsion_exact(&pos)
            };

            for &(u, v) in graph.edges() {
                let ddx = pos[u].x - pos[v].x;
                let ddy = pos[u].y - pos[v].y;
                let d = (ddx * ddx + ddy * ddy).sqrt();
                disp[u].0 -= ddx * d;
                disp[u].1 -= ddy * d;
                disp[v].0 += ddx * d;
                disp[v].1 += ddy * d;
            }

            for (p, (dx, dy)) in pos.iter_mut().zip(disp) {
                let len = (dx * dx + dy * dy).sqrt();
                if len > temp {
                    p.x += dx / len * temp;
                    p.y += dy / len * temp;
                } else {
                    p.x += dx;
                    p.y += dy;
                }
            }
        }

        debug!("Laid out {} nodes in {} iterations", n, self.iterations);
        Coordinates::from_points(pos)
    }
}
