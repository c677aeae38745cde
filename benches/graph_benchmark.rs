use std::fmt::Write;

use graphbin_vis::layout::{FruchtermanReingold, Layout};
use graphbin_vis::parser::{ContigPaths, LinkIndex};
use graphbin_vis::AssemblyGraph;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// A `contigs.paths` file with `n` contigs of two segments each, and a
/// GFA links file joining every contig to the next two.
fn synthetic_inputs(n: usize) -> (String, String) {
    let mut paths = String::new();
    let mut links = String::new();
    for i in 1..=n {
        let (a, b) = (2 * i - 1, 2 * i);
        writeln!(paths, "NODE_{}_length_{}_cov_{}.5", i, 100 + i, i % 40).unwrap();
        writeln!(paths, "{}+,{}+", a, b).unwrap();
        writeln!(paths, "NODE_{}_length_{}_cov_{}.5'", i, 100 + i, i % 40).unwrap();
        writeln!(paths, "{}-,{}-", b, a).unwrap();
        for step in 1..=2 {
            let next = i + step;
            if next <= n {
                writeln!(links, "L\t{}\t+\t{}\t+\t55M", b, 2 * next - 1).unwrap();
            }
        }
    }
    (paths, links)
}

fn build_graph(paths: &str, links: &str) -> AssemblyGraph {
    let paths = ContigPaths::parse_reader(paths.as_bytes()).unwrap();
    let links = LinkIndex::parse_reader(links.as_bytes()).unwrap();
    AssemblyGraph::from_parts(paths, &links).unwrap()
}

macro_rules! bench_build {
    ($name:ident, $n:literal) => {
        fn $name(c: &mut Criterion) {
            let inputs = synthetic_inputs($n);
            c.bench_with_input(
                BenchmarkId::new("build_graph", $n),
                &inputs,
                |b, (p, l)| {
                    b.iter(|| build_graph(p, l));
                },
            );
        }
    };
}

macro_rules! bench_layout {
    ($name:ident, $n:literal) => {
        fn $name(c: &mut Criterion) {
            let (p, l) = synthetic_inputs($n);
            let assembly = build_graph(&p, &l);
            let fr = FruchtermanReingold::new(50, 1);
            c.bench_with_input(
                BenchmarkId::new("layout", $n),
                &assembly,
                |b, a| {
                    b.iter(|| fr.layout(&a.graph));
                },
            );
        }
    };
}

bench_build!(build_1k, 1000);
bench_build!(build_10k, 10000);

bench_layout!(layout_200, 200);
bench_layout!(layout_1k, 1000);

criterion_group!(
    name = build_benches;
    config = Criterion::default().sample_size(25);
    targets = build_1k, build_10k
);

criterion_group!(
    name = layout_benches;
    config = Criterion::default().sample_size(10);
    targets = layout_200, layout_1k
);

criterion_main!(build_benches, layout_benches);
