use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tangle::config::CycleConfig;
use tangle::cycles;
use tangle::graph::{DependencyGraph, GraphPolicy};
use tangle::{CircularAnalyzer, DependencyEdge, DependencyKind, DependencyStrength};

/// Every ordered pair of `n` modules, a worst case for cycle enumeration.
fn complete_graph(n: usize) -> Vec<DependencyEdge> {
    let mut edges = Vec::with_capacity(n * n);
    for a in 0..n {
        for b in 0..n {
            if a != b {
                edges.push(DependencyEdge::new(
                    format!("m{a}"),
                    format!("m{b}"),
                    DependencyKind::Import,
                    DependencyStrength::Strong,
                    "go",
                ));
            }
        }
    }
    edges
}

/// `rings` disjoint rings of `size` modules plus a chord per ring.
fn rings(rings: usize, size: usize) -> Vec<DependencyEdge> {
    let mut edges = Vec::new();
    for r in 0..rings {
        let id = |i: usize| format!("r{r}/m{}", i % size);
        for i in 0..size {
            edges.push(DependencyEdge::new(
                id(i),
                id(i + 1),
                DependencyKind::Call,
                DependencyStrength::Weak,
                "python",
            ));
        }
        edges.push(DependencyEdge::new(
            id(size / 2),
            id(0),
            DependencyKind::Import,
            DependencyStrength::Strong,
            "python",
        ));
    }
    edges
}

fn bench_detect_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_dense");
    let config = CycleConfig::default();
    for n in [6, 8, 12] {
        let edges = complete_graph(n);
        let graph = DependencyGraph::forward(&[], &edges, GraphPolicy::default());
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, graph| {
            b.iter(|| cycles::detect(black_box(graph), &config));
        });
    }
    group.finish();
}

fn bench_analyze_rings(c: &mut Criterion) {
    let config = CycleConfig::default();
    let analyzer = CircularAnalyzer::new(&config).expect("default config is valid");
    let edges = rings(50, 8);
    c.bench_function("analyze_50_rings", |b| {
        b.iter(|| analyzer.analyze(&[], black_box(&edges)));
    });
}

criterion_group!(benches, bench_detect_dense, bench_analyze_rings);
criterion_main!(benches);
