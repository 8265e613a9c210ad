use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use instrument_core::ast::build::*;
use instrument_core::ast::{BinaryOp, Node, Visibility};
use instrument_core::{BypassPass, InstrumentConfig, TimingPass, ToSource, Traverser};

/// A fragment with `size` classes, each touching members and statics
fn fragment(size: usize) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(size * 3);
    for i in 0..size {
        let class_name = format!("C{i}");
        nodes.push(class(
            &class_name,
            None,
            vec![
                property("value", Visibility::Private, Some(int(i as i64))),
                class_method(
                    "get",
                    Visibility::Public,
                    vec![param("x")],
                    vec![ret(Some(binary(
                        BinaryOp::Add,
                        prop(var("this"), "value"),
                        var("x"),
                    )))],
                ),
            ],
        ));
        nodes.push(stmt(assign(
            var("o"),
            new(&class_name, vec![]),
        )));
        nodes.push(stmt(method(
            var("o"),
            "get",
            vec![static_prop(&class_name, "counter"), class_const(&class_name, "LIMIT")],
        )));
    }
    nodes.push(ret(Some(var("o"))));
    nodes
}

fn bench_passes(c: &mut Criterion) {
    let config = InstrumentConfig::default();
    let mut group = c.benchmark_group("traverse");

    for size in [10, 100, 1000] {
        let nodes = fragment(size);

        group.bench_with_input(BenchmarkId::new("timing", size), &nodes, |b, nodes| {
            let mut traverser = Traverser::new().with_pass(TimingPass::new(&config));
            b.iter(|| traverser.traverse(black_box(nodes.clone())))
        });

        group.bench_with_input(BenchmarkId::new("bypass", size), &nodes, |b, nodes| {
            let mut traverser = Traverser::new().with_pass(BypassPass::new(&config));
            b.iter(|| traverser.traverse(black_box(nodes.clone())))
        });

        group.bench_with_input(BenchmarkId::new("both", size), &nodes, |b, nodes| {
            let mut traverser = Traverser::new()
                .with_pass(BypassPass::new(&config))
                .with_pass(TimingPass::new(&config));
            b.iter(|| traverser.traverse(black_box(nodes.clone())))
        });
    }

    group.finish();
}

fn bench_source_generation(c: &mut Criterion) {
    let nodes = fragment(100);
    c.bench_function("to_source/100", |b| b.iter(|| black_box(&nodes).to_source()));
}

criterion_group!(benches, bench_passes, bench_source_generation);
criterion_main!(benches);
