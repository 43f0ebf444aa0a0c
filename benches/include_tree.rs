//! Benchmarks for include-tree construction and lookup.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use navtree::query::{IncludeArg, IncludeLookup, IncludeTree, IncludeTreeBuilder, Operation, PathExpr, PathParser};

/// `n` root includes, each continued by a two-hop `then_include`.
fn operations(n: usize) -> Vec<Operation> {
    (0..n)
        .flat_map(|i| {
            let root = format!("Collection{}", i % 8);
            [
                Operation::Include(IncludeArg::Expr(PathExpr::members([root.as_str()]).take(10))),
                Operation::ThenInclude(PathExpr::members(["Item", format!("Leaf{}", i).as_str()])),
            ]
        })
        .collect()
}

/// Benchmark parsing dotted string paths.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = PathParser::new();

    group.bench_function("dotted_3", |b| {
        b.iter(|| black_box(parser.parse_str(black_box("CasesAssigned.CaseProducts.Case"))))
    });

    group.bench_function("expr_shaped", |b| {
        let expr = PathExpr::members(["CasesAssigned", "CaseProducts"])
            .order_by("id")
            .then_by_desc("created_at")
            .skip(5)
            .take(10);
        b.iter(|| black_box(parser.parse_expr(black_box(&expr))))
    });

    group.finish();
}

/// Benchmark building trees from operation graphs of increasing size.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let builder = IncludeTreeBuilder::new();

    for size in [1usize, 10, 100] {
        let ops = operations(size);
        group.throughput(Throughput::Elements(ops.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &ops, |b, ops| {
            b.iter(|| black_box(builder.build(ops)))
        });
    }

    group.finish();
}

/// Benchmark lookups, hit and miss.
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let tree = match IncludeTreeBuilder::new().build(&operations(100)) {
        Ok(tree) => tree,
        Err(err) => panic!("benchmark graph is invalid: {}", err),
    };

    group.bench_function("hit_depth_3", |b| {
        b.iter(|| black_box(tree.child("Collection3").child("Item").child("Leaf3")))
    });

    group.bench_function("miss_depth_3", |b| {
        b.iter(|| black_box(tree.child("Missing").child("Item").child("Leaf3")))
    });

    group.bench_function("paths", |b| b.iter(|| black_box(tree.paths())));

    group.bench_function("merge_clone", |b| {
        b.iter(|| {
            let mut merged = IncludeTree::new();
            merged.merge(tree.clone());
            black_box(merged)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_build, bench_lookup);
criterion_main!(benches);
