//! Benchmarks for variable tree queries.
//!
//! Completion runs on every keystroke inside a reference, so parsing the
//! variables file and answering prefix queries should stay well below a
//! millisecond for realistic files.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use placeholder_vars::tree::{PathQuery, VariableTree};
use serde_json::{json, Map, Value};

/// Builds an object `depth` levels deep with `width` keys on every level.
fn generate_tree(width: usize, depth: usize) -> Value {
    if depth == 0 {
        return json!("leaf value");
    }

    let mut map = Map::new();
    for i in 0..width {
        map.insert(format!("key_{}", i), generate_tree(width, depth - 1));
    }
    Value::Object(map)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_variables");

    for width in [4, 8, 16].iter() {
        let text = serde_json::to_string(&generate_tree(*width, 3)).unwrap_or_default();
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &text, |b, text| {
            b.iter(|| VariableTree::parse(black_box(text)))
        });
    }

    group.finish();
}

fn bench_value_at(c: &mut Criterion) {
    let tree = VariableTree::parse(
        &serde_json::to_string(&generate_tree(16, 4)).unwrap_or_default(),
    )
    .unwrap_or_default();
    let path = ["key_15", "key_7", "key_3", "key_0"];

    c.bench_function("value_at_depth_4", |b| {
        b.iter(|| tree.value_at(black_box(&path)))
    });
}

fn bench_candidates(c: &mut Criterion) {
    let tree = VariableTree::parse(
        &serde_json::to_string(&generate_tree(64, 2)).unwrap_or_default(),
    )
    .unwrap_or_default();

    let mut group = c.benchmark_group("completion_candidates");
    for fragment in ["", "key_1", "key_12.", "key_12.key_3"].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", fragment)),
            fragment,
            |b, fragment| b.iter(|| PathQuery::parse(black_box(fragment)).candidates(&tree)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_value_at, bench_candidates);
criterion_main!(benches);
