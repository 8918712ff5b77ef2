// Criterion benchmarks for steno-btree.
//
// Run:
//   cargo bench -p steno-btree

use std::collections::BTreeMap;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use steno_btree::OrderedMap;

const N: u32 = 50_000;

/// Deterministic scattered key order (multiplicative permutation).
fn scattered_keys() -> Vec<u32> {
    (0..N).map(|i| i.wrapping_mul(2_654_435_761) % N).collect()
}

fn stroke_keys() -> Vec<String> {
    (0..N).map(|i| format!("STK{i:05}/-D")).collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_insert(c: &mut Criterion) {
    let keys = scattered_keys();
    let mut group = c.benchmark_group("insert_scattered");
    group.bench_function("ordered_map", |b| {
        b.iter(|| {
            let mut map = OrderedMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            black_box(map.len())
        })
    });
    group.bench_function("std_btreemap", |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            black_box(map.len())
        })
    });
    group.finish();
}

fn bench_sorted_load(c: &mut Criterion) {
    let keys = stroke_keys();
    c.bench_function("extend_sorted_strings", |b| {
        b.iter(|| {
            let mut map = OrderedMap::new();
            map.extend_sorted(keys.iter().map(|k| (k.clone(), ())));
            black_box(map.len())
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let keys = stroke_keys();
    let map: OrderedMap<String, usize> = keys.iter().cloned().zip(0..).collect();
    c.bench_function("lookup_strings", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for k in keys.iter().step_by(7) {
                if map.get(k.as_str()).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

fn bench_remove_all(c: &mut Criterion) {
    let keys = scattered_keys();
    c.bench_function("remove_scattered", |b| {
        b.iter(|| {
            let mut map: OrderedMap<u32, u32> = (0..N).map(|k| (k, k)).collect();
            for &k in &keys {
                map.remove(&k);
            }
            black_box(map.height())
        })
    });
}

criterion_group!(benches, bench_insert, bench_sorted_load, bench_lookup, bench_remove_all);
criterion_main!(benches);
