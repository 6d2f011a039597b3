use boolsearch_core::merge;
use boolsearch_core::DocId;
use criterion::{criterion_group, criterion_main, Criterion};

fn naive_and(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            out.push(a[i]);
            i += 1;
            j += 1;
        } else if a[i] < b[j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

fn bench_intersect(c: &mut Criterion) {
    let long: Vec<DocId> = (0..100_000).collect();
    let sparse: Vec<DocId> = (0..100_000).step_by(997).collect();
    c.bench_function("and_skip_long_sparse", |b| b.iter(|| merge::and(&long, &sparse)));
    c.bench_function("and_naive_long_sparse", |b| b.iter(|| naive_and(&long, &sparse)));
    c.bench_function("or_long_sparse", |b| b.iter(|| merge::or(&long, &sparse)));
    c.bench_function("not_sparse", |b| b.iter(|| merge::not(&sparse, &long)));
}

criterion_group!(benches, bench_intersect);
criterion_main!(benches);
