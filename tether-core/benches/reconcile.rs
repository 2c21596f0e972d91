//! Keyed list reconciliation benchmarks.

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tether_core::data::{Array, ReactiveArray, Value};
use tether_core::reactive::Runtime;
use tether_core::render::{
    diff_keys, HostTree, ItemContext, KeyedList, ListKey, MemoryTree, Rendered,
};

fn mount(rt: &Runtime, len: usize) -> (ReactiveArray, KeyedList<MemoryTree>) {
    let tree = Rc::new(MemoryTree::new());
    let root = tree.create_element("ul");
    let anchor = tree.create_placeholder("each");
    tree.append_child(root, anchor);

    let items = ReactiveArray::new(rt, (0..len).collect::<Array>());
    let source = items.clone();
    let t = tree.clone();
    let list = KeyedList::mount_keyed(
        rt,
        tree,
        anchor,
        move || Value::from(source.clone()),
        |item: &Value, _| Ok(item.clone()),
        move |ctx: &ItemContext| Rendered::new(t.create_text(&ctx.item.get_untracked().to_string())),
    );
    (items, list)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for len in [100usize, 1_000] {
        group.bench_with_input(BenchmarkId::new("rotate", len), &len, |b, &len| {
            let rt = Runtime::new();
            let (items, _list) = mount(&rt, len);
            b.iter(|| {
                let first = items.shift();
                items.push(first);
                rt.flush_sync();
            });
        });

        group.bench_with_input(BenchmarkId::new("reverse", len), &len, |b, &len| {
            let rt = Runtime::new();
            let (items, _list) = mount(&rt, len);
            b.iter(|| {
                items.reverse();
                rt.flush_sync();
            });
        });
    }

    group.finish();
}

fn bench_diff_keys(c: &mut Criterion) {
    let old: Vec<ListKey> = (0..1_000).map(ListKey::Int).collect();
    let new: Vec<ListKey> = (500..1_500).map(ListKey::Int).collect();

    c.bench_function("diff_keys_1000", |b| {
        b.iter(|| diff_keys(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, bench_reconcile, bench_diff_keys);
criterion_main!(benches);
