//! Layout benchmarks: diffing, applying and measurement cascades.
//!
//! Run with: cargo bench --bench layout_benchmark

#![allow(missing_docs)] // criterion macros generate undocumented items

use chatlayout::diff::{diff, ItemSnapshot, SectionSnapshot, Snapshot};
use chatlayout::layout::{LayoutEngine, LayoutSettings};
use chatlayout::model::{ItemId, ItemPath, ItemSize, SectionId, Size};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

/// `sections` days of `per_section` estimated messages each.
fn conversation(sections: usize, per_section: usize, tag: &str) -> Snapshot<u64> {
    Snapshot::new(
        (0..sections)
            .map(|s| {
                let items = (0..per_section)
                    .map(|i| {
                        ItemSnapshot::new(
                            ItemId::new(format!("{tag}{s}-{i}")).expect("valid id"),
                            (s * per_section + i) as u64,
                        )
                        .with_size_hint(ItemSize::Estimated(Size::new(300.0, 44.0)))
                    })
                    .collect();
                SectionSnapshot::new(SectionId::new(format!("day{s}")).expect("valid id"), items)
            })
            .collect(),
    )
}

fn loaded(snapshot: &Snapshot<u64>) -> LayoutEngine {
    let mut engine = LayoutEngine::new(LayoutSettings::default());
    let changes = diff(&Snapshot::default(), snapshot).expect("diff");
    engine.apply(&changes).expect("apply");
    engine
}

fn bench_diff_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_append");
    for sections in [10, 100] {
        let old = conversation(sections, 100, "m");
        let mut new = old.clone();
        if let Some(last) = new.sections.last_mut() {
            last.items.push(
                ItemSnapshot::new(ItemId::new("fresh").expect("valid id"), 0)
                    .with_size_hint(ItemSize::Estimated(Size::new(300.0, 44.0))),
            );
        }

        group.bench_with_input(BenchmarkId::from_parameter(sections * 100), &sections, |b, _| {
            b.iter(|| diff(black_box(&old), black_box(&new)).expect("diff"))
        });
    }
    group.finish();
}

fn bench_apply_prepend(c: &mut Criterion) {
    let old = conversation(50, 100, "m");
    let mut new = old.clone();
    new.sections[0].items.insert(
        0,
        ItemSnapshot::new(ItemId::new("history").expect("valid id"), 0)
            .with_size_hint(ItemSize::Estimated(Size::new(300.0, 44.0))),
    );
    let changes = diff(&old, &new).expect("diff");

    c.bench_function("apply_prepend_5000", |b| {
        b.iter_batched(
            || loaded(&old),
            |mut engine| engine.apply(black_box(&changes)).expect("apply"),
            BatchSize::LargeInput,
        )
    });
}

fn bench_measurement_cascade(c: &mut Criterion) {
    let snapshot = conversation(100, 100, "m");

    c.bench_function("measure_first_of_10000", |b| {
        b.iter_batched(
            || loaded(&snapshot),
            |mut engine| {
                engine
                    .report_measured(ItemPath::new(0, 0), Size::new(300.0, 120.0))
                    .expect("measure")
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("frame_lookup_last_of_10000", |b| {
        let engine = loaded(&snapshot);
        b.iter(|| engine.frame(black_box(ItemPath::new(99, 99))))
    });
}

criterion_group!(
    benches,
    bench_diff_append,
    bench_apply_prepend,
    bench_measurement_cascade
);
criterion_main!(benches);
