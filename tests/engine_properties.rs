//! Property-based tests for layout engine invariants.
//!
//! Tests validate:
//! 1. Every frame matches offsets recomputed from scratch, after any
//!    sequence of measurements
//! 2. A measurement never moves preceding items and shifts every following
//!    item by exactly the height delta
//! 3. Pure reorders keep measured sizes
//! 4. Inserting above the anchor and undoing restores the viewport offset

use chatlayout::diff::{diff, ItemSnapshot, SectionSnapshot, Snapshot};
use chatlayout::layout::{LayoutEngine, LayoutSettings, Viewport};
use chatlayout::model::{EdgeInsets, ItemId, ItemPath, ItemSize, SectionId, Size, SizeMode};
use proptest::prelude::*;

const ITEM_SPACING: f64 = 8.0;
const SECTION_SPACING: f64 = 16.0;
const TOP_INSET: f64 = 10.0;

fn settings() -> LayoutSettings {
    LayoutSettings::default()
        .with_inter_item_spacing(ITEM_SPACING)
        .and_then(|s| s.with_inter_section_spacing(SECTION_SPACING))
        .and_then(|s| s.with_additional_insets(EdgeInsets::new(TOP_INSET, 0.0, 4.0, 0.0)))
        .expect("valid settings")
}

fn item(id: &str, height: f64) -> ItemSnapshot<()> {
    ItemSnapshot::new(ItemId::new(id).expect("valid id"), ())
        .with_size_hint(ItemSize::Estimated(Size::new(100.0, height)))
}

/// One section per entry; cell ids are `s{section}-{index}`.
fn build(heights: &[Vec<f64>]) -> Snapshot<()> {
    Snapshot::new(
        heights
            .iter()
            .enumerate()
            .map(|(s, cells)| {
                SectionSnapshot::new(
                    SectionId::new(format!("s{s}")).expect("valid id"),
                    cells
                        .iter()
                        .enumerate()
                        .map(|(i, h)| item(&format!("s{s}-{i}"), *h))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn load(snapshot: &Snapshot<()>) -> LayoutEngine {
    let mut engine = LayoutEngine::new(settings());
    let changes = diff(&Snapshot::default(), snapshot).expect("diff");
    engine.apply(&changes).expect("apply");
    engine
}

/// Expected y of every cell, computed without the engine.
fn reference_offsets(heights: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut y = TOP_INSET;
    let mut result = Vec::new();
    for cells in heights {
        let mut offsets = Vec::new();
        let mut cursor = y;
        for h in cells {
            offsets.push(cursor);
            cursor += h + ITEM_SPACING;
        }
        let extent = if cells.is_empty() {
            0.0
        } else {
            cells.iter().sum::<f64>() + ITEM_SPACING * (cells.len() - 1) as f64
        };
        y += extent + SECTION_SPACING;
        result.push(offsets);
    }
    result
}

fn heights_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(
        prop::collection::vec((1u32..120).prop_map(f64::from), 0..7),
        1..5,
    )
}

fn all_frames(engine: &LayoutEngine, heights: &[Vec<f64>]) -> Vec<(ItemPath, f64)> {
    heights
        .iter()
        .enumerate()
        .flat_map(|(s, cells)| (0..cells.len()).map(move |i| ItemPath::new(s, i)))
        .map(|path| (path, engine.frame(path).map(|f| f.y).unwrap_or(f64::NAN)))
        .collect()
}

// ===== Property 1: Offset Consistency =====

proptest! {
    #[test]
    fn frames_match_reference_after_measurements(
        mut heights in heights_strategy(),
        measurements in prop::collection::vec((0usize..10, 0usize..10, (1u32..200).prop_map(f64::from)), 0..20),
    ) {
        let mut engine = load(&build(&heights));

        for (s, i, h) in measurements {
            let s = s % heights.len();
            if heights[s].is_empty() {
                continue;
            }
            let i = i % heights[s].len();
            engine
                .report_measured(ItemPath::new(s, i), Size::new(100.0, h))
                .expect("valid measurement");
            heights[s][i] = h;
        }

        let expected = reference_offsets(&heights);
        for (s, offsets) in expected.iter().enumerate() {
            for (i, y) in offsets.iter().enumerate() {
                let frame = engine.frame(ItemPath::new(s, i)).expect("frame exists");
                prop_assert_eq!(frame.y, *y, "y of [{}, {}]", s, i);
                prop_assert_eq!(frame.height, heights[s][i]);
            }
        }
    }
}

// ===== Property 2: Measurement Locality =====

proptest! {
    #[test]
    fn measurement_shifts_only_following_items(
        heights in heights_strategy(),
        pick in (0usize..10, 0usize..10),
        new_height in (1u32..200).prop_map(f64::from),
    ) {
        let section = pick.0 % heights.len();
        prop_assume!(!heights[section].is_empty());
        let index = pick.1 % heights[section].len();
        let target = ItemPath::new(section, index);

        let mut engine = load(&build(&heights));
        let before = all_frames(&engine, &heights);
        let old_height = heights[section][index];

        engine
            .report_measured(target, Size::new(100.0, new_height))
            .expect("valid measurement");
        let after = all_frames(&engine, &heights);
        let delta = new_height - old_height;

        for ((path, y0), (_, y1)) in before.iter().zip(after.iter()) {
            if *path <= target {
                prop_assert_eq!(y0, y1, "{} must not move", path);
            } else {
                prop_assert_eq!(y1 - y0, delta, "{} must shift by the delta", path);
            }
        }
    }
}

// ===== Property 3: Moves Keep Measurements =====

proptest! {
    #[test]
    fn reorder_keeps_exact_sizes(
        order in Just((0..8).collect::<Vec<usize>>()).prop_shuffle(),
    ) {
        let heights = vec![(0..8).map(|i| 20.0 + i as f64).collect::<Vec<_>>()];
        let original = build(&heights);
        let mut engine = load(&original);
        for i in 0..8 {
            engine
                .report_measured(ItemPath::new(0, i), Size::new(100.0, 50.0 + i as f64))
                .expect("valid measurement");
        }

        let shuffled = Snapshot::new(vec![SectionSnapshot::new(
            SectionId::new("s0").expect("valid id"),
            order.iter().map(|&i| original.sections[0].items[i].clone()).collect(),
        )]);
        let changes = diff(&original, &shuffled).expect("diff");
        engine.apply(&changes).expect("apply");

        for (position, &i) in order.iter().enumerate() {
            let size = engine.item_size(ItemPath::new(0, position)).expect("item exists");
            prop_assert_eq!(size.mode(), SizeMode::Exact);
            prop_assert_eq!(size.concrete().map(|s| s.height), Some(50.0 + i as f64));
        }
    }
}

// ===== Property 4: Anchor Round Trip =====

proptest! {
    #[test]
    fn insert_above_anchor_then_undo_restores_offset(
        count in 2usize..10,
        anchor_pick in 0usize..10,
        insert_pick in 0usize..10,
        inserted_height in (1u32..150).prop_map(f64::from),
    ) {
        let anchor = 1 + anchor_pick % (count - 1);
        let insert_at = insert_pick % (anchor + 1);

        let heights = vec![vec![40.0; count]];
        let original = build(&heights);
        let mut engine = load(&original);

        let anchor_y = engine.frame(ItemPath::new(0, anchor)).expect("frame").y;
        engine.set_viewport(Viewport::new(anchor_y, 100.0));

        let mut items = original.sections[0].items.clone();
        items.insert(insert_at, item("new", inserted_height));
        let grown = Snapshot::new(vec![SectionSnapshot::new(
            SectionId::new("s0").expect("valid id"),
            items,
        )]);

        let up = engine.apply(&diff(&original, &grown).expect("diff")).expect("apply");
        prop_assert_eq!(up.scroll_adjustment, inserted_height + ITEM_SPACING);

        let down = engine.apply(&diff(&grown, &original).expect("diff")).expect("apply");
        prop_assert_eq!(down.scroll_adjustment, -(inserted_height + ITEM_SPACING));
        prop_assert_eq!(engine.viewport().map(|v| v.offset_y), Some(anchor_y));
    }
}
