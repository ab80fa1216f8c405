//! Property-based tests for layout model and reconciliation invariants.
//!
//! Tests validate:
//! 1. Total height equals the sum of item sizes plus interior spacing
//! 2. visible_range agrees with a brute-force per-item intersection scan
//! 3. Visible paths come back strictly ordered with monotonic offsets
//! 4. An empty batch is an identity: same model, zero correction
//! 5. Deletes elsewhere never move the anchor on screen once the
//!    offset correction is applied

use chatgrid::config::LayoutConfig;
use chatgrid::geometry::{AxisRect, ItemKind, ItemPath};
use chatgrid::model::{LayoutModel, SectionModel};
use chatgrid::update::{reconcile, AnchorCandidate, Operation, Unmeasured};
use proptest::prelude::*;

fn build_model(section_sizes: &[Vec<u64>], spacing: u64) -> LayoutModel {
    let mut model = LayoutModel::new(spacing);
    for sizes in section_sizes {
        let mut section = SectionModel::new();
        for &size in sizes {
            section.push(ItemKind::Item, size, false, spacing);
        }
        model.push_section(section);
    }
    model
}

fn all_paths(section_sizes: &[Vec<u64>]) -> Vec<ItemPath> {
    section_sizes
        .iter()
        .enumerate()
        .flat_map(|(s, sizes)| (0..sizes.len()).map(move |i| ItemPath::new(s, i)))
        .collect()
}

fn section_sizes_strategy() -> impl Strategy<Value = Vec<Vec<u64>>> {
    prop::collection::vec(prop::collection::vec(1u64..120, 0..12), 1..6)
}

// ===== Property 1: Total Height =====

proptest! {
    #[test]
    fn total_height_matches_linear_sum(
        section_sizes in section_sizes_strategy(),
        spacing in 0u64..10
    ) {
        let mut model = build_model(&section_sizes, spacing);

        let expected: u64 = section_sizes
            .iter()
            .map(|sizes| {
                let content: u64 = sizes.iter().sum();
                let gaps = spacing * sizes.len().saturating_sub(1) as u64;
                content + gaps
            })
            .sum();
        prop_assert_eq!(model.total_height(), expected);
    }
}

// ===== Property 2: Range Query vs Brute-Force Scan =====

proptest! {
    #[test]
    fn visible_range_agrees_with_scan(
        section_sizes in section_sizes_strategy(),
        spacing in 0u64..10,
        origin in 0u64..2_000,
        extent in 0u64..600
    ) {
        let mut model = build_model(&section_sizes, spacing);
        let rect = AxisRect::new(origin, extent);

        let range = chatgrid::spatial::visible_range(&mut model, rect);
        let queried: Vec<ItemPath> = range.iter(&model).collect();

        let mut scanned = Vec::new();
        for path in all_paths(&section_sizes) {
            let frame = model.frame(path).unwrap();
            let start = model.absolute_offset(path).unwrap();
            if AxisRect::new(start, frame.size).intersects(&rect) {
                scanned.push(path);
            }
        }
        prop_assert_eq!(queried, scanned);
    }
}

// ===== Property 3: Ordering =====

proptest! {
    #[test]
    fn visible_paths_are_strictly_ordered(
        section_sizes in section_sizes_strategy(),
        spacing in 0u64..10,
        origin in 0u64..2_000,
        extent in 1u64..600
    ) {
        let mut model = build_model(&section_sizes, spacing);
        let range = chatgrid::spatial::visible_range(&mut model, AxisRect::new(origin, extent));
        let paths: Vec<ItemPath> = range.iter(&model).collect();

        for pair in paths.windows(2) {
            prop_assert!(pair[0] < pair[1], "paths out of order: {} then {}", pair[0], pair[1]);
        }

        let mut offsets = Vec::new();
        for &path in &paths {
            offsets.push(model.absolute_offset(path).unwrap());
        }
        for pair in offsets.windows(2) {
            prop_assert!(pair[0] < pair[1], "offsets not monotonic");
        }
    }
}

// ===== Property 4: Empty Batch Identity =====

proptest! {
    #[test]
    fn empty_batch_is_identity(
        section_sizes in section_sizes_strategy(),
        spacing in 0u64..10,
        origin in 0u64..2_000
    ) {
        let config = LayoutConfig { spacing, ..LayoutConfig::default() };
        let mut before = build_model(&section_sizes, spacing);
        let snapshot = before.clone();

        let outcome = reconcile(
            &mut before,
            &[],
            &Unmeasured,
            &config,
            None,
            AxisRect::new(origin, 300),
        );

        prop_assert_eq!(outcome.after, snapshot);
        prop_assert_eq!(outcome.offset_correction, 0);
        prop_assert!(outcome.invalidated.is_empty());
        prop_assert!(outcome.diagnostics.is_empty());
    }
}

// ===== Property 5: Anchor Stationary Under Deletes =====

proptest! {
    #[test]
    fn deletes_elsewhere_keep_the_anchor_stationary(
        section_sizes in prop::collection::vec(prop::collection::vec(1u64..120, 1..12), 1..5),
        spacing in 0u64..10,
        anchor_seed in any::<prop::sample::Index>(),
        delete_seeds in prop::collection::vec(any::<prop::sample::Index>(), 0..6)
    ) {
        let config = LayoutConfig { spacing, ..LayoutConfig::default() };
        let mut before = build_model(&section_sizes, spacing);
        let paths = all_paths(&section_sizes);
        let anchor_path = paths[anchor_seed.index(paths.len())];

        // Distinct delete targets, never the anchor itself.
        let mut targets: Vec<ItemPath> = delete_seeds
            .iter()
            .map(|seed| paths[seed.index(paths.len())])
            .filter(|&p| p != anchor_path)
            .collect();
        targets.sort();
        targets.dedup();
        let ops: Vec<Operation> = targets
            .iter()
            .map(|&path| Operation::Delete { path })
            .collect();

        let old_offset = before.absolute_offset(anchor_path).unwrap();
        let anchor = AnchorCandidate { path: anchor_path, offset_from_edge: 0 };
        let outcome = reconcile(
            &mut before,
            &ops,
            &Unmeasured,
            &config,
            Some(anchor),
            AxisRect::new(0, 300),
        );

        // The anchor survived every delete; its expected after-path shifts
        // down by the deletes before it in its own section.
        let shift = targets
            .iter()
            .filter(|p| p.section == anchor_path.section && p.item < anchor_path.item)
            .count();
        let expected_after = ItemPath::new(anchor_path.section, anchor_path.item - shift);
        prop_assert_eq!(outcome.anchor, Some(expected_after));

        let mut after = outcome.after;
        let new_offset = after.absolute_offset(expected_after).unwrap();
        prop_assert_eq!(
            outcome.offset_correction,
            new_offset as i64 - old_offset as i64,
            "correction must cancel the anchor's displacement"
        );
    }
}
