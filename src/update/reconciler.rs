//! Batch reconciliation: replay operations against a frozen snapshot and
//! compute the offset correction that keeps the anchor visually stationary.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::geometry::{AxisRect, FlatIndex, ItemKind, ItemPath};
use crate::model::LayoutModel;
use crate::update::anchor::{self, AnchorCandidate};
use crate::update::operation::Operation;
use crate::update::SizeSource;

/// Everything a committed batch hands back to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// The new layout model, built by replaying the operations against a
    /// copy of the before snapshot.
    pub after: LayoutModel,
    /// Paths whose cached attributes must be discarded: every path whose
    /// absolute frame changed, plus every operation endpoint.
    pub invalidated: Vec<ItemPath>,
    /// `offset_after(anchor) - offset_before(anchor)`. The host applies
    /// this to its scroll offset in the same pass that commits the new
    /// layout, making the update visually seamless.
    pub offset_correction: i64,
    /// Where the anchor ended up in the after model, when one survived.
    pub anchor: Option<ItemPath>,
    /// Recoverable conditions encountered while applying the batch. The
    /// batch still commits; these exist for the caller to log.
    pub diagnostics: Vec<LayoutError>,
}

/// A removal staged for descending application (deletes and move sources).
/// `move_id` pairs a move's removal with its insertion so the two halves
/// commit or skip together.
struct Removal {
    path: ItemPath,
    op: Operation,
    move_id: Option<usize>,
}

/// An insertion staged for ascending application (inserts and move
/// destinations). Move destinations carry the source frame.
struct Insertion {
    path: ItemPath,
    carried: Option<Carried>,
    op: Operation,
    move_id: Option<usize>,
}

struct Carried {
    size: u64,
    estimated: bool,
    kind: ItemKind,
    origin: ItemPath,
}

/// Replay `ops` against a copy of `before`, producing the after model, the
/// invalidation set, and the anchor-preserving offset correction.
///
/// Operations are applied in a fixed order regardless of how the differ
/// emitted them: removals in descending path order, then insertions in
/// ascending path order, then reloads. This keeps every index valid at its
/// moment of application without retargeting later operations.
///
/// An operation inconsistent with the snapshot (duplicate delete, path out
/// of range) is skipped and surfaced in `diagnostics`; the rest of the
/// batch still applies. A partial layout is always preferable to an
/// inconsistent scroll position.
pub fn reconcile(
    before: &mut LayoutModel,
    ops: &[Operation],
    sizes: &dyn SizeSource,
    config: &LayoutConfig,
    anchor: Option<AnchorCandidate>,
    viewport: AxisRect,
) -> ReconcileOutcome {
    let mut diagnostics = Vec::new();

    // Resolve the anchor against the before snapshot up front: selection
    // must see pre-update geometry.
    let anchor_candidate = match anchor {
        Some(c) if before.contains(c.path) => Some(c),
        Some(c) => {
            warn!(path = %c.path, "supplied anchor not in snapshot, auto-selecting");
            diagnostics.push(LayoutError::GeometryNotFound { path: c.path });
            anchor::select_anchor(before, viewport, config.reversed)
        }
        None => anchor::select_anchor(before, viewport, config.reversed),
    };

    let (removals, insertions, reloads) = partition(ops, before, &mut diagnostics);
    let (insertions, cancelled_moves) =
        reject_unusable_insertions(before, &removals, insertions, &mut diagnostics);

    let mut after = before.clone();

    // origins[s][i] = the before-path of the frame now at (s, i), or None
    // for freshly inserted items. This is the side table that lets the
    // anchor (and its fallback) be located in the after model.
    let mut origins: Vec<Vec<Option<ItemPath>>> = (0..before.section_count())
        .map(|s| {
            let count = before.section(s).map_or(0, |sec| sec.item_count());
            (0..count).map(|i| Some(ItemPath::new(s, i))).collect()
        })
        .collect();

    apply_removals(
        &mut after,
        &mut origins,
        removals,
        &cancelled_moves,
        before,
        &mut diagnostics,
    );
    apply_insertions(&mut after, &mut origins, insertions, sizes, config, &mut diagnostics);
    apply_reloads(&mut after, reloads, sizes, config, &mut diagnostics);

    let invalidated = invalidated_paths(before, &mut after, ops);

    let (offset_correction, anchor_after) = match anchor_candidate {
        Some(candidate) => {
            resolve_anchor(before, &mut after, &origins, candidate.path, &mut diagnostics)
        }
        None => (0, None),
    };

    debug!(
        ops = ops.len(),
        invalidated = invalidated.len(),
        skipped = diagnostics.len(),
        offset_correction,
        "batch reconciled"
    );

    ReconcileOutcome {
        after,
        invalidated,
        offset_correction,
        anchor: anchor_after,
        diagnostics,
    }
}

/// Split the caller-ordered operations into the fixed application order.
fn partition(
    ops: &[Operation],
    before: &LayoutModel,
    diagnostics: &mut Vec<LayoutError>,
) -> (Vec<Removal>, Vec<Insertion>, Vec<ItemPath>) {
    let mut removals = Vec::new();
    let mut insertions = Vec::new();
    let mut reloads = Vec::new();
    let mut next_move_id = 0;

    for &op in ops {
        match op {
            Operation::Insert { path } => insertions.push(Insertion {
                path,
                carried: None,
                op,
                move_id: None,
            }),
            Operation::Delete { path } => removals.push(Removal {
                path,
                op,
                move_id: None,
            }),
            Operation::Move { from, to } => match before.frame(from) {
                Ok(frame) => {
                    let move_id = Some(next_move_id);
                    next_move_id += 1;
                    removals.push(Removal {
                        path: from,
                        op,
                        move_id,
                    });
                    insertions.push(Insertion {
                        path: to,
                        carried: Some(Carried {
                            size: frame.size,
                            estimated: frame.estimated,
                            kind: frame.kind,
                            origin: from,
                        }),
                        op,
                        move_id,
                    });
                }
                Err(_) => {
                    warn!(?op, "skipping inconsistent operation");
                    diagnostics.push(LayoutError::InconsistentOperation { op });
                }
            },
            Operation::Reload { path } => reloads.push(path),
        }
    }

    // Descending so earlier removals do not shift later ones; ascending for
    // insertions for the same reason. Stable sorts keep the differ's order
    // among equal paths.
    removals.sort_by(|a, b| b.path.cmp(&a.path));
    insertions.sort_by(|a, b| a.path.cmp(&b.path));
    (removals, insertions, reloads)
}

/// Dry-run the staged edits against per-section counts and drop insertions
/// that can never apply, diagnosing each once. A move whose destination is
/// rejected here is cancelled whole; committing only its removal would
/// silently delete the item instead of no-oping the operation.
fn reject_unusable_insertions(
    before: &LayoutModel,
    removals: &[Removal],
    insertions: Vec<Insertion>,
    diagnostics: &mut Vec<LayoutError>,
) -> (Vec<Insertion>, BTreeSet<usize>) {
    let mut counts: Vec<usize> = (0..before.section_count())
        .map(|s| before.section(s).map_or(0, |sec| sec.item_count()))
        .collect();
    let mut staged = BTreeSet::new();
    for removal in removals {
        if before.contains(removal.path) && staged.insert(removal.path) {
            counts[removal.path.section] -= 1;
        }
    }

    let mut cancelled = BTreeSet::new();
    let mut viable = Vec::with_capacity(insertions.len());
    for insertion in insertions {
        let fits = insertion.path.section < counts.len()
            && insertion.path.item <= counts[insertion.path.section];
        if fits {
            counts[insertion.path.section] += 1;
            viable.push(insertion);
        } else {
            warn!(op = ?insertion.op, "skipping inconsistent operation");
            diagnostics.push(LayoutError::InconsistentOperation { op: insertion.op });
            if let Some(id) = insertion.move_id {
                cancelled.insert(id);
            }
        }
    }
    (viable, cancelled)
}

fn apply_removals(
    after: &mut LayoutModel,
    origins: &mut [Vec<Option<ItemPath>>],
    removals: Vec<Removal>,
    cancelled_moves: &BTreeSet<usize>,
    before: &LayoutModel,
    diagnostics: &mut Vec<LayoutError>,
) {
    let mut seen = BTreeSet::new();
    for removal in removals {
        // A cancelled move was already diagnosed; its source stays put.
        if removal
            .move_id
            .is_some_and(|id| cancelled_moves.contains(&id))
        {
            continue;
        }
        let valid = before.contains(removal.path) && seen.insert(removal.path);
        if valid && after.remove_item(removal.path).is_some() {
            origins[removal.path.section].remove(removal.path.item);
        } else {
            warn!(op = ?removal.op, "skipping inconsistent operation");
            diagnostics.push(LayoutError::InconsistentOperation { op: removal.op });
        }
    }
}

fn apply_insertions(
    after: &mut LayoutModel,
    origins: &mut [Vec<Option<ItemPath>>],
    insertions: Vec<Insertion>,
    sizes: &dyn SizeSource,
    config: &LayoutConfig,
    diagnostics: &mut Vec<LayoutError>,
) {
    for insertion in insertions {
        let path = insertion.path;
        let (kind, size, estimated, origin) = match insertion.carried {
            Some(carried) => (carried.kind, carried.size, carried.estimated, Some(carried.origin)),
            None => {
                let kind = ItemKind::Item;
                match sizes.measured_size(path, kind) {
                    Some(size) => (kind, size, false, None),
                    None => (kind, config.estimated_sizes.for_kind(kind), true, None),
                }
            }
        };
        if path.section < origins.len() && after.insert_item(path, kind, size, estimated) {
            origins[path.section].insert(path.item, origin);
        } else {
            warn!(op = ?insertion.op, "skipping inconsistent operation");
            diagnostics.push(LayoutError::InconsistentOperation { op: insertion.op });
        }
    }
}

fn apply_reloads(
    after: &mut LayoutModel,
    reloads: Vec<ItemPath>,
    sizes: &dyn SizeSource,
    config: &LayoutConfig,
    diagnostics: &mut Vec<LayoutError>,
) {
    for path in reloads {
        let op = Operation::Reload { path };
        let Ok(frame) = after.frame(path) else {
            warn!(?op, "skipping inconsistent operation");
            diagnostics.push(LayoutError::InconsistentOperation { op });
            continue;
        };
        let (size, estimated) = match sizes.measured_size(path, frame.kind) {
            Some(size) => (size, false),
            None => (config.estimated_sizes.for_kind(frame.kind), true),
        };
        // replace cannot fail: the frame lookup above succeeded.
        after.replace_item_size(path, size, estimated);
    }
}

/// Paths needing cache invalidation: every path whose absolute frame
/// differs between the snapshots, plus every operation endpoint.
fn invalidated_paths(
    before: &mut LayoutModel,
    after: &mut LayoutModel,
    ops: &[Operation],
) -> Vec<ItemPath> {
    let mut set = BTreeSet::new();

    for &op in ops {
        match op {
            Operation::Insert { path } | Operation::Delete { path } | Operation::Reload { path } => {
                set.insert(path);
            }
            Operation::Move { from, to } => {
                set.insert(from);
                set.insert(to);
            }
        }
    }

    let sections = before.section_count().max(after.section_count());
    for s in 0..sections {
        let before_start = before.section_start(s);
        let after_start = after.section_start(s);
        let before_count = before.section(s).map_or(0, |sec| sec.item_count());
        let after_count = after.section(s).map_or(0, |sec| sec.item_count());
        for i in 0..before_count.max(after_count) {
            let path = ItemPath::new(s, i);
            let b = before
                .frame(path)
                .ok()
                .and_then(|f| Some((before_start? + f.offset, f.size)));
            let a = after
                .frame(path)
                .ok()
                .and_then(|f| Some((after_start? + f.offset, f.size)));
            if b != a {
                set.insert(path);
            }
        }
    }

    set.into_iter().collect()
}

/// Locate the anchor (or its nearest surviving sibling) in the after model
/// and derive the offset correction.
fn resolve_anchor(
    before: &mut LayoutModel,
    after: &mut LayoutModel,
    origins: &[Vec<Option<ItemPath>>],
    anchor_before: ItemPath,
    diagnostics: &mut Vec<LayoutError>,
) -> (i64, Option<ItemPath>) {
    // Direct survival: the anchor's own frame is still present somewhere.
    let direct = find_origin(origins, anchor_before).map(|after_path| (anchor_before, after_path));

    let resolved = direct.or_else(|| {
        // Fallback: nearest surviving item by original flat index, lower
        // index winning ties.
        let anchor_flat = before.flat_index(anchor_before).ok()?;
        let mut best: Option<(usize, FlatIndex, ItemPath, ItemPath)> = None;
        for (s, section_origins) in origins.iter().enumerate() {
            for (i, origin) in section_origins.iter().enumerate() {
                let Some(origin_path) = origin else { continue };
                let Ok(flat) = before.flat_index(*origin_path) else {
                    continue;
                };
                let distance = flat.distance(anchor_flat);
                let candidate = (distance, flat, *origin_path, ItemPath::new(s, i));
                let better = match &best {
                    None => true,
                    Some((best_distance, best_flat, _, _)) => {
                        distance < *best_distance
                            || (distance == *best_distance && flat < *best_flat)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
        best.map(|(_, _, before_path, after_path)| (before_path, after_path))
    });

    match resolved {
        Some((before_path, after_path)) => {
            let old = before.absolute_offset(before_path).unwrap_or(0);
            let new = after.absolute_offset(after_path).unwrap_or(0);
            (new as i64 - old as i64, Some(after_path))
        }
        None => {
            warn!(anchor = %anchor_before, "anchor lost, applying no offset correction");
            diagnostics.push(LayoutError::AnchorLost);
            (0, None)
        }
    }
}

fn find_origin(origins: &[Vec<Option<ItemPath>>], target: ItemPath) -> Option<ItemPath> {
    for (s, section_origins) in origins.iter().enumerate() {
        if let Some(i) = section_origins.iter().position(|o| *o == Some(target)) {
            return Some(ItemPath::new(s, i));
        }
    }
    None
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
