//! Batch updates: operations, anchoring, and reconciliation.

pub mod anchor;
pub mod operation;
pub mod reconciler;

pub use anchor::{select_anchor, AnchorCandidate};
pub use operation::Operation;
pub use reconciler::{reconcile, ReconcileOutcome};

use crate::geometry::{ItemKind, ItemPath};
use std::collections::HashMap;

/// Boundary to the self-sizing measurement collaborator.
///
/// The reconciler asks for a measured size whenever it creates or reloads a
/// frame; `None` means "not measured yet", in which case the configured
/// estimate is used and the frame stays flagged estimated until a later
/// reload delivers the real size.
pub trait SizeSource {
    /// Measured size for `path`, if one is known.
    fn measured_size(&self, path: ItemPath, kind: ItemKind) -> Option<u64>;
}

/// A size source with no measurements: everything falls back to estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmeasured;

impl SizeSource for Unmeasured {
    fn measured_size(&self, _path: ItemPath, _kind: ItemKind) -> Option<u64> {
        None
    }
}

/// Path-keyed measurements, convenient for hosts that batch their
/// measurement results.
impl SizeSource for HashMap<ItemPath, u64> {
    fn measured_size(&self, path: ItemPath, _kind: ItemKind) -> Option<u64> {
        self.get(&path).copied()
    }
}
