//! Batch operations produced by the external diffing collaborator.

use crate::geometry::ItemPath;

/// One edit in a batch update.
///
/// Addressing convention (the engine trusts the differ on this): `Delete`
/// paths and `Move` sources address the *before* snapshot; `Insert` paths,
/// `Move` destinations, and `Reload` paths address the *after* snapshot
/// (reloads resolve once removals and insertions have applied). The
/// reconciler applies removals in descending order and insertions in
/// ascending order so earlier edits never shift the indices of later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Insert a new item; its size is measured if available, estimated
    /// otherwise.
    Insert {
        /// Destination path in the after snapshot.
        path: ItemPath,
    },
    /// Remove the item at `path`.
    Delete {
        /// Path in the before snapshot.
        path: ItemPath,
    },
    /// Remove the item at `from` and reinsert it (carrying its last known
    /// size) at `to`.
    Move {
        /// Source path in the before snapshot.
        from: ItemPath,
        /// Destination path in the after snapshot.
        to: ItemPath,
    },
    /// Replace the frame at `path`, keeping the path. Also how late
    /// self-sizing measurements arrive: a measurement correction is a
    /// single-item reload through the same reconciliation mechanism.
    Reload {
        /// Path of the item to re-measure.
        path: ItemPath,
    },
}

impl Operation {
    /// Shorthand constructor for an insert.
    pub fn insert(section: usize, item: usize) -> Self {
        Self::Insert {
            path: ItemPath::new(section, item),
        }
    }

    /// Shorthand constructor for a delete.
    pub fn delete(section: usize, item: usize) -> Self {
        Self::Delete {
            path: ItemPath::new(section, item),
        }
    }

    /// Shorthand constructor for a move.
    pub fn moved(from: ItemPath, to: ItemPath) -> Self {
        Self::Move { from, to }
    }

    /// Shorthand constructor for a reload.
    pub fn reload(section: usize, item: usize) -> Self {
        Self::Reload {
            path: ItemPath::new(section, item),
        }
    }
}
