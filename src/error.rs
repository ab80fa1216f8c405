//! Error taxonomy for the layout engine.
//!
//! Every condition here is recoverable and handled inside the engine: a
//! layout pass that panics or propagates a hard failure would corrupt the
//! host toolkit's rendering pipeline, so the worst user-visible outcome is
//! degraded fidelity (a small scroll jump when the anchor is lost), never a
//! crash.
//!
//! - [`LayoutError::GeometryNotFound`]: recovered locally by answering
//!   "no attributes" for the offending path.
//! - [`LayoutError::InconsistentOperation`]: the single operation is
//!   skipped, the rest of the batch still commits; surfaced as a diagnostic
//!   so the caller can log upstream differ bugs.
//! - [`LayoutError::AnchorLost`]: the offset correction defaults to zero;
//!   an empty list has no meaningful scroll anchor.
//! - [`LayoutError::BatchInFlight`]: the submitted batch is refused whole;
//!   the caller retries after consuming the pending offset correction.

use crate::geometry::ItemPath;
use crate::update::Operation;
use thiserror::Error;

/// Recoverable failure conditions raised by geometry queries and batch
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A query referenced a path absent from the current layout model.
    #[error("no geometry for path {path}")]
    GeometryNotFound {
        /// The path that was requested.
        path: ItemPath,
    },

    /// A batch operation referenced an index invalid against the `before`
    /// snapshot (e.g. a duplicate delete). The operation was skipped; a
    /// partial layout is always preferable to an inconsistent scroll
    /// position.
    #[error("operation {op:?} is inconsistent with the current snapshot")]
    InconsistentOperation {
        /// The skipped operation.
        op: Operation,
    },

    /// The anchor (supplied or auto-selected) was deleted and no surviving
    /// sibling exists, e.g. the whole list was cleared.
    #[error("scroll anchor lost: no surviving item to anchor to")]
    AnchorLost,

    /// A batch was submitted while a previous one had not committed (its
    /// offset correction not yet consumed) and the configured policy is to
    /// reject rather than queue. Retry after the in-flight commit.
    #[error("a batch update is already in flight")]
    BatchInFlight,
}
