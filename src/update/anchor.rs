//! Scroll-anchor selection.
//!
//! The anchor is the item whose on-screen position must not move when a
//! batch commits. Callers may supply one; otherwise the engine picks the
//! visible item nearest the viewport's stable edge. For a reversed
//! (inverted chat) layout the stable edge is the trailing one, since
//! historical content is appended at the leading edge and the user is
//! reading near the newest messages.

use crate::geometry::{AxisRect, ItemPath};
use crate::model::LayoutModel;
use crate::spatial;

/// The item chosen to remain visually fixed across an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorCandidate {
    /// Path of the anchor item in the before snapshot.
    pub path: ItemPath,
    /// Signed distance from the viewport's leading edge to the item's
    /// leading edge at selection time. Kept for host-side bookkeeping; the
    /// offset correction itself only needs the item's before/after offsets.
    pub offset_from_edge: i64,
}

/// Pick an anchor from the items visible in `viewport`.
///
/// Normal layouts anchor the first visible item (nearest the leading edge);
/// reversed layouts anchor the last visible one. When several items are
/// equally close the lowest flat index wins, which both rules satisfy by
/// construction. Returns `None` when nothing is visible.
pub fn select_anchor(
    model: &mut LayoutModel,
    viewport: AxisRect,
    reversed: bool,
) -> Option<AnchorCandidate> {
    let range = spatial::visible_range(model, viewport);
    let path = if reversed {
        // Last visible item: step back one from the exclusive end.
        let start = range.start()?;
        let start_flat = model.flat_index(start).ok()?;
        model.path_at_flat(crate::geometry::FlatIndex::new(
            start_flat.get() + range.len() - 1,
        ))?
    } else {
        range.start()?
    };
    let offset = model.absolute_offset(path).ok()?;
    Some(AnchorCandidate {
        path,
        offset_from_edge: offset as i64 - viewport.origin as i64,
    })
}
