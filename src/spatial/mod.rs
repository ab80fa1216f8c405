//! Spatial queries over a layout model: visible ranges and hit testing.
//!
//! Pure functions of [`LayoutModel`]; no state of their own. Ordering along
//! the scroll axis is total and one-dimensional, so binary search over the
//! prefix sums replaces any tree structure: section via the Fenwick
//! `lower_bound`, item via `partition_point` over monotonic offsets. A
//! visible-range query is O(log S + log I) plus O(k) only when the caller
//! walks the k results.
//!
//! Two call modes share this code: high-frequency visible-range queries
//! during live scrolling (allocation-free: [`VisibleRange`] is a value and
//! its iterator borrows the model) and occasional point hit-testing for
//! gestures.

use crate::geometry::{AxisRect, ItemPath};
use crate::model::LayoutModel;

/// Half-open range of paths intersecting a query rect.
///
/// `start <= p < end` lexicographically for every contained path `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    bounds: Option<(ItemPath, ItemPath)>,
    len: usize,
}

impl VisibleRange {
    /// The empty range.
    pub fn empty() -> Self {
        Self {
            bounds: None,
            len: 0,
        }
    }

    fn new(start: ItemPath, end: ItemPath, len: usize) -> Self {
        debug_assert!(start < end);
        debug_assert!(len > 0);
        Self {
            bounds: Some((start, end)),
            len,
        }
    }

    /// True when no item intersects the query rect.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Number of intersecting items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// First intersecting path, if any.
    pub fn start(&self) -> Option<ItemPath> {
        self.bounds.map(|(s, _)| s)
    }

    /// Exclusive end path. May address one past the last section when the
    /// range runs to the end of the model.
    pub fn end(&self) -> Option<ItemPath> {
        self.bounds.map(|(_, e)| e)
    }

    /// Whether `path` lies within the range.
    pub fn contains(&self, path: ItemPath) -> bool {
        match self.bounds {
            Some((start, end)) => start <= path && path < end,
            None => false,
        }
    }

    /// Walk the contained paths in visual order. O(k); borrows the model to
    /// step across section boundaries without allocating.
    pub fn iter<'a>(&self, model: &'a LayoutModel) -> VisiblePaths<'a> {
        VisiblePaths {
            model,
            next: self.bounds.map(|(s, _)| s),
            remaining: self.len,
        }
    }
}

/// Iterator over the paths of a [`VisibleRange`].
#[derive(Debug, Clone)]
pub struct VisiblePaths<'a> {
    model: &'a LayoutModel,
    next: Option<ItemPath>,
    remaining: usize,
}

impl Iterator for VisiblePaths<'_> {
    type Item = ItemPath;

    fn next(&mut self) -> Option<ItemPath> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;

        // Advance, skipping empty sections.
        let mut section = current.section;
        let mut item = current.item + 1;
        loop {
            match self.model.section(section) {
                Some(s) if item < s.item_count() => break,
                Some(_) => {
                    section += 1;
                    item = 0;
                }
                None => break,
            }
        }
        self.next = Some(ItemPath::new(section, item));
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for VisiblePaths<'_> {}

/// Items whose `[offset, offset + size)` interval overlaps `rect`.
///
/// An empty model, an empty rect, or a rect entirely past the content
/// extent all yield an empty range; "scrolled past the end" is a normal
/// condition, not an error.
pub fn visible_range(model: &mut LayoutModel, rect: AxisRect) -> VisibleRange {
    if rect.is_empty() || model.is_empty() {
        return VisibleRange::empty();
    }
    let total = model.total_height();
    if rect.origin >= total {
        return VisibleRange::empty();
    }

    // First item whose trailing edge exceeds the rect's leading edge.
    let Some((start_section, local)) = model.locate(rect.origin) else {
        return VisibleRange::empty();
    };
    let Some(start_item) = model
        .section(start_section)
        .and_then(|s| s.first_past(local))
    else {
        return VisibleRange::empty();
    };
    let start = ItemPath::new(start_section, start_item);
    let start_flat = model.section_flat_start(start_section) + start_item;

    // One past the last item whose leading edge is below the rect's
    // trailing edge.
    let trailing = rect.trailing();
    let end_flat = if trailing >= total {
        model.item_count()
    } else {
        match model.locate(trailing - 1) {
            Some((end_section, local)) => {
                let end_item = model
                    .section(end_section)
                    .map(|s| s.count_starting_before(local + 1))
                    .unwrap_or(0);
                model.section_flat_start(end_section) + end_item
            }
            None => model.item_count(),
        }
    };

    if end_flat <= start_flat {
        return VisibleRange::empty();
    }
    let end = model
        .path_at_flat(crate::geometry::FlatIndex::new(end_flat))
        .unwrap_or_else(|| ItemPath::new(model.section_count(), 0));
    VisibleRange::new(start, end, end_flat - start_flat)
}

/// Item whose interval contains `point`, `None` when the point falls in an
/// inter-item spacing gap or past the content extent.
pub fn item_at(model: &mut LayoutModel, point: u64) -> Option<ItemPath> {
    let (section, local) = model.locate(point)?;
    let item = model.section(section)?.first_past(local)?;
    let frame = model.section(section)?.frame(item)?;
    (frame.offset <= local).then(|| ItemPath::new(section, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ItemKind;
    use crate::model::SectionModel;

    fn model_of(section_sizes: &[&[u64]], spacing: u64) -> LayoutModel {
        let mut model = LayoutModel::new(spacing);
        for sizes in section_sizes {
            let mut section = SectionModel::new();
            for &size in *sizes {
                section.push(ItemKind::Item, size, false, spacing);
            }
            model.push_section(section);
        }
        model
    }

    fn paths(model: &mut LayoutModel, rect: AxisRect) -> Vec<ItemPath> {
        let range = visible_range(model, rect);
        let model_ref: &LayoutModel = model;
        range.iter(model_ref).collect()
    }

    #[test]
    fn ten_items_of_fifty_rect_120_220() {
        // Offsets 0, 50, ..., 450; rect [120, 220) overlaps items 2, 3, 4.
        let mut model = model_of(&[&[50; 10]], 0);
        let result = paths(&mut model, AxisRect::new(120, 100));
        assert_eq!(
            result,
            vec![
                ItemPath::new(0, 2),
                ItemPath::new(0, 3),
                ItemPath::new(0, 4)
            ]
        );
    }

    #[test]
    fn empty_model_yields_empty_range() {
        let mut model = LayoutModel::new(0);
        assert!(visible_range(&mut model, AxisRect::new(0, 100)).is_empty());
    }

    #[test]
    fn rect_past_the_end_is_empty_not_an_error() {
        let mut model = model_of(&[&[50; 4]], 0);
        assert!(visible_range(&mut model, AxisRect::new(200, 100)).is_empty());
        assert!(visible_range(&mut model, AxisRect::new(10_000, 50)).is_empty());
    }

    #[test]
    fn zero_extent_rect_is_empty() {
        let mut model = model_of(&[&[50; 4]], 0);
        assert!(visible_range(&mut model, AxisRect::new(60, 0)).is_empty());
    }

    #[test]
    fn range_spans_section_boundaries() {
        let mut model = model_of(&[&[50, 50], &[50, 50]], 0);
        let result = paths(&mut model, AxisRect::new(75, 60));
        assert_eq!(
            result,
            vec![ItemPath::new(0, 1), ItemPath::new(1, 0)],
            "rect [75, 135) touches the last item of section 0 and the first of section 1"
        );
    }

    #[test]
    fn range_skips_empty_sections() {
        let mut model = model_of(&[&[50], &[], &[50]], 0);
        let result = paths(&mut model, AxisRect::new(0, 100));
        assert_eq!(result, vec![ItemPath::new(0, 0), ItemPath::new(2, 0)]);
    }

    #[test]
    fn rect_covering_everything_returns_all() {
        let mut model = model_of(&[&[30, 30], &[30]], 0);
        let range = visible_range(&mut model, AxisRect::new(0, 1_000));
        assert_eq!(range.len(), 3);
        assert!(!range.is_empty());
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let mut model = model_of(&[&[50; 4]], 0);
        // Rect [50, 100) touches item 0's trailing edge and item 2's
        // leading edge; only item 1 overlaps.
        let result = paths(&mut model, AxisRect::new(50, 50));
        assert_eq!(result, vec![ItemPath::new(0, 1)]);
    }

    #[test]
    fn contains_uses_lexicographic_bounds() {
        let mut model = model_of(&[&[50, 50], &[50, 50]], 0);
        let range = visible_range(&mut model, AxisRect::new(50, 100));
        assert!(range.contains(ItemPath::new(0, 1)));
        assert!(range.contains(ItemPath::new(1, 0)));
        assert!(!range.contains(ItemPath::new(1, 1)));
        assert!(!range.contains(ItemPath::new(0, 0)));
    }

    #[test]
    fn spacing_gaps_belong_to_no_item() {
        let mut model = model_of(&[&[50, 50]], 10);
        assert_eq!(item_at(&mut model, 0), Some(ItemPath::new(0, 0)));
        assert_eq!(item_at(&mut model, 49), Some(ItemPath::new(0, 0)));
        assert_eq!(item_at(&mut model, 55), None, "point in the spacing gap");
        assert_eq!(item_at(&mut model, 60), Some(ItemPath::new(0, 1)));
        assert_eq!(item_at(&mut model, 110), None, "past the end");
    }

    #[test]
    fn rect_inside_one_item_returns_just_it() {
        let mut model = model_of(&[&[50; 10]], 0);
        let result = paths(&mut model, AxisRect::new(210, 20));
        assert_eq!(result, vec![ItemPath::new(0, 4)]);
    }

    #[test]
    fn iterator_len_matches_range_len() {
        let mut model = model_of(&[&[40; 7], &[40; 3]], 0);
        let range = visible_range(&mut model, AxisRect::new(100, 200));
        let model_ref: &LayoutModel = &model;
        assert_eq!(range.iter(model_ref).count(), range.len());
    }
}
