//! Core geometry value types: item addressing, per-item frames, axis intervals.
//!
//! Everything here is a small `Copy` value type. The engine owns all geometry
//! outright; callers only ever receive copies (never references into engine
//! state), so values held externally are snapshots that may go stale but can
//! never be corrupted.

/// Canonical address of one layout unit: `(section, item)`.
///
/// The item index addresses the section's frame sequence, which includes the
/// header (index 0 when present) and footer (last index when present).
///
/// Ordering is lexicographic (section, then item), consistent with visual
/// top-to-bottom order. Comparison is O(1).
///
/// # Examples
/// ```
/// # use chatgrid::geometry::ItemPath;
/// let a = ItemPath::new(0, 3);
/// let b = ItemPath::new(1, 0);
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemPath {
    /// Section index, 0-based.
    pub section: usize,
    /// Index within the section's frame sequence, 0-based.
    pub item: usize,
}

impl ItemPath {
    /// Create a path from raw indices.
    ///
    /// Validity against a particular [`LayoutModel`](crate::model::LayoutModel)
    /// is the caller's responsibility; out-of-range access downstream surfaces
    /// as [`LayoutError::GeometryNotFound`](crate::error::LayoutError), never
    /// as a silent wrong answer.
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl std::fmt::Display for ItemPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

/// Flat (global) index of an item across all sections of one model.
///
/// Derived from an [`ItemPath`] against a specific
/// [`LayoutModel`](crate::model::LayoutModel); used for O(1) distance
/// comparison when picking an anchor fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FlatIndex(usize);

impl FlatIndex {
    /// Wrap a raw flat index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw 0-based value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Absolute distance to another flat index.
    pub fn distance(&self, other: FlatIndex) -> usize {
        self.0.abs_diff(other.0)
    }
}

/// The kind of a layout unit within a section.
///
/// A closed set consumed via pattern matching; there is deliberately no
/// open hierarchy of attribute subclasses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Section header, at most one, always first in the section.
    Header,
    /// Regular item.
    Item,
    /// Section footer, at most one, always last in the section.
    Footer,
}

/// Per-item geometry record along the primary scroll axis.
///
/// `offset` is relative to the owning section's start. Cross-axis position is
/// derived from the configured alignment policy, not stored per item.
///
/// # Invariants
/// Within one section, offsets are strictly increasing and contiguous modulo
/// inter-item spacing: `offset[i+1] == offset[i] + size[i] + spacing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFrame {
    /// Offset along the scroll axis, relative to the section start.
    pub offset: u64,
    /// Extent along the scroll axis.
    pub size: u64,
    /// Header, item, or footer.
    pub kind: ItemKind,
    /// True while the size is an estimate awaiting real measurement.
    pub estimated: bool,
}

impl ItemFrame {
    /// Offset of the edge immediately after this frame.
    pub fn trailing(&self) -> u64 {
        self.offset + self.size
    }

    /// Interval occupied along the scroll axis, relative to the section start.
    pub fn axis_rect(&self) -> AxisRect {
        AxisRect::new(self.offset, self.size)
    }
}

/// A half-open interval `[origin, origin + extent)` along the scroll axis.
///
/// Viewport rects handed to spatial queries reduce to this; the cross axis
/// never participates in visibility decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisRect {
    /// Leading edge.
    pub origin: u64,
    /// Extent along the axis.
    pub extent: u64,
}

impl AxisRect {
    /// Create an interval from its leading edge and extent.
    pub fn new(origin: u64, extent: u64) -> Self {
        Self { origin, extent }
    }

    /// Leading edge (inclusive).
    pub fn leading(&self) -> u64 {
        self.origin
    }

    /// Trailing edge (exclusive).
    pub fn trailing(&self) -> u64 {
        self.origin + self.extent
    }

    /// True when the interval has zero extent.
    pub fn is_empty(&self) -> bool {
        self.extent == 0
    }

    /// Half-open overlap test. Empty intervals intersect nothing.
    pub fn intersects(&self, other: &AxisRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.origin < other.trailing()
            && other.origin < self.trailing()
    }

    /// True when `point` lies within `[origin, trailing)`.
    pub fn contains(&self, point: u64) -> bool {
        point >= self.origin && point < self.trailing()
    }
}

/// A full 2-D frame, materialized only at the cache boundary.
///
/// `y`/`height` are the scroll-axis offset and size; `x`/`width` come from
/// the cross-axis alignment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Cross-axis position.
    pub x: u64,
    /// Scroll-axis position (absolute, from content start).
    pub y: u64,
    /// Cross-axis extent.
    pub width: u64,
    /// Scroll-axis extent.
    pub height: u64,
}

impl Rect {
    /// Create a rect from raw components.
    pub fn new(x: u64, y: u64, width: u64, height: u64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The scroll-axis interval this rect occupies.
    pub fn axis_rect(&self) -> AxisRect {
        AxisRect::new(self.y, self.height)
    }
}

/// Affine 2x3 transform carried by cached attributes for in-flight animations.
///
/// The engine never animates; it only stores whatever transform the host
/// toolkit asked for so it survives cache refreshes of other items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// Row-major `[a, b, c, d, tx, ty]`.
    pub matrix: [f32; 6],
}

impl Transform2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    /// True when this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod item_path {
        use super::*;

        #[test]
        fn ordering_is_lexicographic() {
            assert!(ItemPath::new(0, 9) < ItemPath::new(1, 0));
            assert!(ItemPath::new(1, 0) < ItemPath::new(1, 1));
            assert_eq!(ItemPath::new(2, 3), ItemPath::new(2, 3));
        }

        #[test]
        fn display_shows_both_indices() {
            assert_eq!(ItemPath::new(1, 4).to_string(), "[1, 4]");
        }

        #[test]
        fn hash_distinguishes_paths() {
            use std::collections::HashSet;
            let mut set = HashSet::new();
            set.insert(ItemPath::new(0, 1));
            set.insert(ItemPath::new(1, 0));
            set.insert(ItemPath::new(0, 1));
            assert_eq!(set.len(), 2);
        }
    }

    mod flat_index {
        use super::*;

        #[test]
        fn distance_is_symmetric() {
            let a = FlatIndex::new(3);
            let b = FlatIndex::new(10);
            assert_eq!(a.distance(b), 7);
            assert_eq!(b.distance(a), 7);
        }

        #[test]
        fn distance_to_self_is_zero() {
            let a = FlatIndex::new(5);
            assert_eq!(a.distance(a), 0);
        }
    }

    mod axis_rect {
        use super::*;

        #[test]
        fn half_open_intersection() {
            let a = AxisRect::new(0, 50);
            let b = AxisRect::new(50, 50);
            let c = AxisRect::new(49, 2);
            assert!(!a.intersects(&b), "touching edges do not overlap");
            assert!(a.intersects(&c));
            assert!(b.intersects(&c));
        }

        #[test]
        fn empty_rect_intersects_nothing() {
            let empty = AxisRect::new(25, 0);
            let full = AxisRect::new(0, 100);
            assert!(!empty.intersects(&full));
            assert!(!full.intersects(&empty));
            assert!(!empty.intersects(&empty));
        }

        #[test]
        fn contains_is_half_open() {
            let r = AxisRect::new(10, 5);
            assert!(r.contains(10));
            assert!(r.contains(14));
            assert!(!r.contains(15));
            assert!(!r.contains(9));
        }
    }

    mod item_frame {
        use super::*;

        #[test]
        fn trailing_is_offset_plus_size() {
            let f = ItemFrame {
                offset: 100,
                size: 40,
                kind: ItemKind::Item,
                estimated: false,
            };
            assert_eq!(f.trailing(), 140);
            assert_eq!(f.axis_rect(), AxisRect::new(100, 40));
        }
    }

    mod transform {
        use super::*;

        #[test]
        fn default_is_identity() {
            assert!(Transform2D::default().is_identity());
        }

        #[test]
        fn non_identity_detected() {
            let t = Transform2D {
                matrix: [2.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            };
            assert!(!t.is_identity());
        }
    }
}
