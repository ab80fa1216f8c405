//! The full geometry snapshot for one content state.

use crate::error::LayoutError;
use crate::geometry::{FlatIndex, ItemFrame, ItemKind, ItemPath};
use crate::model::offset_index::SectionOffsetIndex;
use crate::model::section::SectionModel;

/// Ordered sections plus lazily rebuilt global prefix-sum indexes over
/// section heights and item counts.
///
/// Mutations mark the indexes dirty in O(1); nothing is recomputed until the
/// first query that needs a cumulative sum. This makes recomputation timing
/// an explicit contract: a batch of many mutations amortizes to a single
/// O(S) rebuild on the next query. Queries that consult cumulative sums
/// therefore take `&mut self`.
///
/// Two models coexist transiently during a batch update: the frozen `before`
/// snapshot and the `after` model being constructed by replaying operations.
/// The engine exclusively owns both; external components never mutate a
/// model directly.
#[derive(Debug, Clone)]
pub struct LayoutModel {
    sections: Vec<SectionModel>,
    spacing: u64,
    heights: SectionOffsetIndex,
    counts: SectionOffsetIndex,
    dirty: bool,
    total_items: usize,
}

impl LayoutModel {
    /// Create an empty model with the given inter-item spacing.
    pub fn new(spacing: u64) -> Self {
        Self {
            sections: Vec::new(),
            spacing,
            heights: SectionOffsetIndex::default(),
            counts: SectionOffsetIndex::default(),
            dirty: false,
            total_items: 0,
        }
    }

    /// Inter-item spacing this model was built with.
    pub fn spacing(&self) -> u64 {
        self.spacing
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of frames across all sections.
    pub fn item_count(&self) -> usize {
        self.total_items
    }

    /// True when no section contains any frame.
    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    /// Borrow a section.
    pub fn section(&self, section: usize) -> Option<&SectionModel> {
        self.sections.get(section)
    }

    /// Append a section. Marks the prefix sums dirty.
    pub fn push_section(&mut self, section: SectionModel) {
        self.total_items += section.item_count();
        self.sections.push(section);
        self.dirty = true;
    }

    /// Frame for `path`. O(1); no prefix sums involved.
    pub fn frame(&self, path: ItemPath) -> Result<ItemFrame, LayoutError> {
        self.sections
            .get(path.section)
            .and_then(|s| s.frame(path.item))
            .ok_or(LayoutError::GeometryNotFound { path })
    }

    /// True when `path` addresses an existing frame.
    pub fn contains(&self, path: ItemPath) -> bool {
        self.frame(path).is_ok()
    }

    /// Absolute offset of `path` from the content start: the section's
    /// prefix-summed start plus the frame's section-relative offset.
    /// O(log S) after an (amortized) index rebuild.
    pub fn absolute_offset(&mut self, path: ItemPath) -> Result<u64, LayoutError> {
        let frame = self.frame(path)?;
        self.ensure_index();
        Ok(self.heights.start_of(path.section) + frame.offset)
    }

    /// Offset at which `section` starts.
    pub fn section_start(&mut self, section: usize) -> Option<u64> {
        if section >= self.sections.len() {
            return None;
        }
        self.ensure_index();
        Some(self.heights.start_of(section))
    }

    /// Total content extent along the scroll axis.
    pub fn total_height(&mut self) -> u64 {
        self.ensure_index();
        self.heights.total()
    }

    /// Derived flat (global) index for `path`.
    pub fn flat_index(&mut self, path: ItemPath) -> Result<FlatIndex, LayoutError> {
        if !self.contains(path) {
            return Err(LayoutError::GeometryNotFound { path });
        }
        self.ensure_index();
        Ok(FlatIndex::new(
            self.counts.start_of(path.section) as usize + path.item,
        ))
    }

    /// Path for a flat index, `None` when past the end.
    pub fn path_at_flat(&mut self, flat: FlatIndex) -> Option<ItemPath> {
        self.ensure_index();
        let section = self.counts.lower_bound(flat.get() as u64)?;
        let item = flat.get() - self.counts.start_of(section) as usize;
        Some(ItemPath::new(section, item))
    }

    /// Section containing the absolute `offset`, with the offset translated
    /// to section-relative coordinates. `None` past the content extent.
    pub(crate) fn locate(&mut self, offset: u64) -> Option<(usize, u64)> {
        self.ensure_index();
        let section = self.heights.lower_bound(offset)?;
        Some((section, offset - self.heights.start_of(section)))
    }

    /// Flat index of the first frame of `section`.
    pub(crate) fn section_flat_start(&mut self, section: usize) -> usize {
        self.ensure_index();
        self.counts.start_of(section) as usize
    }

    /// Insert a frame at `path`, shifting later frames in the section.
    /// Returns `false` when the path is out of range (`item` may equal the
    /// current count to append).
    pub fn insert_item(&mut self, path: ItemPath, kind: ItemKind, size: u64, estimated: bool) -> bool {
        let spacing = self.spacing;
        let Some(section) = self.sections.get_mut(path.section) else {
            return false;
        };
        if section.insert(path.item, kind, size, estimated, spacing) {
            self.total_items += 1;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// Remove the frame at `path`. `None` when absent.
    pub fn remove_item(&mut self, path: ItemPath) -> Option<ItemFrame> {
        let spacing = self.spacing;
        let removed = self.sections.get_mut(path.section)?.remove(path.item, spacing)?;
        self.total_items -= 1;
        self.dirty = true;
        Some(removed)
    }

    /// Replace the size of the frame at `path`, keeping kind and position.
    /// Returns the previous frame, `None` when absent.
    pub fn replace_item_size(
        &mut self,
        path: ItemPath,
        size: u64,
        estimated: bool,
    ) -> Option<ItemFrame> {
        let spacing = self.spacing;
        let previous = self
            .sections
            .get_mut(path.section)?
            .replace_size(path.item, size, estimated, spacing)?;
        self.dirty = true;
        Some(previous)
    }

    /// Rebuild the prefix-sum indexes if a mutation dirtied them.
    fn ensure_index(&mut self) {
        if !self.dirty {
            return;
        }
        self.heights.rebuild(self.sections.iter().map(SectionModel::height));
        self.counts
            .rebuild(self.sections.iter().map(|s| s.item_count() as u64));
        self.dirty = false;
    }
}

/// Geometry equality: same sections, same spacing. Index and dirty state are
/// rebuild artifacts and do not participate.
impl PartialEq for LayoutModel {
    fn eq(&self, other: &Self) -> bool {
        self.spacing == other.spacing && self.sections == other.sections
    }
}

impl Eq for LayoutModel {}
