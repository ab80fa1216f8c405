//! Per-section geometry: an ordered run of frames with cached aggregates.

use crate::geometry::{ItemFrame, ItemKind};

/// Ordered frames of one section (optional header first, items, optional
/// footer last) plus cached aggregate height and estimated-size bookkeeping.
///
/// Frame offsets are relative to the section start. Every mutation restores
/// the contiguity invariant eagerly by re-offsetting the suffix:
/// `offset[i+1] == offset[i] + size[i] + spacing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionModel {
    frames: Vec<ItemFrame>,
    height: u64,
    estimated_count: usize,
}

impl SectionModel {
    /// Create an empty section.
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            height: 0,
            estimated_count: 0,
        }
    }

    /// Number of frames (header and footer included).
    pub fn item_count(&self) -> usize {
        self.frames.len()
    }

    /// True when the section has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Cached aggregate height: trailing edge of the last frame, 0 when
    /// empty. Inter-item spacing is interior only; no trailing spacing.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// True while any frame still carries an estimated (unmeasured) size.
    pub fn has_estimated_sizes(&self) -> bool {
        self.estimated_count > 0
    }

    /// Frame at `index`, if present.
    pub fn frame(&self, index: usize) -> Option<ItemFrame> {
        self.frames.get(index).copied()
    }

    /// All frames in order.
    pub fn frames(&self) -> &[ItemFrame] {
        &self.frames
    }

    /// Append a frame of the given kind and size.
    pub fn push(&mut self, kind: ItemKind, size: u64, estimated: bool, spacing: u64) {
        let offset = if self.frames.is_empty() {
            0
        } else {
            self.height + spacing
        };
        self.frames.push(ItemFrame {
            offset,
            size,
            kind,
            estimated,
        });
        self.height = offset + size;
        if estimated {
            self.estimated_count += 1;
        }
    }

    /// Insert a frame at `index`, shifting later frames. Returns `false`
    /// (and does nothing) when `index > item_count()`.
    pub fn insert(
        &mut self,
        index: usize,
        kind: ItemKind,
        size: u64,
        estimated: bool,
        spacing: u64,
    ) -> bool {
        if index > self.frames.len() {
            return false;
        }
        self.frames.insert(
            index,
            ItemFrame {
                offset: 0, // fixed up by reflow below
                size,
                kind,
                estimated,
            },
        );
        if estimated {
            self.estimated_count += 1;
        }
        self.reflow_from(index, spacing);
        true
    }

    /// Remove the frame at `index`, shifting later frames. `None` when the
    /// index is out of range.
    pub fn remove(&mut self, index: usize, spacing: u64) -> Option<ItemFrame> {
        if index >= self.frames.len() {
            return None;
        }
        let removed = self.frames.remove(index);
        if removed.estimated {
            self.estimated_count -= 1;
        }
        self.reflow_from(index, spacing);
        Some(removed)
    }

    /// Replace the size of the frame at `index`, keeping its kind and
    /// position. Returns the previous frame, or `None` when out of range.
    pub fn replace_size(
        &mut self,
        index: usize,
        size: u64,
        estimated: bool,
        spacing: u64,
    ) -> Option<ItemFrame> {
        if index >= self.frames.len() {
            return None;
        }
        let previous = self.frames[index];
        if previous.estimated && !estimated {
            self.estimated_count -= 1;
        } else if !previous.estimated && estimated {
            self.estimated_count += 1;
        }
        self.frames[index].size = size;
        self.frames[index].estimated = estimated;
        self.reflow_from(index, spacing);
        Some(previous)
    }

    /// Recompute offsets from `index` onward and refresh the cached height.
    fn reflow_from(&mut self, index: usize, spacing: u64) {
        let mut cursor = if index == 0 {
            0
        } else {
            self.frames[index - 1].trailing() + spacing
        };
        for frame in &mut self.frames[index..] {
            frame.offset = cursor;
            cursor = frame.trailing() + spacing;
        }
        self.height = self.frames.last().map(ItemFrame::trailing).unwrap_or(0);
    }

    /// Index of the first frame whose trailing edge lies past `offset`
    /// (section-relative). `None` when `offset >= height()`.
    pub fn first_past(&self, offset: u64) -> Option<usize> {
        let idx = self.frames.partition_point(|f| f.trailing() <= offset);
        (idx < self.frames.len()).then_some(idx)
    }

    /// Number of frames starting strictly before `offset`
    /// (section-relative).
    pub fn count_starting_before(&self, offset: u64) -> usize {
        self.frames.partition_point(|f| f.offset < offset)
    }
}

impl Default for SectionModel {
    fn default() -> Self {
        Self::new()
    }
}
