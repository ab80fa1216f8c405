//! Prefix sums over section heights via a Fenwick tree.
//!
//! Backs the section level of every spatial query: `prefix_sum` answers
//! "where does section k start", `lower_bound` answers "which section
//! contains this offset". Both are O(log n); `lower_bound` is O(log^2 n)
//! because it binary-searches over prefix sums.

/// Fenwick-tree prefix sums over a sequence of section heights.
///
/// Heights are `u64`; the backing tree stores `i64` so `set` can apply
/// signed deltas. The raw heights are kept alongside the tree: Fenwick
/// nodes cover power-of-two spans, so a grown tree must be re-propagated
/// from the originals rather than extended with zeroed nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOffsetIndex {
    tree: Vec<i64>,
    heights: Vec<u64>,
}

impl SectionOffsetIndex {
    /// Create an empty index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            heights: Vec::with_capacity(capacity),
        }
    }

    /// Number of tracked sections.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// True when no sections are tracked.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Cumulative height up to and including section `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn prefix_sum(&self, index: usize) -> u64 {
        assert!(
            index < self.heights.len(),
            "section {} out of bounds (len: {})",
            index,
            self.heights.len()
        );
        fenwick::array::prefix_sum(&self.tree, index).max(0) as u64
    }

    /// Offset at which section `index` starts: the cumulative height of
    /// everything before it.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn start_of(&self, index: usize) -> u64 {
        if index == 0 {
            0
        } else {
            self.prefix_sum(index - 1)
        }
    }

    /// Total height of all tracked sections.
    pub fn total(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.prefix_sum(self.heights.len() - 1)
        }
    }

    /// Index of the section containing `offset`: the first index whose
    /// cumulative height exceeds it. `None` when `offset >= total()`.
    ///
    /// Section `i` covers `[prefix_sum(i-1), prefix_sum(i))`.
    pub fn lower_bound(&self, offset: u64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        let mut left = 0;
        let mut right = self.heights.len();
        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > offset {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.heights.len()).then_some(left)
    }

    /// Append a section with the given height, growing storage as needed.
    ///
    /// Growth cannot extend the tree in place: the new high-level nodes
    /// would miss the contributions of earlier sections. The tree is
    /// re-propagated from the stored heights instead.
    pub fn push(&mut self, height: u64) {
        self.heights.push(height);
        if self.heights.len() > self.tree.len() {
            self.tree = vec![0; self.tree.len().max(1) * 2];
            for (i, &h) in self.heights.iter().enumerate() {
                fenwick::array::update(&mut self.tree, i, h as i64);
            }
        } else {
            fenwick::array::update(&mut self.tree, self.heights.len() - 1, height as i64);
        }
    }

    /// Overwrite the height of section `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, height: u64) {
        assert!(
            index < self.heights.len(),
            "section {} out of bounds (len: {})",
            index,
            self.heights.len()
        );
        let delta = height as i64 - self.heights[index] as i64;
        self.heights[index] = height;
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Discard all sections, retaining allocated capacity.
    pub fn clear(&mut self) {
        // Update propagation can touch nodes past len, so zero the whole tree.
        self.tree.fill(0);
        self.heights.clear();
    }

    /// Replace the whole sequence in one pass. Used by the lazy
    /// rebuild-on-query path after a dirtying batch of mutations.
    pub fn rebuild(&mut self, heights: impl Iterator<Item = u64>) {
        self.clear();
        for h in heights {
            self.push(h);
        }
    }
}

impl Default for SectionOffsetIndex {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}
