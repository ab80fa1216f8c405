//! The layout engine facade.
//!
//! [`LayoutEngine`] ties the pieces together behind the host-facing update
//! protocol: build an initial layout, submit operation batches, consume the
//! anchor-preserving offset correction at commit time, and query display
//! attributes for whatever the viewport shows. The host toolkit drives the
//! protocol; the engine owns every model and cache in between.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, warn};

use crate::cache::{AttributesCache, CachedAttributes, Generation};
use crate::config::{BatchPolicy, LayoutConfig};
use crate::error::LayoutError;
use crate::geometry::{AxisRect, ItemKind, ItemPath, Rect};
use crate::model::{LayoutModel, SectionModel};
use crate::spatial::{self, VisibleRange};
use crate::update::{self, AnchorCandidate, Operation, SizeSource};

/// Declared shape of one section at initial-layout time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionContent {
    /// Number of regular items (headers and footers not included).
    pub items: usize,
    /// Whether the section opens with a header.
    pub has_header: bool,
    /// Whether the section closes with a footer.
    pub has_footer: bool,
}

impl SectionContent {
    /// A plain section of `items` regular items.
    pub fn items(items: usize) -> Self {
        Self {
            items,
            has_header: false,
            has_footer: false,
        }
    }
}

/// How much cached state a viewport bounds change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsInvalidation {
    /// Scroll-axis-only change: every cached frame stays valid.
    None,
    /// Cross-axis change: every frame's cross placement is stale, the whole
    /// cache was dropped and the generation bumped.
    Everything,
}

/// A batch accepted under [`BatchPolicy::Queue`] while another was in
/// flight. Measured sizes for its targets are captured at submission time so
/// the deferred replay sees the same measurements the caller had.
struct QueuedBatch {
    ops: Vec<Operation>,
    sizes: HashMap<ItemPath, u64>,
}

impl std::fmt::Debug for QueuedBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedBatch")
            .field("ops", &self.ops.len())
            .field("sizes", &self.sizes.len())
            .finish()
    }
}

/// Host-facing facade over the layout model, reconciler, and cache.
///
/// # Update protocol
/// 1. [`prepare_for_update`](Self::prepare_for_update) with the batch.
/// 2. [`target_content_offset`](Self::target_content_offset) with the scroll
///    offset the host was about to use; the returned offset folds in the
///    anchor correction and consumes it.
/// 3. Attribute queries ([`attributes_for_items_in`](Self::attributes_for_items_in))
///    now reflect the new layout.
///
/// Submitting a second batch between steps 1 and 2 is governed by
/// [`BatchPolicy`].
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    model: LayoutModel,
    cache: AttributesCache,
    viewport: Rect,
    anchor: Option<AnchorCandidate>,
    pending_correction: Option<i64>,
    queued: VecDeque<QueuedBatch>,
}

impl LayoutEngine {
    /// Create an engine with no content and a zero viewport.
    pub fn new(config: LayoutConfig) -> Self {
        let spacing = config.spacing;
        Self {
            config,
            model: LayoutModel::new(spacing),
            cache: AttributesCache::new(),
            viewport: Rect::default(),
            anchor: None,
            pending_correction: None,
            queued: VecDeque::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The current viewport in content coordinates.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Current cache generation.
    pub fn generation(&self) -> Generation {
        self.cache.generation()
    }

    /// True while an offset correction awaits consumption by
    /// [`target_content_offset`](Self::target_content_offset).
    pub fn update_in_flight(&self) -> bool {
        self.pending_correction.is_some()
    }

    /// Build the layout model from scratch for the declared sections,
    /// asking `sizes` for measurements and falling back to estimates.
    ///
    /// Replaces all prior state: cache, anchor, pending correction, and any
    /// queued batches are discarded.
    pub fn prepare_for_initial_layout(&mut self, sections: &[SectionContent], sizes: &dyn SizeSource) {
        let spacing = self.config.spacing;
        let mut model = LayoutModel::new(spacing);
        for (s, content) in sections.iter().enumerate() {
            let mut section = SectionModel::new();
            let mut kinds = Vec::with_capacity(
                content.items + usize::from(content.has_header) + usize::from(content.has_footer),
            );
            if content.has_header {
                kinds.push(ItemKind::Header);
            }
            kinds.extend(std::iter::repeat(ItemKind::Item).take(content.items));
            if content.has_footer {
                kinds.push(ItemKind::Footer);
            }
            for (i, kind) in kinds.into_iter().enumerate() {
                let path = ItemPath::new(s, i);
                match sizes.measured_size(path, kind) {
                    Some(size) => section.push(kind, size, false, spacing),
                    None => section.push(kind, self.config.estimated_sizes.for_kind(kind), true, spacing),
                }
            }
            model.push_section(section);
        }
        info!(
            sections = sections.len(),
            items = model.item_count(),
            "initial layout prepared"
        );
        self.model = model;
        self.cache.invalidate_all();
        self.anchor = None;
        self.pending_correction = None;
        self.queued.clear();
    }

    /// Submit a batch of operations.
    ///
    /// When no update is in flight the batch reconciles immediately and its
    /// offset correction is staged for the next
    /// [`target_content_offset`](Self::target_content_offset) call. While
    /// one is in flight, [`BatchPolicy::Reject`] refuses the batch whole
    /// with [`LayoutError::BatchInFlight`] and [`BatchPolicy::Queue`] defers
    /// it until the in-flight correction is consumed.
    ///
    /// Returns the recoverable diagnostics the reconciler raised (skipped
    /// operations and the like); an empty vec for a clean batch.
    pub fn prepare_for_update(
        &mut self,
        ops: Vec<Operation>,
        sizes: &dyn SizeSource,
    ) -> Result<Vec<LayoutError>, LayoutError> {
        if self.update_in_flight() {
            match self.config.batch_policy {
                BatchPolicy::Reject => {
                    warn!(ops = ops.len(), "batch rejected, update in flight");
                    return Err(LayoutError::BatchInFlight);
                }
                BatchPolicy::Queue => {
                    let captured = capture_sizes(&ops, sizes, &self.model);
                    debug!(ops = ops.len(), queued = self.queued.len() + 1, "batch queued");
                    self.queued.push_back(QueuedBatch {
                        ops,
                        sizes: captured,
                    });
                    return Ok(Vec::new());
                }
            }
        }
        Ok(self.apply_batch(&ops, sizes))
    }

    /// Resolve the scroll offset to use when committing the in-flight
    /// update: `proposed` plus the pending anchor correction, clamped to the
    /// valid scroll range. Consumes the correction and replays any queued
    /// batches (their corrections become the next pending one).
    pub fn target_content_offset(&mut self, proposed: u64) -> u64 {
        let correction = self.pending_correction.take().unwrap_or(0);
        let corrected = (proposed as i64 + correction).max(0) as u64;
        let max = self
            .model
            .total_height()
            .saturating_sub(self.viewport.height);
        let resolved = corrected.min(max);
        self.viewport.y = resolved;

        while let Some(batch) = self.queued.pop_front() {
            self.apply_batch(&batch.ops, &batch.sizes);
        }
        resolved
    }

    /// Display attributes for every item intersecting `rect` (a scroll-axis
    /// window in content coordinates), in visual order.
    pub fn attributes_for_items_in(&mut self, rect: AxisRect) -> Vec<CachedAttributes> {
        let range = spatial::visible_range(&mut self.model, rect);
        let paths: Vec<ItemPath> = range.iter(&self.model).collect();
        paths
            .into_iter()
            .filter_map(|path| {
                self.cache
                    .attributes_for(path, &mut self.model, &self.config, self.viewport.width)
            })
            .collect()
    }

    /// Display attributes for one item; `None` for a path with no geometry.
    pub fn attributes_for_item(&mut self, path: ItemPath) -> Option<CachedAttributes> {
        self.cache
            .attributes_for(path, &mut self.model, &self.config, self.viewport.width)
    }

    /// The contiguous range of items visible in the current viewport.
    pub fn visible_range(&mut self) -> VisibleRange {
        spatial::visible_range(&mut self.model, self.viewport.axis_rect())
    }

    /// Hit test: the item whose frame contains the scroll-axis `point`.
    pub fn item_at(&mut self, point: u64) -> Option<ItemPath> {
        spatial::item_at(&mut self.model, point)
    }

    /// Total content extent along the scroll axis.
    pub fn content_height(&mut self) -> u64 {
        self.model.total_height()
    }

    /// Pin the scroll anchor for the next update to `path` instead of the
    /// automatic visible-edge selection.
    pub fn set_anchor(&mut self, path: ItemPath) -> Result<(), LayoutError> {
        let offset = self.model.absolute_offset(path)?;
        self.anchor = Some(AnchorCandidate {
            path,
            offset_from_edge: offset as i64 - self.viewport.y as i64,
        });
        Ok(())
    }

    /// Move the viewport without touching cached geometry. Scrolling never
    /// invalidates; only bounds changes can.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Apply a viewport bounds change and report what it invalidated.
    ///
    /// A cross-axis (width) change stales every cached cross placement, so
    /// the whole cache is dropped and the generation bumped. A scroll-axis
    /// change (position or height) invalidates nothing.
    pub fn invalidation_context_for_bounds_change(&mut self, bounds: Rect) -> BoundsInvalidation {
        let cross_changed = bounds.width != self.viewport.width;
        self.viewport = bounds;
        if cross_changed {
            debug!(width = bounds.width, "cross-axis bounds change, full invalidation");
            self.cache.invalidate_all();
            BoundsInvalidation::Everything
        } else {
            BoundsInvalidation::None
        }
    }

    /// Commit one self-sizing measurement: a single-item reload batch whose
    /// anchor correction joins the pending one.
    ///
    /// This is the deferred half of estimate-first sizing: frames created
    /// from estimates are corrected here once the host has real
    /// measurements, without re-running the original batch. The reload is a
    /// batch like any other, so [`BatchPolicy`] applies while an update is
    /// in flight.
    pub fn commit_measurement(&mut self, path: ItemPath, size: u64) -> Result<(), LayoutError> {
        if !self.model.contains(path) {
            return Err(LayoutError::GeometryNotFound { path });
        }
        let sizes: HashMap<ItemPath, u64> = HashMap::from([(path, size)]);
        self.prepare_for_update(vec![Operation::reload(path.section, path.item)], &sizes)?;
        Ok(())
    }

    /// Reconcile `ops` against the current model and fold the outcome into
    /// engine state. Returns the reconciler's diagnostics.
    fn apply_batch(&mut self, ops: &[Operation], sizes: &dyn SizeSource) -> Vec<LayoutError> {
        let outcome = update::reconcile(
            &mut self.model,
            ops,
            sizes,
            &self.config,
            self.anchor.take(),
            self.viewport.axis_rect(),
        );
        self.cache.invalidate(outcome.invalidated.iter().copied());
        self.model = outcome.after;
        // Corrections from stacked batches accumulate until consumed.
        let carried = self.pending_correction.unwrap_or(0);
        self.pending_correction = Some(carried + outcome.offset_correction);
        outcome.diagnostics
    }
}

/// Capture measured sizes for a batch's insert and reload targets so a
/// queued batch replays with the measurements current at submission.
fn capture_sizes(
    ops: &[Operation],
    sizes: &dyn SizeSource,
    model: &LayoutModel,
) -> HashMap<ItemPath, u64> {
    let mut captured = HashMap::new();
    for &op in ops {
        let (path, kind) = match op {
            // Inserts always create regular items.
            Operation::Insert { path } => (path, ItemKind::Item),
            // Reload targets exist in the current model; take their kind
            // from it, falling back for paths the reconciler will skip.
            Operation::Reload { path } => (
                path,
                model.frame(path).map(|f| f.kind).unwrap_or(ItemKind::Item),
            ),
            Operation::Delete { .. } | Operation::Move { .. } => continue,
        };
        if let Some(size) = sizes.measured_size(path, kind) {
            captured.insert(path, size);
        }
    }
    captured
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
