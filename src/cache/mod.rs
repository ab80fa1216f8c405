//! Lazily populated, selectively invalidated display-attributes cache.
//!
//! The boundary artifact handed to the host toolkit: computed frames plus
//! any in-flight animation state, keyed by path. Entries are invalidated by
//! removal (never mutated in place), so a caller either sees the last-good
//! value or triggers a recompute; there is no observable half-updated state.

use std::collections::HashMap;

use tracing::trace;

use crate::config::{CrossAlignment, LayoutConfig};
use crate::geometry::{ItemPath, Rect, Transform2D};
use crate::model::LayoutModel;

/// Monotonic generation of the committed layout model. Bumped on wholesale
/// replacement (full reload, cross-axis bounds change); entries minted under
/// an older generation are stale and discarded on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Generation(u64);

impl Generation {
    /// The next generation.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Display attributes for one item, as a value copy.
///
/// Externally held copies become stale (never corrupted) after the next
/// update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedAttributes {
    /// Path this entry describes.
    pub path: ItemPath,
    /// Full 2-D frame; `y`/`height` from the layout model, `x`/`width` from
    /// the cross-axis alignment policy.
    pub frame: Rect,
    /// Opacity for in-flight animations. 1.0 when at rest.
    pub alpha: f32,
    /// Transform for in-flight animations. Identity when at rest.
    pub transform: Transform2D,
    /// Generation of the model this entry was computed against.
    pub generation: Generation,
}

/// Path-keyed attribute store with generation-based staleness detection.
#[derive(Debug, Default)]
pub struct AttributesCache {
    entries: HashMap<ItemPath, CachedAttributes>,
    generation: Generation,
}

impl AttributesCache {
    /// Create an empty cache at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes for `path`: the cached entry when its generation is
    /// current, otherwise recomputed from the model's frame and cached.
    /// `None` when the path has no geometry in the model.
    pub fn attributes_for(
        &mut self,
        path: ItemPath,
        model: &mut LayoutModel,
        config: &LayoutConfig,
        viewport_cross: u64,
    ) -> Option<CachedAttributes> {
        if let Some(entry) = self.entries.get(&path) {
            if entry.generation == self.generation {
                return Some(*entry);
            }
            // Stale entry from a superseded model: discard, never reuse.
            self.entries.remove(&path);
        }

        let frame = model.frame(path).ok()?;
        let offset = model.absolute_offset(path).ok()?;
        let (x, width) = cross_placement(config, viewport_cross);
        let computed = CachedAttributes {
            path,
            frame: Rect::new(x, offset, width, frame.size),
            alpha: 1.0,
            transform: Transform2D::IDENTITY,
            generation: self.generation,
        };
        trace!(path = %path, "computed attributes");
        self.entries.insert(path, computed);
        Some(computed)
    }

    /// Drop entries for the given paths. Called with the reconciler's
    /// invalidation set, and with explicit size-change notifications.
    pub fn invalidate<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = ItemPath>,
    {
        for path in paths {
            self.entries.remove(&path);
        }
    }

    /// Drop everything and bump the generation: the model was replaced
    /// wholesale (full reload, layout reconfiguration).
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.generation = self.generation.next();
    }
}

/// Cross-axis placement from the alignment policy.
fn cross_placement(config: &LayoutConfig, viewport_cross: u64) -> (u64, u64) {
    match config.item_cross_extent {
        None => (0, viewport_cross),
        Some(extent) => {
            let extent = extent.min(viewport_cross);
            let x = match config.alignment {
                CrossAlignment::Leading => 0,
                CrossAlignment::Trailing => viewport_cross - extent,
                CrossAlignment::Center => (viewport_cross - extent) / 2,
            };
            (x, extent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ItemKind;
    use crate::model::SectionModel;

    fn model_of(sizes: &[u64]) -> LayoutModel {
        let mut model = LayoutModel::new(0);
        let mut section = SectionModel::new();
        for &size in sizes {
            section.push(ItemKind::Item, size, false, 0);
        }
        model.push_section(section);
        model
    }

    #[test]
    fn lookup_computes_then_caches() {
        let mut cache = AttributesCache::new();
        let mut model = model_of(&[50, 30]);
        let config = LayoutConfig::default();

        let attrs = cache
            .attributes_for(ItemPath::new(0, 1), &mut model, &config, 320)
            .expect("path exists");
        assert_eq!(attrs.frame, Rect::new(0, 50, 320, 30));
        assert_eq!(attrs.alpha, 1.0);
        assert!(attrs.transform.is_identity());
        assert_eq!(cache.len(), 1);

        // Second lookup serves the cached copy.
        let again = cache
            .attributes_for(ItemPath::new(0, 1), &mut model, &config, 320)
            .unwrap();
        assert_eq!(again, attrs);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_path_yields_none_not_an_error() {
        let mut cache = AttributesCache::new();
        let mut model = model_of(&[50]);
        let config = LayoutConfig::default();
        assert!(cache
            .attributes_for(ItemPath::new(0, 7), &mut model, &config, 320)
            .is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_removes_selected_entries_only() {
        let mut cache = AttributesCache::new();
        let mut model = model_of(&[50, 30, 20]);
        let config = LayoutConfig::default();
        for i in 0..3 {
            cache
                .attributes_for(ItemPath::new(0, i), &mut model, &config, 320)
                .unwrap();
        }

        cache.invalidate([ItemPath::new(0, 0), ItemPath::new(0, 2)]);
        assert_eq!(cache.len(), 1);

        // The invalidated path recomputes against the (possibly mutated)
        // model on next query.
        model.replace_item_size(ItemPath::new(0, 0), 80, false);
        let attrs = cache
            .attributes_for(ItemPath::new(0, 0), &mut model, &config, 320)
            .unwrap();
        assert_eq!(attrs.frame.height, 80);
    }

    #[test]
    fn generation_mismatch_discards_stale_entries() {
        let mut cache = AttributesCache::new();
        let mut model = model_of(&[50]);
        let config = LayoutConfig::default();

        let stale = cache
            .attributes_for(ItemPath::new(0, 0), &mut model, &config, 320)
            .unwrap();
        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(stale.generation < cache.generation());

        let fresh = cache
            .attributes_for(ItemPath::new(0, 0), &mut model, &config, 320)
            .unwrap();
        assert_eq!(fresh.generation, cache.generation());
    }

    #[test]
    fn alignment_policies_place_fixed_width_items() {
        let mut model = model_of(&[50]);
        let base = LayoutConfig {
            item_cross_extent: Some(100),
            ..LayoutConfig::default()
        };

        for (alignment, expected_x) in [
            (CrossAlignment::Leading, 0),
            (CrossAlignment::Trailing, 220),
            (CrossAlignment::Center, 110),
        ] {
            let mut cache = AttributesCache::new();
            let config = LayoutConfig {
                alignment,
                ..base.clone()
            };
            let attrs = cache
                .attributes_for(ItemPath::new(0, 0), &mut model, &config, 320)
                .unwrap();
            assert_eq!(attrs.frame.x, expected_x, "{alignment:?}");
            assert_eq!(attrs.frame.width, 100);
        }
    }

    #[test]
    fn cross_extent_clamps_to_viewport() {
        let mut cache = AttributesCache::new();
        let mut model = model_of(&[50]);
        let config = LayoutConfig {
            item_cross_extent: Some(500),
            ..LayoutConfig::default()
        };
        let attrs = cache
            .attributes_for(ItemPath::new(0, 0), &mut model, &config, 320)
            .unwrap();
        assert_eq!(attrs.frame.width, 320);
        assert_eq!(attrs.frame.x, 0);
    }
}
