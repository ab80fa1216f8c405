//! Engine configuration.
//!
//! All knobs are plain data deserializable from the host's config file; the
//! engine never reads files itself.

use crate::geometry::ItemKind;
use serde::Deserialize;

/// Cross-axis placement of items narrower than the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CrossAlignment {
    /// Flush with the leading cross edge.
    #[default]
    Leading,
    /// Flush with the trailing cross edge.
    Trailing,
    /// Centered.
    Center,
}

/// What to do with a batch submitted while a previous one has not fully
/// committed (its offset correction not yet consumed by the host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Refuse the new batch; the caller must retry after committing.
    #[default]
    Reject,
    /// Queue the new batch; it runs as soon as the in-flight one commits.
    Queue,
}

/// Estimated sizes used for frames that have not been measured yet.
///
/// An insert without a measured size gets the estimate for its kind and is
/// flagged estimated so a later measurement pass can correct it without
/// re-running the whole reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EstimatedSizes {
    /// Estimate for regular items.
    pub item: u64,
    /// Estimate for section headers.
    pub header: u64,
    /// Estimate for section footers.
    pub footer: u64,
}

impl EstimatedSizes {
    /// Estimate for a given kind.
    pub fn for_kind(&self, kind: ItemKind) -> u64 {
        match kind {
            ItemKind::Header => self.header,
            ItemKind::Item => self.item,
            ItemKind::Footer => self.footer,
        }
    }
}

impl Default for EstimatedSizes {
    fn default() -> Self {
        Self {
            item: 40,
            header: 24,
            footer: 24,
        }
    }
}

/// Top-level engine configuration.
///
/// # Examples
/// ```
/// # use chatgrid::config::LayoutConfig;
/// let config = LayoutConfig::default();
/// assert_eq!(config.spacing, 0);
/// assert!(!config.reversed);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Inter-item spacing along the scroll axis.
    pub spacing: u64,
    /// Estimated sizes for unmeasured frames.
    pub estimated_sizes: EstimatedSizes,
    /// Chat-style inverted layout: the newest item sits at the trailing end
    /// and older history is prepended at the leading end. Affects only the
    /// automatic anchor selection edge, not stored geometry.
    pub reversed: bool,
    /// Cross-axis alignment policy for item frames.
    pub alignment: CrossAlignment,
    /// Fixed cross-axis extent for items; `None` fills the viewport.
    pub item_cross_extent: Option<u64>,
    /// Policy for batches submitted while one is in flight.
    pub batch_policy: BatchPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 0,
            estimated_sizes: EstimatedSizes::default(),
            reversed: false,
            alignment: CrossAlignment::Leading,
            item_cross_extent: None,
            batch_policy: BatchPolicy::Reject,
        }
    }
}
