//! Layout engine for chronological, chat-style scrolling lists.
//!
//! The engine owns the geometry of a sectioned list of variably sized items
//! along one scroll axis: where every item sits, what is visible in a
//! viewport, and how the scroll offset must be corrected when a batch of
//! inserts, deletes, moves, and reloads commits so the content the user is
//! looking at does not move. It does no rendering and reads no input; a host
//! toolkit drives it and consumes [`cache::CachedAttributes`] values.
//!
//! # Overview
//! - [`geometry`]: paths, frames, and interval types.
//! - [`model`]: per-section frame sequences plus global prefix-sum indexes.
//! - [`spatial`]: visible-range and hit-test queries.
//! - [`update`]: batch operations, anchoring, and reconciliation.
//! - [`cache`]: the host-facing display-attributes cache.
//! - [`engine`]: the facade tying the update protocol together.
//!
//! # Example
//! ```
//! use chatgrid::config::LayoutConfig;
//! use chatgrid::engine::{LayoutEngine, SectionContent};
//! use chatgrid::geometry::Rect;
//! use chatgrid::update::{Operation, Unmeasured};
//!
//! let mut engine = LayoutEngine::new(LayoutConfig::default());
//! engine.set_viewport(Rect::new(0, 0, 320, 480));
//! engine.prepare_for_initial_layout(&[SectionContent::items(100)], &Unmeasured);
//!
//! engine.prepare_for_update(vec![Operation::insert(0, 0)], &Unmeasured).unwrap();
//! let offset = engine.target_content_offset(0);
//! let visible = engine.attributes_for_items_in(Rect::new(0, offset, 320, 480).axis_rect());
//! assert!(!visible.is_empty());
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod model;
pub mod spatial;
pub mod update;
