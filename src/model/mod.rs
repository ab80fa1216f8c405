//! Geometry snapshots: sections, the layout model, and its prefix-sum
//! indexes.

pub mod layout_model;
pub mod offset_index;
pub mod section;

pub use layout_model::LayoutModel;
pub use offset_index::SectionOffsetIndex;
pub use section::SectionModel;
