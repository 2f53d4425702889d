//! Layout engine (pure).
//!
//! Positions items vertically, caches their measured sizes, and keeps the
//! visible content stable while the underlying list changes.
//!
//! # Components
//! - [`LayoutEngine`]: owns item models and answers frame queries
//! - [`SectionIndex`]: O(log n) section start offsets
//! - [`LayoutSettings`]: spacing, insets and the placeholder size
//! - [`AnchorPolicy`]: how scroll position is preserved
//! - [`LayoutUpdate`]: what changed after each mutation

pub mod anchor;
pub mod dump;
pub mod engine;
pub mod invalidation;
pub mod item_model;
pub mod section;
pub mod section_index;
pub mod settings;
pub mod types;

pub use anchor::AnchorPolicy;
pub use engine::LayoutEngine;
pub use invalidation::{InvalidationReason, LayoutUpdate, UpdateCause};
pub use item_model::ItemModel;
pub use section::SectionModel;
pub use section_index::SectionIndex;
pub use settings::{LayoutSettings, SettingsError};
pub use types::{Frame, ItemAttributes, Viewport};
