//! Error types for the layout engine.
//!
//! Errors split along the propagation policy:
//!
//! - [`LayoutError`] - contract violations by the caller (desynchronized data
//!   source, duplicate identities, malformed addresses). These are surfaced
//!   loudly; the engine never clamps or guesses, since tolerating them would
//!   corrupt cached offsets.
//! - [`SettingsError`](crate::layout::settings::SettingsError) - invalid
//!   configuration, rejected when settings are constructed.
//!
//! Degraded-but-safe conditions (querying a path that scrolled out of the
//! known set, measuring an item that was just removed) are not errors at all:
//! queries return `None` and stale measurements are dropped.

use super::identifiers::{ItemId, SectionId};
use super::item_path::{ItemPath, MalformedPath};
use crate::layout::settings::SettingsError;
use thiserror::Error;

/// Contract violation detected by the differ or the engine.
///
/// When `apply` returns one of these the engine state is untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A changeset refers to an item path the engine does not have, or the
    /// item at that path has a different identity.
    #[error("changeset references unknown item {id} at {path}")]
    UnknownItem {
        /// Identity named by the changeset.
        id: ItemId,
        /// Address named by the changeset.
        path: ItemPath,
    },

    /// A changeset refers to a section index or id the engine does not have.
    #[error("changeset references unknown section {0}")]
    UnknownSection(SectionId),

    /// The changeset was computed against a different snapshot than the one
    /// the engine currently holds.
    #[error("stale changeset: {0}")]
    StaleChangeset(String),

    /// The same item identity appears twice in one snapshot.
    #[error("duplicate item identity {0} in snapshot")]
    DuplicateItem(ItemId),

    /// The same section identity appears twice in one snapshot.
    #[error("duplicate section identity {0} in snapshot")]
    DuplicateSection(SectionId),

    /// Negative platform index.
    #[error(transparent)]
    MalformedPath(#[from] MalformedPath),

    /// A measured size that is negative or not finite.
    #[error("invalid measured size {width}x{height} for {id}")]
    InvalidSize {
        /// Item being measured.
        id: ItemId,
        /// Reported width.
        width: f64,
        /// Reported height.
        height: f64,
    },

    /// Settings rejected during an invalidation.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
