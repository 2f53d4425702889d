//! Data sources and measurement collaborators.
//!
//! This module provides the inputs the layout loop consumes:
//! - [`DataSource`]: full sectioned snapshots of the conversation
//! - [`Measurer`]: exact sizes for rendered content
//!
//! Production implementations are [`TranscriptSource`] and
//! [`MonospaceMeasurer`]; [`StaticSource`] and [`FixedMeasurer`] are
//! deterministic doubles for tests and benchmarks.

use crate::diff::Snapshot;

pub mod measure;
pub mod transcript;

pub use measure::{FixedMeasurer, Measurer, MonospaceMeasurer};
pub use transcript::{TranscriptError, TranscriptSource};

/// Supplier of full sectioned snapshots.
///
/// Implementations return the complete current state every time; the differ
/// works out what changed.
pub trait DataSource {
    /// Renderable content of one item.
    type Content: PartialEq;

    /// Current state of the conversation.
    fn snapshot(&self) -> Snapshot<Self::Content>;
}

/// Source that returns whatever snapshot it was last given.
#[derive(Debug, Clone)]
pub struct StaticSource<C> {
    snapshot: Snapshot<C>,
}

impl<C> Default for StaticSource<C> {
    fn default() -> Self {
        Self {
            snapshot: Snapshot::default(),
        }
    }
}

impl<C: Clone> StaticSource<C> {
    /// Source serving `snapshot`.
    pub fn new(snapshot: Snapshot<C>) -> Self {
        Self { snapshot }
    }

    /// Replace the served snapshot.
    pub fn set_snapshot(&mut self, snapshot: Snapshot<C>) {
        self.snapshot = snapshot;
    }
}

impl<C: Clone + PartialEq> DataSource for StaticSource<C> {
    type Content = C;

    fn snapshot(&self) -> Snapshot<C> {
        self.snapshot.clone()
    }
}
