//! Snapshots and the structural differ (pure).
//!
//! A [`DataSource`](crate::source::DataSource) produces a full [`Snapshot`]
//! each time its data changes; [`diff`] turns two consecutive snapshots into
//! a [`Changeset`] the layout engine applies incrementally.

pub mod changeset;
pub mod differ;
pub mod snapshot;

pub use changeset::{
    Changeset, ItemInsertion, ItemMove, ItemRemoval, ItemSeed, ItemUpdate, SectionMove,
    SectionRemoval, SectionShape, SupplementaryChange, SupplementaryEdit,
};
pub use differ::diff;
pub use snapshot::{ItemSnapshot, SectionSnapshot, Snapshot};
