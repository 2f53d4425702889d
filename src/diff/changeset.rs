//! Minimal set of edits between two snapshots.
//!
//! Old-side addresses (`removed_*`, `from`) refer to the snapshot the engine
//! currently holds; new-side addresses (`inserted_*`, `to`, `updated_*`,
//! supplementary edits) refer to the target snapshot.

use crate::model::{Alignment, ItemId, ItemKind, ItemPath, ItemSize, SectionId, SupplementaryPath};
use std::collections::BTreeMap;

/// Layout-relevant description of an item, used to create or refresh its
/// model. Content itself never reaches the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSeed {
    /// Identity.
    pub id: ItemId,
    /// Cell, header or footer.
    pub kind: ItemKind,
    /// Initial sizing hint.
    pub size_hint: ItemSize,
    /// Horizontal justification.
    pub alignment: Alignment,
}

/// A section present only in the old snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRemoval {
    /// Old index.
    pub index: usize,
    /// Identity.
    pub id: SectionId,
}

/// A surviving section whose relative order changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMove {
    /// Identity.
    pub id: SectionId,
    /// Old index.
    pub from: usize,
    /// New index.
    pub to: usize,
}

/// A cell present only in the old snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRemoval {
    /// Identity.
    pub id: ItemId,
    /// Old address.
    pub path: ItemPath,
}

/// A cell present only in the new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInsertion {
    /// New address.
    pub path: ItemPath,
    /// Layout description.
    pub seed: ItemSeed,
}

/// A cell whose identity survived but whose address changed relative to its
/// neighbours. Its model, and therefore its measured size, travels with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMove {
    /// Identity.
    pub id: ItemId,
    /// Old address.
    pub from: ItemPath,
    /// New address.
    pub to: ItemPath,
}

/// A cell whose identity survived but whose content changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpdate {
    /// New address.
    pub path: ItemPath,
    /// Refreshed layout description.
    pub seed: ItemSeed,
}

/// Edit applied to a header or footer of a new-side section.
#[derive(Debug, Clone, PartialEq)]
pub enum SupplementaryEdit {
    /// Newly attached, or replaced by a different identity.
    Inserted(ItemSeed),
    /// Same identity, different content.
    Updated(ItemSeed),
    /// Detached.
    Removed,
}

/// Header/footer change.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplementaryChange {
    /// New-side address.
    pub path: SupplementaryPath,
    /// What happened.
    pub edit: SupplementaryEdit,
}

/// Target cell order of a section whose item list changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionShape {
    /// Cell identities, top to bottom.
    pub items: Vec<ItemId>,
}

/// Result of diffing two snapshots.
///
/// Besides the edit lists used by renderers for animation and by the engine
/// for validation, the changeset carries the new section order and the
/// target shape of every section whose cell list changed. Sections absent
/// from `shapes` keep their cells as they are.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Changeset {
    /// Section identities in new order.
    pub section_order: Vec<SectionId>,
    /// Removed sections (old indices).
    pub removed_sections: Vec<SectionRemoval>,
    /// Inserted sections (new indices).
    pub inserted_sections: Vec<usize>,
    /// Moved sections.
    pub moved_sections: Vec<SectionMove>,
    /// Removed cells (old addresses).
    pub removed_items: Vec<ItemRemoval>,
    /// Inserted cells (new addresses).
    pub inserted_items: Vec<ItemInsertion>,
    /// Moved cells.
    pub moved_items: Vec<ItemMove>,
    /// Updated cells (new addresses).
    pub updated_items: Vec<ItemUpdate>,
    /// Header/footer edits.
    pub supplementary: Vec<SupplementaryChange>,
    /// New cell order, keyed by new section index.
    pub shapes: BTreeMap<usize, SectionShape>,
}

impl Changeset {
    /// True if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.removed_sections.is_empty()
            && self.inserted_sections.is_empty()
            && self.moved_sections.is_empty()
            && self.removed_items.is_empty()
            && self.inserted_items.is_empty()
            && self.moved_items.is_empty()
            && self.updated_items.is_empty()
            && self.supplementary.is_empty()
    }

    /// True if sections were inserted, removed or reordered.
    pub fn changes_sections(&self) -> bool {
        !(self.removed_sections.is_empty()
            && self.inserted_sections.is_empty()
            && self.moved_sections.is_empty())
    }

    /// Compact one-line description, e.g. `+2 -1 ~0 !1 sections(+0 -0 ~0)`.
    pub fn summary(&self) -> String {
        format!(
            "+{} -{} ~{} !{} sections(+{} -{} ~{}) supplementary({})",
            self.inserted_items.len(),
            self.removed_items.len(),
            self.moved_items.len(),
            self.updated_items.len(),
            self.inserted_sections.len(),
            self.removed_sections.len(),
            self.moved_sections.len(),
            self.supplementary.len(),
        )
    }
}
