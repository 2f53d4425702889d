//! Identity-based structural diff
//!
//! Items and sections are matched by identity through hash maps; among the
//! survivors of each container, a longest increasing subsequence of old
//! positions picks the largest set that can stay put, and everything else is
//! reported as a move. Total cost is O(n log n) in the number of items.
//!
//! An identity present on both sides is never reported as remove + insert:
//! the engine relies on moves to carry measured sizes to the new address.

use super::changeset::{
    Changeset, ItemInsertion, ItemMove, ItemRemoval, ItemUpdate, SectionMove, SectionRemoval,
    SectionShape, SupplementaryChange, SupplementaryEdit,
};
use super::snapshot::{ItemSnapshot, SectionSnapshot, Snapshot};
use crate::model::{
    ItemId, ItemKind, ItemPath, LayoutError, SectionId, SupplementaryKind, SupplementaryPath,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Identity lookup tables for one snapshot.
struct SnapshotIndex<'a> {
    sections: HashMap<&'a SectionId, usize>,
    items: HashMap<&'a ItemId, ItemPath>,
}

impl<'a> SnapshotIndex<'a> {
    /// Index a snapshot, rejecting duplicate identities.
    fn build<C>(snapshot: &'a Snapshot<C>) -> Result<Self, LayoutError> {
        let mut sections = HashMap::with_capacity(snapshot.sections.len());
        let mut items = HashMap::with_capacity(snapshot.item_count());
        let mut supplementary: HashSet<&ItemId> = HashSet::new();

        for (s, section) in snapshot.sections.iter().enumerate() {
            if sections.insert(&section.id, s).is_some() {
                return Err(LayoutError::DuplicateSection(section.id.clone()));
            }
            for (i, item) in section.items.iter().enumerate() {
                if items.insert(&item.id, ItemPath::new(s, i)).is_some() {
                    return Err(LayoutError::DuplicateItem(item.id.clone()));
                }
            }
            for extra in section.header.iter().chain(section.footer.iter()) {
                if !supplementary.insert(&extra.id) {
                    return Err(LayoutError::DuplicateItem(extra.id.clone()));
                }
            }
        }

        if let Some(clash) = supplementary.iter().find(|id| items.contains_key(*id)) {
            return Err(LayoutError::DuplicateItem((*clash).clone()));
        }

        Ok(Self { sections, items })
    }
}

/// Compute the changeset turning `old` into `new`.
///
/// Pure and side-effect free; safe to run off the owner thread.
///
/// # Errors
/// [`LayoutError::DuplicateSection`] / [`LayoutError::DuplicateItem`] if
/// either snapshot repeats an identity.
pub fn diff<C: PartialEq>(old: &Snapshot<C>, new: &Snapshot<C>) -> Result<Changeset, LayoutError> {
    let old_index = SnapshotIndex::build(old)?;
    let new_index = SnapshotIndex::build(new)?;

    let mut changes = Changeset {
        section_order: new.sections.iter().map(|s| s.id.clone()).collect(),
        ..Changeset::default()
    };

    diff_sections(old, new, &old_index, &new_index, &mut changes);

    // Old sections whose content is unchanged need no item-level scan.
    let mut unchanged_old_sections = HashSet::new();

    for (s, section) in new.sections.iter().enumerate() {
        let old_position = old_index.sections.get(&section.id).copied();
        let old_section = old_position.map(|i| &old.sections[i]);

        if let (Some(i), Some(old_section)) = (old_position, old_section) {
            if old_section.is_content_equal(section) {
                unchanged_old_sections.insert(i);
                continue;
            }
        }

        diff_items(old, &old_index, old_position, section, s, &mut changes);

        for kind in [SupplementaryKind::Header, SupplementaryKind::Footer] {
            let before = old_section.and_then(|o| o.supplementary(kind));
            if let Some(edit) = diff_supplementary(before, section.supplementary(kind), kind) {
                changes.supplementary.push(SupplementaryChange {
                    path: SupplementaryPath {
                        section: s,
                        kind,
                    },
                    edit,
                });
            }
        }
    }

    for (s, section) in old.sections.iter().enumerate() {
        if unchanged_old_sections.contains(&s) {
            continue;
        }
        for (i, item) in section.items.iter().enumerate() {
            if !new_index.items.contains_key(&item.id) {
                changes.removed_items.push(ItemRemoval {
                    id: item.id.clone(),
                    path: ItemPath::new(s, i),
                });
            }
        }
    }

    changes.moved_items.sort_by_key(|m| m.to);

    debug!(summary = %changes.summary(), "computed changeset");
    Ok(changes)
}

fn diff_sections<C>(
    old: &Snapshot<C>,
    new: &Snapshot<C>,
    old_index: &SnapshotIndex<'_>,
    new_index: &SnapshotIndex<'_>,
    changes: &mut Changeset,
) {
    for (i, section) in old.sections.iter().enumerate() {
        if !new_index.sections.contains_key(&section.id) {
            changes.removed_sections.push(SectionRemoval {
                index: i,
                id: section.id.clone(),
            });
        }
    }

    // (new index, old index) of sections present on both sides
    let mut surviving = Vec::new();
    for (j, section) in new.sections.iter().enumerate() {
        match old_index.sections.get(&section.id) {
            Some(&i) => surviving.push((j, i)),
            None => changes.inserted_sections.push(j),
        }
    }

    let old_positions: Vec<usize> = surviving.iter().map(|&(_, i)| i).collect();
    let stable = stable_mask(&old_positions);
    for (&(j, i), keep) in surviving.iter().zip(stable) {
        if !keep {
            changes.moved_sections.push(SectionMove {
                id: new.sections[j].id.clone(),
                from: i,
                to: j,
            });
        }
    }
}

fn diff_items<C: PartialEq>(
    old: &Snapshot<C>,
    old_index: &SnapshotIndex<'_>,
    old_position: Option<usize>,
    section: &SectionSnapshot<C>,
    s: usize,
    changes: &mut Changeset,
) {
    // (new item index, old item index) of items that stayed in this section
    let mut same_section = Vec::new();

    for (k, item) in section.items.iter().enumerate() {
        let to = ItemPath::new(s, k);
        let Some(&from) = old_index.items.get(&item.id) else {
            changes.inserted_items.push(ItemInsertion {
                path: to,
                seed: item.seed(ItemKind::Cell),
            });
            continue;
        };

        let previous = &old.sections[from.section].items[from.item];
        if !previous.is_content_equal(item) {
            changes.updated_items.push(ItemUpdate {
                path: to,
                seed: item.seed(ItemKind::Cell),
            });
        }

        if Some(from.section) == old_position {
            same_section.push((k, from.item));
        } else {
            changes.moved_items.push(ItemMove {
                id: item.id.clone(),
                from,
                to,
            });
        }
    }

    if let Some(old_s) = old_position {
        let old_items: Vec<usize> = same_section.iter().map(|&(_, i)| i).collect();
        for (&(k, i), keep) in same_section.iter().zip(stable_mask(&old_items)) {
            if !keep {
                changes.moved_items.push(ItemMove {
                    id: section.items[k].id.clone(),
                    from: ItemPath::new(old_s, i),
                    to: ItemPath::new(s, k),
                });
            }
        }
    }

    let reshaped = match old_position.map(|i| &old.sections[i]) {
        None => true,
        Some(previous) => {
            previous.items.len() != section.items.len()
                || previous
                    .items
                    .iter()
                    .zip(&section.items)
                    .any(|(a, b)| a.id != b.id)
        }
    };
    if reshaped {
        changes.shapes.insert(
            s,
            SectionShape {
                items: section.items.iter().map(|i| i.id.clone()).collect(),
            },
        );
    }
}

fn diff_supplementary<C: PartialEq>(
    before: Option<&ItemSnapshot<C>>,
    after: Option<&ItemSnapshot<C>>,
    kind: SupplementaryKind,
) -> Option<SupplementaryEdit> {
    match (before, after) {
        (None, None) => None,
        (Some(_), None) => Some(SupplementaryEdit::Removed),
        (None, Some(after)) => Some(SupplementaryEdit::Inserted(after.seed(kind.into()))),
        (Some(before), Some(after)) if before.id != after.id => {
            Some(SupplementaryEdit::Inserted(after.seed(kind.into())))
        }
        (Some(before), Some(after)) if !before.is_content_equal(after) => {
            Some(SupplementaryEdit::Updated(after.seed(kind.into())))
        }
        _ => None,
    }
}

/// Marks the positions of one longest strictly increasing subsequence.
///
/// Patience sorting with back-pointers, O(n log n).
fn stable_mask(sequence: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; sequence.len()];

    for (i, &value) in sequence.iter().enumerate() {
        let slot = tails.partition_point(|&t| sequence[t] < value);
        if slot > 0 {
            previous[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }

    let mut mask = vec![false; sequence.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        mask[i] = true;
        cursor = previous[i];
    }
    mask
}

#[cfg(test)]
#[path = "differ_tests.rs"]
mod tests;
