//! Full sectioned snapshots supplied by a data source.

use crate::model::{Alignment, ItemId, ItemKind, ItemPath, ItemSize, SectionId, SupplementaryKind};

use super::changeset::ItemSeed;

/// One item as the data source sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot<C> {
    /// Stable identity.
    pub id: ItemId,
    /// Renderable content; compared for in-place updates.
    pub content: C,
    /// Initial sizing hint (`Auto` if unknown).
    pub size_hint: ItemSize,
    /// Horizontal justification.
    pub alignment: Alignment,
}

impl<C> ItemSnapshot<C> {
    /// Item with an `Auto` hint and leading alignment.
    pub fn new(id: ItemId, content: C) -> Self {
        Self {
            id,
            content,
            size_hint: ItemSize::Auto,
            alignment: Alignment::Leading,
        }
    }

    /// Set the sizing hint.
    pub fn with_size_hint(mut self, hint: ItemSize) -> Self {
        self.size_hint = hint;
        self
    }

    /// Set the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Layout-relevant part of the item, used to create its model.
    pub(crate) fn seed(&self, kind: ItemKind) -> ItemSeed {
        ItemSeed {
            id: self.id.clone(),
            kind,
            size_hint: self.size_hint,
            alignment: self.alignment,
        }
    }
}

impl<C: PartialEq> ItemSnapshot<C> {
    /// Deep equality of everything a renderer draws.
    pub fn is_content_equal(&self, other: &Self) -> bool {
        self.content == other.content && self.alignment == other.alignment
    }
}

/// An ordered group of items with optional header and footer.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSnapshot<C> {
    /// Stable identity.
    pub id: SectionId,
    /// Optional supplementary header.
    pub header: Option<ItemSnapshot<C>>,
    /// Ordered cells.
    pub items: Vec<ItemSnapshot<C>>,
    /// Optional supplementary footer.
    pub footer: Option<ItemSnapshot<C>>,
}

impl<C> SectionSnapshot<C> {
    /// Section without header or footer.
    pub fn new(id: SectionId, items: Vec<ItemSnapshot<C>>) -> Self {
        Self {
            id,
            header: None,
            items,
            footer: None,
        }
    }

    /// Attach a header.
    pub fn with_header(mut self, header: ItemSnapshot<C>) -> Self {
        self.header = Some(header);
        self
    }

    /// Attach a footer.
    pub fn with_footer(mut self, footer: ItemSnapshot<C>) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Cheap structural identifier: two sections with equal identifiers are
    /// "the same section", whatever their content.
    pub fn difference_identifier(&self) -> &SectionId {
        &self.id
    }

    /// Header or footer.
    pub fn supplementary(&self, kind: SupplementaryKind) -> Option<&ItemSnapshot<C>> {
        match kind {
            SupplementaryKind::Header => self.header.as_ref(),
            SupplementaryKind::Footer => self.footer.as_ref(),
        }
    }
}

impl<C: PartialEq> SectionSnapshot<C> {
    /// Deep equality: same identity, same item identities in the same order,
    /// same content everywhere.
    pub fn is_content_equal(&self, other: &Self) -> bool {
        fn same_supplementary<C: PartialEq>(
            a: &Option<ItemSnapshot<C>>,
            b: &Option<ItemSnapshot<C>>,
        ) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.id == b.id && a.is_content_equal(b),
                _ => false,
            }
        }

        self.id == other.id
            && self.items.len() == other.items.len()
            && same_supplementary(&self.header, &other.header)
            && same_supplementary(&self.footer, &other.footer)
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| a.id == b.id && a.is_content_equal(b))
    }
}

/// Ordered sections making up a whole conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<C> {
    /// Sections top to bottom.
    pub sections: Vec<SectionSnapshot<C>>,
}

impl<C> Default for Snapshot<C> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
        }
    }
}

impl<C> Snapshot<C> {
    /// Snapshot from sections.
    pub fn new(sections: Vec<SectionSnapshot<C>>) -> Self {
        Self { sections }
    }

    /// Cell at `path`.
    pub fn item(&self, path: ItemPath) -> Option<&ItemSnapshot<C>> {
        self.sections.get(path.section)?.items.get(path.item)
    }

    /// Total number of cells.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, content: &str) -> ItemSnapshot<String> {
        ItemSnapshot::new(ItemId::new(id).expect("valid id"), content.to_string())
    }

    fn section(id: &str, items: Vec<ItemSnapshot<String>>) -> SectionSnapshot<String> {
        SectionSnapshot::new(SectionId::new(id).expect("valid id"), items)
    }

    #[test]
    fn difference_identifier_ignores_content() {
        let a = section("day-1", vec![item("m1", "hello")]);
        let b = section("day-1", vec![item("m1", "edited")]);
        assert_eq!(a.difference_identifier(), b.difference_identifier());
        assert!(!a.is_content_equal(&b));
    }

    #[test]
    fn content_equality_is_order_sensitive() {
        let a = section("day-1", vec![item("m1", "a"), item("m2", "b")]);
        let b = section("day-1", vec![item("m2", "b"), item("m1", "a")]);
        assert!(!a.is_content_equal(&b));
        assert!(a.is_content_equal(&a.clone()));
    }

    #[test]
    fn content_equality_covers_headers() {
        let a = section("day-1", vec![]).with_header(item("h", "Monday"));
        let b = section("day-1", vec![]).with_header(item("h", "Tuesday"));
        let c = section("day-1", vec![]);
        assert!(!a.is_content_equal(&b));
        assert!(!a.is_content_equal(&c));
    }

    #[test]
    fn size_hint_does_not_affect_content_equality() {
        let a = item("m1", "x");
        let b = item("m1", "x").with_size_hint(ItemSize::Estimated(crate::model::Size::new(1.0, 1.0)));
        assert!(a.is_content_equal(&b));
    }

    #[test]
    fn item_lookup_by_path() {
        let snapshot = Snapshot::new(vec![
            section("a", vec![item("m1", "x")]),
            section("b", vec![item("m2", "y"), item("m3", "z")]),
        ]);
        assert_eq!(snapshot.item(ItemPath::new(1, 1)).map(|i| i.id.as_str()), Some("m3"));
        assert!(snapshot.item(ItemPath::new(2, 0)).is_none());
        assert_eq!(snapshot.item_count(), 3);
    }
}
