//! Structural addressing of items within a sectioned layout.

use serde::Serialize;
use std::fmt;

/// Structural address of a cell: `(section, item)`.
///
/// Ordered lexicographically by section then item, which matches the
/// top-to-bottom visual order of the layout. This ordering is what the
/// engine relies on for binary-search lookups and anchor fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct ItemPath {
    /// Index of the section.
    pub section: usize,
    /// Index of the item within its section.
    pub item: usize,
}

impl ItemPath {
    /// Create a new path.
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for ItemPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self { section, item }
    }
}

/// Platform index paths are signed; negative components are malformed.
impl TryFrom<(i64, i64)> for ItemPath {
    type Error = MalformedPath;

    fn try_from((section, item): (i64, i64)) -> Result<Self, Self::Error> {
        match (usize::try_from(section), usize::try_from(item)) {
            (Ok(s), Ok(i)) => Ok(Self::new(s, i)),
            _ => Err(MalformedPath { section, item }),
        }
    }
}

impl From<ItemPath> for (i64, i64) {
    fn from(path: ItemPath) -> Self {
        (path.section as i64, path.item as i64)
    }
}

/// A platform index path that cannot address an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed item path ({section}, {item}): indices must be non-negative")]
pub struct MalformedPath {
    /// Raw section component.
    pub section: i64,
    /// Raw item component.
    pub item: i64,
}

/// Role of an item within its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Ordinary content item (message bubble, image, ...).
    Cell,
    /// Supplementary item laid out before the first cell.
    Header,
    /// Supplementary item laid out after the last cell.
    Footer,
}

impl ItemKind {
    /// Headers and footers are supplementary.
    pub fn is_supplementary(&self) -> bool {
        !matches!(self, ItemKind::Cell)
    }
}

/// Address of a header or footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SupplementaryPath {
    /// Index of the owning section.
    pub section: usize,
    /// `Header` or `Footer`.
    pub kind: SupplementaryKind,
}

impl SupplementaryPath {
    /// Header of `section`.
    pub const fn header(section: usize) -> Self {
        Self {
            section,
            kind: SupplementaryKind::Header,
        }
    }

    /// Footer of `section`.
    pub const fn footer(section: usize) -> Self {
        Self {
            section,
            kind: SupplementaryKind::Footer,
        }
    }
}

/// Kind of supplementary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplementaryKind {
    /// Section header.
    Header,
    /// Section footer.
    Footer,
}

impl From<SupplementaryKind> for ItemKind {
    fn from(kind: SupplementaryKind) -> Self {
        match kind {
            SupplementaryKind::Header => ItemKind::Header,
            SupplementaryKind::Footer => ItemKind::Footer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_section_major() {
        let a = ItemPath::new(0, 9);
        let b = ItemPath::new(1, 0);
        let c = ItemPath::new(1, 1);
        assert!(a < b);
        assert!(b < c);

        let mut paths = vec![c, a, b];
        paths.sort();
        assert_eq!(paths, vec![a, b, c]);
    }

    #[test]
    fn converts_from_platform_indices() {
        let path = ItemPath::try_from((2i64, 5i64)).expect("non-negative path");
        assert_eq!(path, ItemPath::new(2, 5));
        assert_eq!(<(i64, i64)>::from(path), (2, 5));
    }

    #[test]
    fn negative_platform_indices_are_malformed() {
        let err = ItemPath::try_from((0i64, -1i64)).unwrap_err();
        assert_eq!(err, MalformedPath { section: 0, item: -1 });
        assert!(ItemPath::try_from((-3i64, 0i64)).is_err());
    }

    #[test]
    fn usable_as_hash_key() {
        let mut set = std::collections::HashSet::new();
        set.insert(ItemPath::new(1, 2));
        assert!(set.contains(&ItemPath::from((1, 2))));
    }

    #[test]
    fn display_shows_both_components() {
        assert_eq!(ItemPath::new(3, 7).to_string(), "[3, 7]");
    }

    #[test]
    fn only_cells_are_not_supplementary() {
        assert!(!ItemKind::Cell.is_supplementary());
        assert!(ItemKind::Header.is_supplementary());
        assert!(ItemKind::from(SupplementaryKind::Footer).is_supplementary());
    }
}
