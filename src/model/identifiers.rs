//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a chat item (message bubble, date header, footer).
///
/// Identity survives moves between sections: two snapshots containing the
/// same `ItemId` refer to the same item, wherever it is placed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Smart constructor: validates non-empty item ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidItemId> {
        let raw = raw.into();
        if raw.is_empty() {
            Err(InvalidItemId::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ItemId {
    type Error = InvalidItemId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Stable identity of a section (typically one conversation day).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionId(String);

impl SectionId {
    /// Smart constructor: validates non-empty section ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSectionId> {
        let raw = raw.into();
        if raw.is_empty() {
            Err(InvalidSectionId::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SectionId {
    type Error = InvalidSectionId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<SectionId> for String {
    fn from(id: SectionId) -> Self {
        id.0
    }
}

// ===== Error Types =====

/// Rejected [`ItemId`] input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidItemId {
    /// The identifier was the empty string.
    #[error("Item ID cannot be empty")]
    Empty,
}

/// Rejected [`SectionId`] input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSectionId {
    /// The identifier was the empty string.
    #[error("Section ID cannot be empty")]
    Empty,
}

// ===== Tests =====
