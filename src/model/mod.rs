//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod item_path;
pub mod message;
pub mod size;

// Re-export for convenience
pub use error::LayoutError;
pub use identifiers::{InvalidItemId, InvalidSectionId, ItemId, SectionId};
pub use item_path::{ItemKind, ItemPath, MalformedPath, SupplementaryKind, SupplementaryPath};
pub use message::{ChatContent, ChatMessage, MessageBody, Sender};
pub use size::{Alignment, EdgeInsets, ItemSize, Size, SizeMode};
