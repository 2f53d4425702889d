//! Geometry primitives and the per-item sizing state machine.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Width and height in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent (the scroll axis).
    pub height: f64,
}

impl Size {
    /// Zero-area size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both components are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// Bit patterns used for hashing; `-0.0` folds onto `0.0`.
    fn key(&self) -> (u64, u64) {
        (normalized_bits(self.width), normalized_bits(self.height))
    }
}

fn normalized_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Padding around the whole layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeInsets {
    /// Space before the first section.
    #[serde(default)]
    pub top: f64,
    /// Leading padding, applied by the renderer.
    #[serde(default)]
    pub left: f64,
    /// Space after the last section.
    #[serde(default)]
    pub bottom: f64,
    /// Trailing padding, applied by the renderer.
    #[serde(default)]
    pub right: f64,
}

impl EdgeInsets {
    /// No padding.
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    /// Create insets from all four edges.
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

/// Horizontal justification of a bubble within the available width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Incoming messages.
    #[default]
    Leading,
    /// Date headers, system notices.
    Center,
    /// Outgoing messages.
    Trailing,
    /// Spans the full container width.
    FullWidth,
}

/// Tag of an [`ItemSize`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMode {
    /// Nothing known yet.
    Auto,
    /// Placeholder guess.
    Estimated,
    /// Measured.
    Exact,
}

/// Sizing state of an item.
///
/// Lifecycle: `Auto` → `Estimated` → `Exact`. Measuring always lands in
/// `Exact`; [`ItemSize::reset`] demotes `Exact` to `Estimated` with the same
/// value. There is no path back to `Auto`.
///
/// # Equality
/// Equal when the tags match and, for `Estimated`/`Exact`, width and height
/// are bitwise equal (`-0.0 == 0.0`). `Auto` equals only `Auto`. `Hash` is
/// consistent with this, so sizes can key caches even though `f64` is not
/// `Eq`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "size", rename_all = "snake_case")]
pub enum ItemSize {
    /// No size known; the engine must request a measurement.
    #[default]
    Auto,
    /// Placeholder used until a measurement arrives.
    Estimated(Size),
    /// Authoritative measured size.
    Exact(Size),
}

impl ItemSize {
    /// Tag of this size.
    pub fn mode(&self) -> SizeMode {
        match self {
            ItemSize::Auto => SizeMode::Auto,
            ItemSize::Estimated(_) => SizeMode::Estimated,
            ItemSize::Exact(_) => SizeMode::Exact,
        }
    }

    /// Payload, if the variant carries one.
    pub fn concrete(&self) -> Option<Size> {
        match self {
            ItemSize::Auto => None,
            ItemSize::Estimated(size) | ItemSize::Exact(size) => Some(*size),
        }
    }

    /// True for `Exact`.
    pub fn is_exact(&self) -> bool {
        matches!(self, ItemSize::Exact(_))
    }

    /// Transition to `Exact(size)` from any state.
    pub fn with_measured(self, size: Size) -> Self {
        ItemSize::Exact(size)
    }

    /// Demote `Exact` to `Estimated`, keeping the value. Other states are
    /// returned unchanged.
    pub fn reset(self) -> Self {
        match self {
            ItemSize::Exact(size) => ItemSize::Estimated(size),
            other => other,
        }
    }
}

impl PartialEq for ItemSize {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemSize::Auto, ItemSize::Auto) => true,
            (ItemSize::Estimated(a), ItemSize::Estimated(b)) => a.key() == b.key(),
            (ItemSize::Exact(a), ItemSize::Exact(b)) => a.key() == b.key(),
            _ => false,
        }
    }
}

impl Eq for ItemSize {}

impl Hash for ItemSize {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode().hash(state);
        if let Some(size) = self.concrete() {
            size.key().hash(state);
        }
    }
}
