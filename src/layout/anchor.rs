//! Scroll anchoring
//!
//! Before every mutation the engine records which item the user is looking
//! at; afterwards it reports how far that item moved so the renderer can
//! shift its content offset by the same amount and nothing on screen jumps.

use super::types::Viewport;
use crate::model::ItemId;
use serde::{Deserialize, Serialize};

/// Tolerance when deciding whether a viewport sits at the bottom edge.
pub const BOTTOM_EPSILON: f64 = 0.5;

/// How the engine keeps the visible content stable across mutations.
///
/// # Variants
/// - `TopmostVisible`: the topmost visible cell keeps its on-screen position.
/// - `StickToBottom`: a viewport scrolled to the very bottom stays pinned to
///   the bottom as content grows; otherwise behaves like `TopmostVisible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Keep the topmost visible cell in place.
    #[default]
    TopmostVisible,
    /// Follow the bottom edge while the viewport is there.
    StickToBottom,
}

/// Item tracked across one mutation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScrollAnchor {
    /// Tracked identity; may be a neighbour of the item that was visible.
    pub id: ItemId,
    /// Absolute y before the mutation.
    pub y: f64,
}

/// State captured before a mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct AnchorCapture {
    pub anchor: Option<ScrollAnchor>,
    /// Viewport was at the bottom edge under `StickToBottom`.
    pub pinned_to_bottom: bool,
}

/// True if the bottom of `viewport` reaches the end of the content.
pub(crate) fn is_at_bottom(viewport: &Viewport, content_height: f64) -> bool {
    viewport.offset_y + viewport.height >= content_height - BOTTOM_EPSILON
}

/// Offset that shows the last `viewport.height` points of the content.
pub(crate) fn bottom_offset(viewport: &Viewport, content_height: f64) -> f64 {
    (content_height - viewport.height).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_topmost_visible() {
        assert_eq!(AnchorPolicy::default(), AnchorPolicy::TopmostVisible);
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            anchor: AnchorPolicy,
        }
        let parsed: Wrapper = toml::from_str("anchor = \"stick_to_bottom\"").expect("valid toml");
        assert_eq!(parsed.anchor, AnchorPolicy::StickToBottom);
    }

    #[test]
    fn bottom_detection_tolerates_rounding() {
        let viewport = Viewport::new(100.0, 200.0);
        assert!(is_at_bottom(&viewport, 300.0));
        assert!(is_at_bottom(&viewport, 300.4));
        assert!(!is_at_bottom(&viewport, 301.0));
    }

    #[test]
    fn bottom_offset_clamps_short_content() {
        let viewport = Viewport::new(0.0, 200.0);
        assert_eq!(bottom_offset(&viewport, 150.0), 0.0);
        assert_eq!(bottom_offset(&viewport, 450.0), 250.0);
    }
}
