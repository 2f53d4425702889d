//! Invalidation reasons and the update record returned by every mutation.

use super::settings::LayoutSettings;
use crate::model::ItemId;

/// Why cached geometry must be recomputed.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidationReason {
    /// The scroll view's width changed; every measurement is stale.
    ContainerWidthChanged(f64),
    /// Dynamic type or display scale changed; every measurement is stale.
    ContentScaleChanged,
    /// Spacing, insets or the estimated size changed. Measurements survive.
    SettingsChanged(LayoutSettings),
}

/// Which operation produced a [`LayoutUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateCause {
    /// A changeset was applied.
    Changeset,
    /// A measurement was reported.
    Measurement,
    /// Caches were invalidated.
    Invalidation,
}

/// What changed, so the renderer can refresh only affected frames.
///
/// # Scroll compensation
/// `scroll_adjustment` is how far the anchor item moved in content
/// coordinates. Adding it to the renderer's content offset keeps the visible
/// content where it was. The engine has already shifted its own stored
/// viewport by the same amount.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutUpdate {
    /// Operation that produced this update.
    pub cause: UpdateCause,
    /// Content offset correction for the renderer.
    pub scroll_adjustment: f64,
    /// Item the adjustment was computed from, if any.
    pub anchor: Option<ItemId>,
    /// Content height after the mutation.
    pub content_height: f64,
    /// Change in content height.
    pub content_height_delta: f64,
    /// Sections (new indices) whose internal offsets were recomputed.
    pub dirty_sections: Vec<usize>,
    /// First section whose start offset may have moved; every later section
    /// moved by the same amount.
    pub shifted_from_section: Option<usize>,
}

impl LayoutUpdate {
    /// Update that changed nothing.
    pub fn unchanged(cause: UpdateCause, content_height: f64) -> Self {
        Self {
            cause,
            scroll_adjustment: 0.0,
            anchor: None,
            content_height,
            content_height_delta: 0.0,
            dirty_sections: Vec::new(),
            shifted_from_section: None,
        }
    }

    /// True if no frame moved and no scroll correction is needed.
    pub fn is_noop(&self) -> bool {
        self.scroll_adjustment == 0.0
            && self.content_height_delta == 0.0
            && self.dirty_sections.is_empty()
            && self.shifted_from_section.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_update_is_noop() {
        let update = LayoutUpdate::unchanged(UpdateCause::Measurement, 120.0);
        assert!(update.is_noop());
        assert_eq!(update.content_height, 120.0);
    }

    #[test]
    fn scroll_adjustment_alone_is_not_noop() {
        let update = LayoutUpdate {
            scroll_adjustment: 12.0,
            ..LayoutUpdate::unchanged(UpdateCause::Changeset, 0.0)
        };
        assert!(!update.is_noop());
    }
}
