//! Core layout value types handed to renderers.

use crate::model::{Alignment, ItemKind, Size, SizeMode};
use serde::Serialize;
use std::ops::Range;

/// Resolved position and size of an item along the scroll axis.
///
/// `x` is always 0: horizontal placement is resolved by the renderer from
/// the item's [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Frame {
    /// Horizontal origin (always 0).
    pub x: f64,
    /// Vertical origin in content coordinates.
    pub y: f64,
    /// Width of the item.
    pub width: f64,
    /// Height of the item.
    pub height: f64,
}

impl Frame {
    /// Frame at `(0, y)` with `size`.
    pub fn new(y: f64, size: Size) -> Self {
        Self {
            x: 0.0,
            y,
            width: size.width,
            height: size.height,
        }
    }

    /// Y coordinate just past the bottom edge.
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Same frame moved down by `dy`.
    pub fn offset_by(&self, dy: f64) -> Self {
        Self {
            y: self.y + dy,
            ..*self
        }
    }

    /// True if the frame overlaps the half-open range `[start, end)`.
    ///
    /// Zero-height frames count as overlapping when their origin lies inside
    /// the range.
    pub fn intersects(&self, range: &Range<f64>) -> bool {
        if self.height == 0.0 {
            range.contains(&self.y)
        } else {
            self.y < range.end && self.max_y() > range.start
        }
    }
}

/// Everything a renderer needs to place one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemAttributes {
    /// Absolute frame.
    pub frame: Frame,
    /// Horizontal justification.
    pub alignment: Alignment,
    /// Cell, header or footer.
    pub kind: ItemKind,
    /// Whether the size is measured, estimated, or unknown.
    pub size_mode: SizeMode,
}

/// Visible window of the scroll view in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Content offset of the top edge.
    pub offset_y: f64,
    /// Visible height.
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport.
    pub fn new(offset_y: f64, height: f64) -> Self {
        Self { offset_y, height }
    }

    /// Visible range `[offset_y, offset_y + height)`.
    pub fn range(&self) -> Range<f64> {
        self.offset_y..self.offset_y + self.height
    }

    /// Same viewport shifted by `dy`.
    pub fn offset_by(&self, dy: f64) -> Self {
        Self {
            offset_y: self.offset_y + dy,
            height: self.height,
        }
    }

    /// Visible range grown by `overscan` on both ends.
    pub fn overscanned(&self, overscan: f64) -> Range<f64> {
        (self.offset_y - overscan)..(self.offset_y + self.height + overscan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_origin_x_is_zero() {
        let frame = Frame::new(12.0, Size::new(200.0, 30.0));
        assert_eq!(frame.x, 0.0);
        assert_eq!(frame.y, 12.0);
        assert_eq!(frame.max_y(), 42.0);
    }

    #[test]
    fn intersects_uses_half_open_range() {
        let frame = Frame::new(10.0, Size::new(1.0, 10.0)); // [10, 20)
        assert!(frame.intersects(&(0.0..11.0)));
        assert!(frame.intersects(&(19.0..30.0)));
        assert!(!frame.intersects(&(20.0..30.0)));
        assert!(!frame.intersects(&(0.0..10.0)));
    }

    #[test]
    fn zero_height_frame_intersects_when_origin_inside() {
        let frame = Frame::new(10.0, Size::new(1.0, 0.0));
        assert!(frame.intersects(&(5.0..15.0)));
        assert!(!frame.intersects(&(10.5..15.0)));
    }

    #[test]
    fn viewport_overscan_extends_both_ends() {
        let viewport = Viewport::new(100.0, 50.0);
        assert_eq!(viewport.range(), 100.0..150.0);
        assert_eq!(viewport.overscanned(10.0), 90.0..160.0);
        assert_eq!(viewport.offset_by(-20.0).offset_y, 80.0);
    }
}
