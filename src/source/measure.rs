//! Measurement collaborators.
//!
//! The engine never measures content itself; a [`Measurer`] turns content
//! plus the available width into an exact size that is reported back.

use crate::model::{ChatContent, EdgeInsets, MessageBody, Size};
use unicode_width::UnicodeWidthStr;

/// Computes the rendered size of content.
pub trait Measurer<C> {
    /// Size of `content` when laid out within `max_width`.
    fn measure(&self, content: &C, max_width: f64) -> Size;
}

/// Returns the same size for everything. Test double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMeasurer {
    /// Size returned for every item.
    pub size: Size,
}

impl FixedMeasurer {
    /// Measurer returning `size`.
    pub fn new(size: Size) -> Self {
        Self { size }
    }
}

impl<C> Measurer<C> for FixedMeasurer {
    fn measure(&self, _content: &C, _max_width: f64) -> Size {
        self.size
    }
}

/// Estimates text size on a fixed character grid.
///
/// Display width comes from `unicode-width`, so wide CJK glyphs and emoji
/// take two columns. Text wraps greedily at word boundaries; words longer
/// than a line are hard-broken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Width of one column in points.
    pub column_width: f64,
    /// Height of one line in points.
    pub line_height: f64,
    /// Padding inside a bubble.
    pub bubble_padding: EdgeInsets,
    /// Largest share of the container a bubble may take.
    pub max_bubble_fraction: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            column_width: 8.0,
            line_height: 20.0,
            bubble_padding: EdgeInsets::new(8.0, 12.0, 8.0, 12.0),
            max_bubble_fraction: 0.75,
        }
    }
}

impl MonospaceMeasurer {
    /// Size of `text` inside a bubble no wider than `max_width`.
    pub fn measure_text(&self, text: &str, max_width: f64) -> Size {
        let padding = self.bubble_padding;
        let horizontal = padding.left + padding.right;
        let available = (max_width * self.max_bubble_fraction - horizontal).max(self.column_width);
        let columns = (available / self.column_width).floor().max(1.0) as usize;

        let (lines, widest) = wrap(text, columns);
        Size::new(
            widest as f64 * self.column_width + horizontal,
            lines as f64 * self.line_height + padding.top + padding.bottom,
        )
    }

    fn measure_image(&self, width: f64, height: f64, max_width: f64) -> Size {
        let limit = max_width * self.max_bubble_fraction;
        if width <= limit || width <= 0.0 {
            Size::new(width, height)
        } else {
            let scale = limit / width;
            Size::new(limit, height * scale)
        }
    }
}

impl Measurer<ChatContent> for MonospaceMeasurer {
    fn measure(&self, content: &ChatContent, max_width: f64) -> Size {
        match content {
            ChatContent::Message { body, .. } => match body {
                MessageBody::Text { text } => self.measure_text(text, max_width),
                MessageBody::Image { width, height } => {
                    self.measure_image(*width, *height, max_width)
                }
            },
            ChatContent::DayHeader(day) => {
                let label = day.format("%A, %B %-d, %Y").to_string();
                self.measure_text(&label, max_width)
            }
        }
    }
}

impl Measurer<String> for MonospaceMeasurer {
    fn measure(&self, content: &String, max_width: f64) -> Size {
        self.measure_text(content, max_width)
    }
}

/// Greedy word wrap. Returns (line count, widest line in columns).
fn wrap(text: &str, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    let mut lines = 0;
    let mut widest = 0;

    for paragraph in text.split('\n') {
        let mut current = 0;
        let mut paragraph_lines = 1;

        for word in paragraph.split_whitespace() {
            let width = UnicodeWidthStr::width(word);
            let needed = if current == 0 { width } else { current + 1 + width };

            if needed <= columns {
                current = needed;
            } else if width <= columns {
                widest = widest.max(current);
                paragraph_lines += 1;
                current = width;
            } else {
                if current > 0 {
                    widest = widest.max(current);
                    paragraph_lines += 1;
                }
                paragraph_lines += (width - 1) / columns;
                widest = columns;
                current = match width % columns {
                    0 => columns,
                    rest => rest,
                };
            }
        }

        widest = widest.max(current);
        lines += paragraph_lines;
    }

    (lines, widest)
}
