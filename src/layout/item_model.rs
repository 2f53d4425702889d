//! Geometric state of a single item

use super::types::Frame;
use crate::model::{Alignment, ItemId, ItemKind, ItemSize, Size};

/// Layout metadata for a single item.
///
/// Owned exclusively by the engine; renderers only ever see copies of the
/// derived [`Frame`].
///
/// # Invariants
/// - `offset_y` is relative to the start of the owning section and equals the
///   sum of `height + inter_item_spacing` of every preceding element of the
///   section (maintained by `SectionModel`).
/// - `calculated_once` is true iff `calculated_size` was `Some` when
///   [`ItemModel::reset_size`] last ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemModel {
    id: ItemId,
    kind: ItemKind,
    /// Input hint from the data source, or the last measured value after a
    /// reset.
    preferred_size: ItemSize,
    /// Measured override.
    calculated_size: Option<Size>,
    calculated_once: bool,
    offset_y: f64,
    alignment: Alignment,
    /// Gap reserved between this item and the next element of the section.
    inter_item_spacing: f64,
}

impl ItemModel {
    /// Create a model from a data source hint.
    ///
    /// An `Exact` hint is taken as an already-known measurement.
    pub(crate) fn new(
        id: ItemId,
        kind: ItemKind,
        hint: ItemSize,
        alignment: Alignment,
        inter_item_spacing: f64,
    ) -> Self {
        let (preferred_size, calculated_size) = match hint {
            ItemSize::Exact(size) => (ItemSize::Estimated(size), Some(size)),
            other => (other, None),
        };
        Self {
            id,
            kind,
            preferred_size,
            calculated_size,
            calculated_once: false,
            offset_y: 0.0,
            alignment,
            inter_item_spacing,
        }
    }

    /// Identity.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Cell, header or footer.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Input hint.
    pub fn preferred_size(&self) -> ItemSize {
        self.preferred_size
    }

    /// Measured size, if any.
    pub fn calculated_size(&self) -> Option<Size> {
        self.calculated_size
    }

    /// Whether a measurement existed at the last reset.
    pub fn calculated_once(&self) -> bool {
        self.calculated_once
    }

    /// Offset within the section.
    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    /// Horizontal justification.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Gap before the next element.
    pub fn inter_item_spacing(&self) -> f64 {
        self.inter_item_spacing
    }

    /// Current sizing state: `Exact` once measured, otherwise the hint.
    pub fn sizing(&self) -> ItemSize {
        match self.calculated_size {
            Some(size) => ItemSize::Exact(size),
            None => self.preferred_size,
        }
    }

    /// Effective size. `Auto` items take `placeholder`.
    pub fn size(&self, placeholder: Size) -> Size {
        self.calculated_size
            .or_else(|| self.preferred_size.concrete())
            .unwrap_or(placeholder)
    }

    /// Section-relative frame at `(0, offset_y)`.
    pub fn frame(&self, placeholder: Size) -> Frame {
        Frame::new(self.offset_y, self.size(placeholder))
    }

    /// Offset of the next element in the section.
    pub(crate) fn next_offset(&self, placeholder: Size) -> f64 {
        self.offset_y + self.size(placeholder).height + self.inter_item_spacing
    }

    pub(crate) fn set_offset_y(&mut self, offset_y: f64) {
        self.offset_y = offset_y;
    }

    pub(crate) fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub(crate) fn set_inter_item_spacing(&mut self, spacing: f64) {
        self.inter_item_spacing = spacing;
    }

    /// Record a measurement. Returns the previous effective size.
    pub(crate) fn set_measured(&mut self, size: Size, placeholder: Size) -> Size {
        let previous = self.size(placeholder);
        self.calculated_size = self.sizing().with_measured(size).concrete();
        previous
    }

    /// Forget the measurement but keep it as the new estimate.
    ///
    /// Used on container width or content scale changes, and when an item's
    /// content changes: the frame keeps its size until a new measurement
    /// arrives, so nothing jumps in between.
    pub(crate) fn reset_size(&mut self) {
        let current = self.sizing();
        self.calculated_once = current.is_exact();
        self.preferred_size = current.reset();
        self.calculated_size = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SizeMode;

    fn model(hint: ItemSize) -> ItemModel {
        ItemModel::new(
            ItemId::new("m1").expect("valid id"),
            ItemKind::Cell,
            hint,
            Alignment::Leading,
            8.0,
        )
    }

    const PLACEHOLDER: Size = Size::new(320.0, 44.0);

    #[test]
    fn auto_item_uses_placeholder() {
        let item = model(ItemSize::Auto);
        assert_eq!(item.size(PLACEHOLDER), PLACEHOLDER);
        assert_eq!(item.sizing(), ItemSize::Auto);
    }

    #[test]
    fn estimated_item_uses_hint() {
        let item = model(ItemSize::Estimated(Size::new(100.0, 20.0)));
        assert_eq!(item.size(PLACEHOLDER), Size::new(100.0, 20.0));
        assert_eq!(item.sizing().mode(), SizeMode::Estimated);
    }

    #[test]
    fn exact_hint_counts_as_measured() {
        let item = model(ItemSize::Exact(Size::new(100.0, 40.0)));
        assert_eq!(item.calculated_size(), Some(Size::new(100.0, 40.0)));
        assert!(item.sizing().is_exact());
    }

    #[test]
    fn measurement_overrides_hint() {
        let mut item = model(ItemSize::Estimated(Size::new(100.0, 20.0)));
        let previous = item.set_measured(Size::new(100.0, 30.0), PLACEHOLDER);

        assert_eq!(previous, Size::new(100.0, 20.0));
        assert_eq!(item.size(PLACEHOLDER), Size::new(100.0, 30.0));
        assert_eq!(item.sizing(), ItemSize::Exact(Size::new(100.0, 30.0)));
    }

    #[test]
    fn reset_keeps_measured_value_as_estimate() {
        let mut item = model(ItemSize::Auto);
        item.set_measured(Size::new(250.0, 61.0), PLACEHOLDER);
        item.reset_size();

        assert_eq!(item.calculated_size(), None);
        assert!(item.calculated_once());
        assert_eq!(item.preferred_size(), ItemSize::Estimated(Size::new(250.0, 61.0)));
        assert_eq!(item.size(PLACEHOLDER), Size::new(250.0, 61.0));
    }

    #[test]
    fn reset_without_measurement_clears_calculated_once() {
        let mut item = model(ItemSize::Auto);
        item.set_measured(Size::new(1.0, 1.0), PLACEHOLDER);
        item.reset_size();
        assert!(item.calculated_once());

        item.reset_size();
        assert!(!item.calculated_once(), "no measurement existed at the second reset");
        assert_eq!(item.sizing(), ItemSize::Estimated(Size::new(1.0, 1.0)));
    }

    #[test]
    fn frame_is_section_relative() {
        let mut item = model(ItemSize::Estimated(Size::new(100.0, 20.0)));
        item.set_offset_y(48.0);
        let frame = item.frame(PLACEHOLDER);
        assert_eq!(frame.x, 0.0);
        assert_eq!(frame.y, 48.0);
        assert_eq!(frame.height, 20.0);
        assert_eq!(item.next_offset(PLACEHOLDER), 76.0);
    }
}
