//! Per-section arena of item models

use super::item_model::ItemModel;
use crate::model::{SectionId, Size, SupplementaryKind};

/// One section: optional header, ordered cells, optional footer.
///
/// The three parts form a single vertical *stream* (header, cells..., footer)
/// laid out by a running sum. Stream position `k` maps to the header when a
/// header exists and `k == 0`, to the footer at the end, and to cells in
/// between.
///
/// # Invariants
/// - `stream[0].offset_y == 0`
/// - `stream[k].offset_y == stream[k-1].offset_y + height(k-1) + spacing(k-1)`
/// - `height == last.offset_y + height(last)` (0 when empty)
#[derive(Debug, Clone)]
pub struct SectionModel {
    id: SectionId,
    header: Option<ItemModel>,
    items: Vec<ItemModel>,
    footer: Option<ItemModel>,
    height: f64,
}

impl SectionModel {
    /// Empty section.
    pub(crate) fn new(id: SectionId) -> Self {
        Self {
            id,
            header: None,
            items: Vec::new(),
            footer: None,
            height: 0.0,
        }
    }

    /// Section identity.
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    /// Content height of the section (without inter-section spacing).
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Cells in order.
    pub fn items(&self) -> &[ItemModel] {
        &self.items
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the section has no cells.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cell at `index`.
    pub fn item(&self, index: usize) -> Option<&ItemModel> {
        self.items.get(index)
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut ItemModel> {
        self.items.get_mut(index)
    }

    /// Header or footer.
    pub fn supplementary(&self, kind: SupplementaryKind) -> Option<&ItemModel> {
        match kind {
            SupplementaryKind::Header => self.header.as_ref(),
            SupplementaryKind::Footer => self.footer.as_ref(),
        }
    }

    pub(crate) fn supplementary_mut(&mut self, kind: SupplementaryKind) -> Option<&mut ItemModel> {
        match kind {
            SupplementaryKind::Header => self.header.as_mut(),
            SupplementaryKind::Footer => self.footer.as_mut(),
        }
    }

    pub(crate) fn set_supplementary(&mut self, kind: SupplementaryKind, model: Option<ItemModel>) {
        match kind {
            SupplementaryKind::Header => self.header = model,
            SupplementaryKind::Footer => self.footer = model,
        }
    }

    /// Install a new cell list.
    pub(crate) fn replace_items(&mut self, items: Vec<ItemModel>) {
        self.items = items;
    }

    pub(crate) fn take_items(&mut self) -> Vec<ItemModel> {
        std::mem::take(&mut self.items)
    }

    /// Mutable access to every model, supplementary included.
    pub(crate) fn models_mut(&mut self) -> impl Iterator<Item = &mut ItemModel> {
        self.header
            .iter_mut()
            .chain(self.items.iter_mut())
            .chain(self.footer.iter_mut())
    }

    /// Stream position of cell `index`.
    pub(crate) fn stream_position(&self, index: usize) -> usize {
        index + usize::from(self.header.is_some())
    }

    /// Stream position of the header or footer.
    pub(crate) fn supplementary_stream_position(&self, kind: SupplementaryKind) -> usize {
        match kind {
            SupplementaryKind::Header => 0,
            SupplementaryKind::Footer => self.stream_position(self.items.len()),
        }
    }

    fn stream_len(&self) -> usize {
        self.items.len() + usize::from(self.header.is_some()) + usize::from(self.footer.is_some())
    }

    fn stream_get(&self, position: usize) -> Option<&ItemModel> {
        let header = usize::from(self.header.is_some());
        if position < header {
            self.header.as_ref()
        } else if position - header < self.items.len() {
            self.items.get(position - header)
        } else if position - header == self.items.len() {
            self.footer.as_ref()
        } else {
            None
        }
    }

    /// Mutable access by stream position.
    pub(crate) fn stream_get_mut(&mut self, position: usize) -> Option<&mut ItemModel> {
        let header = usize::from(self.header.is_some());
        if position < header {
            self.header.as_mut()
        } else if position - header < self.items.len() {
            self.items.get_mut(position - header)
        } else if position - header == self.items.len() {
            self.footer.as_mut()
        } else {
            None
        }
    }

    /// Recompute offsets from stream position `from` onward.
    ///
    /// Elements before `from` are left untouched; their offsets seed the
    /// running sum. Returns the change in section height.
    pub(crate) fn relayout_from(&mut self, from: usize, placeholder: Size) -> f64 {
        let previous_height = self.height;
        let len = self.stream_len();

        let mut cursor = match from.checked_sub(1).and_then(|p| self.stream_get(p)) {
            Some(prev) => prev.next_offset(placeholder),
            None => 0.0,
        };

        for position in from.min(len)..len {
            if let Some(model) = self.stream_get_mut(position) {
                model.set_offset_y(cursor);
                cursor = model.next_offset(placeholder);
            }
        }

        self.height = match len.checked_sub(1).and_then(|p| self.stream_get(p)) {
            Some(last) => last.offset_y() + last.size(placeholder).height,
            None => 0.0,
        };

        self.height - previous_height
    }

    /// Full recompute.
    pub(crate) fn relayout(&mut self, placeholder: Size) -> f64 {
        self.relayout_from(0, placeholder)
    }

    /// Indices of cells whose section-relative frame intersects
    /// `[start, end)`.
    ///
    /// Binary search on the monotonic offsets, O(log n + k).
    pub(crate) fn cells_in(&self, start: f64, end: f64, placeholder: Size) -> std::ops::Range<usize> {
        let first = self.items.partition_point(|m| {
            let height = m.size(placeholder).height;
            m.offset_y() + height <= start && !(height == 0.0 && m.offset_y() == start)
        });
        let last = self.items.partition_point(|m| m.offset_y() < end);
        first..last.max(first)
    }
}
