//! Test doubles shared by unit tests.

use crate::diff::{ItemSnapshot, SectionSnapshot};
use crate::layout::LayoutUpdate;
use crate::model::{ItemId, ItemSize, SectionId, Size};
use crate::session::LayoutObserver;
use std::cell::RefCell;
use std::rc::Rc;

/// Observer that keeps every update it receives.
///
/// The session owns the boxed observer, so the log is shared through an
/// `Rc` handle returned by [`RecordingObserver::new`].
pub struct RecordingObserver {
    updates: Rc<RefCell<Vec<LayoutUpdate>>>,
}

impl RecordingObserver {
    /// Observer plus a handle to its log.
    pub fn new() -> (Self, Rc<RefCell<Vec<LayoutUpdate>>>) {
        let updates = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                updates: Rc::clone(&updates),
            },
            updates,
        )
    }
}

impl LayoutObserver for RecordingObserver {
    fn layout_changed(&mut self, update: &LayoutUpdate) {
        self.updates.borrow_mut().push(update.clone());
    }
}

/// Cell with an estimated height and its id as content.
pub fn estimated(id: &str, height: f64) -> ItemSnapshot<String> {
    ItemSnapshot::new(ItemId::new(id).expect("valid id"), id.to_string())
        .with_size_hint(ItemSize::Estimated(Size::new(100.0, height)))
}

/// Section of `items` with no header or footer.
pub fn section(id: &str, items: Vec<ItemSnapshot<String>>) -> SectionSnapshot<String> {
    SectionSnapshot::new(SectionId::new(id).expect("valid id"), items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::UpdateCause;

    #[test]
    fn recording_observer_shares_its_log() {
        let (mut observer, updates) = RecordingObserver::new();
        observer.layout_changed(&LayoutUpdate::unchanged(UpdateCause::Measurement, 10.0));
        assert_eq!(updates.borrow().len(), 1);
        assert_eq!(updates.borrow()[0].content_height, 10.0);
    }

    #[test]
    fn builders_produce_estimated_cells() {
        let section = section("s", vec![estimated("a", 40.0)]);
        assert_eq!(section.items[0].size_hint, ItemSize::Estimated(Size::new(100.0, 40.0)));
    }
}
