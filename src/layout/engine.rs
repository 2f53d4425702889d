//! LayoutEngine - incremental vertical layout of sectioned chat items
//!
//! The engine owns every [`ItemModel`], grouped per section. Positions are
//! kept at two levels:
//!
//! - inside a section, each element's `offset_y` is a running sum maintained
//!   by [`SectionModel`]; a change at stream position `k` only touches
//!   positions `k..`;
//! - across sections, a [`SectionIndex`] (Fenwick tree) holds every section's
//!   extent, so later sections shift in O(log n) without being visited.
//!
//! Absolute y of an item = `insets.top + index.start_of(section) + offset_y`.
//!
//! # Consistency
//! Mutations (`apply`, `report_measured`, `invalidate`) take `&mut self` and
//! either complete or leave the engine untouched, so a reader never sees a
//! half-applied changeset.

use super::anchor::{self, AnchorCapture, AnchorPolicy, ScrollAnchor};
use super::invalidation::{InvalidationReason, LayoutUpdate, UpdateCause};
use super::item_model::ItemModel;
use super::section::SectionModel;
use super::section_index::SectionIndex;
use super::settings::{LayoutSettings, SettingsError};
use super::types::{Frame, ItemAttributes, Viewport};
use crate::diff::{Changeset, ItemSeed, SupplementaryEdit};
use crate::model::{
    ItemId, ItemPath, ItemSize, LayoutError, SectionId, Size, SupplementaryKind, SupplementaryPath,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;
use tracing::{debug, trace, warn};

/// Validated view of a changeset, computed before anything is mutated.
struct ApplyPlan<'c> {
    /// Old section index feeding each new section; `None` for new sections.
    sources: Vec<Option<usize>>,
    /// Layout descriptions of inserted cells, by identity.
    seeds: HashMap<&'c ItemId, &'c ItemSeed>,
    /// Identities leaving the layout (removed and not re-inserted).
    doomed: HashSet<&'c ItemId>,
}

/// Incremental layout engine for a sectioned, variable-height item list.
///
/// # Example
///
/// ```
/// use chatlayout::diff::{diff, ItemSnapshot, SectionSnapshot, Snapshot};
/// use chatlayout::layout::{LayoutEngine, LayoutSettings};
/// use chatlayout::model::{ItemId, ItemPath, ItemSize, SectionId, Size};
///
/// let item = |id: &str, h: f64| {
///     ItemSnapshot::new(ItemId::new(id).unwrap(), ())
///         .with_size_hint(ItemSize::Estimated(Size::new(100.0, h)))
/// };
/// let snapshot = Snapshot::new(vec![SectionSnapshot::new(
///     SectionId::new("today").unwrap(),
///     vec![item("a", 40.0), item("b", 40.0)],
/// )]);
///
/// let settings = LayoutSettings::default().with_inter_item_spacing(8.0).unwrap();
/// let mut engine = LayoutEngine::new(settings);
/// engine.apply(&diff(&Snapshot::default(), &snapshot).unwrap()).unwrap();
///
/// assert_eq!(engine.frame(ItemPath::new(0, 1)).map(|f| f.y), Some(48.0));
/// ```
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    settings: LayoutSettings,
    anchor_policy: AnchorPolicy,
    sections: Vec<SectionModel>,
    section_positions: HashMap<SectionId, usize>,
    /// Cell identity -> (owning section, index within it).
    item_locations: HashMap<ItemId, (SectionId, usize)>,
    index: SectionIndex,
    viewport: Option<Viewport>,
    container_width: Option<f64>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}

impl LayoutEngine {
    /// Empty engine.
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            anchor_policy: AnchorPolicy::default(),
            sections: Vec::new(),
            section_positions: HashMap::new(),
            item_locations: HashMap::new(),
            index: SectionIndex::new(16),
            viewport: None,
            container_width: None,
        }
    }

    /// Builder-style anchor policy.
    pub fn with_anchor_policy(mut self, policy: AnchorPolicy) -> Self {
        self.anchor_policy = policy;
        self
    }

    /// Active settings.
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Active anchor policy.
    pub fn anchor_policy(&self) -> AnchorPolicy {
        self.anchor_policy
    }

    /// Change the anchor policy.
    pub fn set_anchor_policy(&mut self, policy: AnchorPolicy) {
        self.anchor_policy = policy;
    }

    /// Last viewport reported by the renderer, shifted by every scroll
    /// adjustment since.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Record the renderer's visible window.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Width passed with the last `ContainerWidthChanged`.
    pub fn container_width(&self) -> Option<f64> {
        self.container_width
    }

    /// Sections top to bottom.
    pub fn sections(&self) -> &[SectionModel] {
        &self.sections
    }

    // ===== Queries =====

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of cells in `section`.
    pub fn item_count(&self, section: usize) -> Option<usize> {
        self.sections.get(section).map(SectionModel::len)
    }

    /// Content height of `section`, header and footer included.
    pub fn total_content_height(&self, section: usize) -> Option<f64> {
        self.sections.get(section).map(SectionModel::height)
    }

    /// Height of the whole scrollable content, insets included.
    pub fn content_height(&self) -> f64 {
        let insets = self.settings.additional_insets();
        let sections = if self.sections.is_empty() {
            0.0
        } else {
            self.index.total() - self.settings.inter_section_spacing()
        };
        insets.top + sections.max(0.0) + insets.bottom
    }

    /// Absolute frame of the cell at `path`.
    pub fn frame(&self, path: ItemPath) -> Option<Frame> {
        let model = self.cell(path)?;
        Some(model.frame(self.placeholder()).offset_by(self.section_origin(path.section)))
    }

    /// Absolute frame of a header or footer.
    pub fn supplementary_frame(&self, path: SupplementaryPath) -> Option<Frame> {
        let model = self.sections.get(path.section)?.supplementary(path.kind)?;
        Some(model.frame(self.placeholder()).offset_by(self.section_origin(path.section)))
    }

    /// Frame plus everything else a renderer needs for the cell at `path`.
    pub fn attributes(&self, path: ItemPath) -> Option<ItemAttributes> {
        let model = self.cell(path)?;
        Some(self.attributes_of(model, path.section))
    }

    /// Attributes of a header or footer.
    pub fn supplementary_attributes(&self, path: SupplementaryPath) -> Option<ItemAttributes> {
        let model = self.sections.get(path.section)?.supplementary(path.kind)?;
        Some(self.attributes_of(model, path.section))
    }

    /// Current sizing state of the cell at `path`.
    pub fn item_size(&self, path: ItemPath) -> Option<ItemSize> {
        self.cell(path).map(ItemModel::sizing)
    }

    /// Current address of a cell.
    pub fn path_of(&self, id: &ItemId) -> Option<ItemPath> {
        let (section_id, item) = self.item_locations.get(id)?;
        let section = *self.section_positions.get(section_id)?;
        Some(ItemPath::new(section, *item))
    }

    /// Cells whose frames intersect `range`, in address order.
    ///
    /// O(log n) to find the first section plus O(log m + k) per section.
    pub fn items_in(&self, range: Range<f64>) -> Vec<ItemPath> {
        let placeholder = self.placeholder();
        let mut paths = Vec::new();
        for (s, origin) in self.sections_in(&range) {
            let cells = self.sections[s].cells_in(range.start - origin, range.end - origin, placeholder);
            paths.extend(cells.map(|item| ItemPath::new(s, item)));
        }
        paths
    }

    /// Headers and footers whose frames intersect `range`.
    pub fn supplementary_in(&self, range: Range<f64>) -> Vec<SupplementaryPath> {
        let placeholder = self.placeholder();
        let mut paths = Vec::new();
        for (s, origin) in self.sections_in(&range) {
            for kind in [SupplementaryKind::Header, SupplementaryKind::Footer] {
                let visible = self.sections[s]
                    .supplementary(kind)
                    .is_some_and(|m| m.frame(placeholder).offset_by(origin).intersects(&range));
                if visible {
                    paths.push(SupplementaryPath { section: s, kind });
                }
            }
        }
        paths
    }

    /// Cells in `range` whose size is not yet exact.
    pub fn pending_measurements(&self, range: Range<f64>) -> Vec<ItemPath> {
        self.items_in(range)
            .into_iter()
            .filter(|&path| self.cell(path).is_some_and(|m| !m.sizing().is_exact()))
            .collect()
    }

    /// Headers and footers in `range` whose size is not yet exact.
    pub fn pending_supplementary(&self, range: Range<f64>) -> Vec<SupplementaryPath> {
        self.supplementary_in(range)
            .into_iter()
            .filter(|path| {
                self.sections[path.section]
                    .supplementary(path.kind)
                    .is_some_and(|m| !m.sizing().is_exact())
            })
            .collect()
    }

    // ===== Mutations =====

    /// Apply a changeset computed against the engine's current snapshot.
    ///
    /// The whole changeset is validated first; on error nothing changes.
    ///
    /// # Errors
    /// - [`LayoutError::UnknownItem`] / [`LayoutError::UnknownSection`] if an
    ///   old-side address does not hold the stated identity.
    /// - [`LayoutError::DuplicateItem`] / [`LayoutError::DuplicateSection`] if
    ///   an identity would end up twice in the layout.
    /// - [`LayoutError::StaleChangeset`] if the changeset does not account
    ///   for every item the engine holds.
    pub fn apply(&mut self, changes: &Changeset) -> Result<LayoutUpdate, LayoutError> {
        let plan = self.validate(changes)?;

        let before = self.content_height();
        let capture = self.capture_anchor(&plan.doomed);
        let placeholder = self.placeholder();
        let spacing = self.settings.inter_item_spacing();
        let old_len = self.sections.len();

        let mut old_sections: Vec<Option<SectionModel>> =
            std::mem::take(&mut self.sections).into_iter().map(Some).collect();

        // New section index -> first stream position needing relayout.
        let mut dirty: BTreeMap<usize, usize> = BTreeMap::new();

        // Cells of removed and reshaped sections are released into a pool
        // and claimed back by identity, so moves keep their measurements.
        let mut pool: HashMap<ItemId, ItemModel> = HashMap::new();
        for removal in &changes.removed_sections {
            if let Some(section) = old_sections[removal.index].as_mut() {
                pool.extend(section.take_items().into_iter().map(|m| (m.id().clone(), m)));
            }
        }
        for (&j, shape) in &changes.shapes {
            let Some(section) = plan.sources[j].and_then(|i| old_sections[i].as_mut()) else {
                continue;
            };
            let first_changed = section
                .items()
                .iter()
                .zip(&shape.items)
                .position(|(model, id)| model.id() != id)
                .unwrap_or_else(|| section.len().min(shape.items.len()));
            dirty.insert(j, section.stream_position(first_changed));
            pool.extend(section.take_items().into_iter().map(|m| (m.id().clone(), m)));
        }

        let mut sections = Vec::with_capacity(changes.section_order.len());
        for (j, id) in changes.section_order.iter().enumerate() {
            let mut section = match plan.sources[j].and_then(|i| old_sections[i].take()) {
                Some(section) => section,
                None => {
                    dirty.insert(j, 0);
                    SectionModel::new(id.clone())
                }
            };
            if let Some(shape) = changes.shapes.get(&j) {
                let items = shape
                    .items
                    .iter()
                    .filter_map(|item_id| match pool.remove(item_id) {
                        Some(mut model) => {
                            if let Some(seed) = plan.seeds.get(item_id) {
                                model.set_alignment(seed.alignment);
                            }
                            Some(model)
                        }
                        None => plan.seeds.get(item_id).map(|seed| seed_model(seed, spacing)),
                    })
                    .collect();
                section.replace_items(items);
            }
            sections.push(section);
        }
        trace!(dropped = pool.len(), "released item models");
        self.sections = sections;

        let restructured = plan.sources.len() != old_len
            || plan.sources.iter().enumerate().any(|(j, source)| *source != Some(j));
        if restructured {
            self.section_positions = changes
                .section_order
                .iter()
                .enumerate()
                .map(|(j, id)| (id.clone(), j))
                .collect();
        }

        for id in &plan.doomed {
            self.item_locations.remove(*id);
        }
        for (&j, shape) in &changes.shapes {
            let section_id = &changes.section_order[j];
            for (k, id) in shape.items.iter().enumerate() {
                self.item_locations.insert(id.clone(), (section_id.clone(), k));
            }
        }

        for update in &changes.updated_items {
            let Some(path) = self.path_of(&update.seed.id) else {
                continue;
            };
            if let Some(model) = self.sections[path.section].item_mut(path.item) {
                model.reset_size();
                model.set_alignment(update.seed.alignment);
            }
        }

        for change in &changes.supplementary {
            let kind = change.path.kind;
            let Some(section) = self.sections.get_mut(change.path.section) else {
                continue;
            };
            match &change.edit {
                SupplementaryEdit::Inserted(seed) => {
                    section.set_supplementary(kind, Some(seed_model(seed, spacing)));
                }
                SupplementaryEdit::Updated(seed) => {
                    if let Some(model) = section.supplementary_mut(kind) {
                        model.reset_size();
                        model.set_alignment(seed.alignment);
                    }
                    continue;
                }
                SupplementaryEdit::Removed => section.set_supplementary(kind, None),
            }
            let from = match kind {
                SupplementaryKind::Header => 0,
                SupplementaryKind::Footer => section.supplementary_stream_position(kind),
            };
            mark_dirty(&mut dirty, change.path.section, from);
        }

        let mut shifted_from = plan
            .sources
            .iter()
            .enumerate()
            .position(|(j, source)| *source != Some(j));
        for (&j, &from) in &dirty {
            let delta = self.sections[j].relayout_from(from, placeholder);
            if delta != 0.0 {
                shifted_from = Some(shifted_from.map_or(j + 1, |s| s.min(j + 1)));
            }
        }

        if restructured {
            self.rebuild_index();
        } else {
            for &j in dirty.keys() {
                self.refresh_extent(j);
            }
        }

        let (scroll_adjustment, anchor) = self.resolve_anchor(capture);
        let after = self.content_height();

        debug!(
            summary = %changes.summary(),
            dirty = dirty.len(),
            scroll_adjustment,
            "applied changeset"
        );

        Ok(LayoutUpdate {
            cause: UpdateCause::Changeset,
            scroll_adjustment,
            anchor,
            content_height: after,
            content_height_delta: after - before,
            dirty_sections: dirty.into_keys().collect(),
            shifted_from_section: shifted_from.filter(|&s| s < self.sections.len()),
        })
    }

    /// Record the exact size of the cell at `path`.
    ///
    /// Offsets of later elements of the same section are recomputed; later
    /// sections shift through the section index.
    ///
    /// Returns `Ok(None)` if `path` no longer exists (a measurement that
    /// raced a removal).
    ///
    /// # Errors
    /// [`LayoutError::InvalidSize`] if `size` is negative or not finite.
    pub fn report_measured(
        &mut self,
        path: ItemPath,
        size: Size,
    ) -> Result<Option<LayoutUpdate>, LayoutError> {
        let Some(model) = self.cell(path) else {
            trace!(%path, "dropping measurement for unknown item");
            return Ok(None);
        };
        check_size(model, size)?;
        let position = self.sections[path.section].stream_position(path.item);
        Ok(Some(self.record_measurement(path.section, position, size)))
    }

    /// Record the exact size of a header or footer.
    ///
    /// # Errors
    /// [`LayoutError::InvalidSize`] if `size` is negative or not finite.
    pub fn report_supplementary_measured(
        &mut self,
        path: SupplementaryPath,
        size: Size,
    ) -> Result<Option<LayoutUpdate>, LayoutError> {
        let Some(section) = self.sections.get(path.section) else {
            return Ok(None);
        };
        let Some(model) = section.supplementary(path.kind) else {
            return Ok(None);
        };
        check_size(model, size)?;
        let position = section.supplementary_stream_position(path.kind);
        Ok(Some(self.record_measurement(path.section, position, size)))
    }

    /// Drop or recompute cached geometry.
    ///
    /// Width and scale changes forget every measurement (keeping it as the
    /// estimate until re-measured). Settings changes keep measurements and
    /// recompute spacing and inset dependent offsets; identical settings are
    /// a no-op.
    ///
    /// # Errors
    /// [`LayoutError::Settings`] if the container width is negative or not
    /// finite.
    pub fn invalidate(&mut self, reason: InvalidationReason) -> Result<LayoutUpdate, LayoutError> {
        let before = self.content_height();
        let unchanged = LayoutUpdate::unchanged(UpdateCause::Invalidation, before);

        match &reason {
            InvalidationReason::ContainerWidthChanged(width) => {
                if !width.is_finite() {
                    return Err(SettingsError::NotFinite {
                        field: "container_width",
                    }
                    .into());
                }
                if *width < 0.0 {
                    return Err(SettingsError::Negative {
                        field: "container_width",
                        value: *width,
                    }
                    .into());
                }
                if self.container_width == Some(*width) {
                    return Ok(unchanged);
                }
            }
            InvalidationReason::SettingsChanged(settings) if *settings == self.settings => {
                return Ok(unchanged);
            }
            _ => {}
        }

        debug!(?reason, "invalidating layout");
        let capture = self.capture_anchor(&HashSet::new());

        match reason {
            InvalidationReason::ContainerWidthChanged(width) => {
                self.container_width = Some(width);
                self.reset_measurements();
            }
            InvalidationReason::ContentScaleChanged => self.reset_measurements(),
            InvalidationReason::SettingsChanged(settings) => {
                self.settings = settings;
                let spacing = settings.inter_item_spacing();
                for model in self.sections.iter_mut().flat_map(SectionModel::models_mut) {
                    model.set_inter_item_spacing(spacing);
                }
            }
        }

        let placeholder = self.placeholder();
        for section in &mut self.sections {
            section.relayout(placeholder);
        }
        self.rebuild_index();

        let (scroll_adjustment, anchor) = self.resolve_anchor(capture);
        let after = self.content_height();
        Ok(LayoutUpdate {
            cause: UpdateCause::Invalidation,
            scroll_adjustment,
            anchor,
            content_height: after,
            content_height_delta: after - before,
            dirty_sections: (0..self.sections.len()).collect(),
            shifted_from_section: (!self.sections.is_empty()).then_some(0),
        })
    }

    // ===== Internals =====

    fn placeholder(&self) -> Size {
        self.settings.estimated_item_size()
    }

    fn cell(&self, path: ItemPath) -> Option<&ItemModel> {
        self.sections.get(path.section)?.item(path.item)
    }

    fn section_origin(&self, section: usize) -> f64 {
        self.settings.additional_insets().top + self.index.start_of(section)
    }

    fn extent(&self, section: usize) -> f64 {
        self.sections[section].height() + self.settings.inter_section_spacing()
    }

    fn refresh_extent(&mut self, section: usize) {
        let extent = self.extent(section);
        self.index.set(section, extent);
    }

    fn rebuild_index(&mut self) {
        let extents: Vec<f64> = (0..self.sections.len()).map(|s| self.extent(s)).collect();
        self.index.rebuild(extents);
    }

    fn attributes_of(&self, model: &ItemModel, section: usize) -> ItemAttributes {
        ItemAttributes {
            frame: model.frame(self.placeholder()).offset_by(self.section_origin(section)),
            alignment: model.alignment(),
            kind: model.kind(),
            size_mode: model.sizing().mode(),
        }
    }

    /// Sections that may intersect `range`, with their absolute origins.
    fn sections_in<'a>(&'a self, range: &Range<f64>) -> impl Iterator<Item = (usize, f64)> + 'a {
        let top = self.settings.additional_insets().top;
        let first = self
            .index
            .lower_bound((range.start - top).max(0.0))
            .unwrap_or(self.sections.len());
        let end = range.end;
        (first..self.sections.len())
            .map(move |s| (s, top + self.index.start_of(s)))
            .take_while(move |&(_, origin)| origin < end)
    }

    fn first_cell_in(&self, range: &Range<f64>) -> Option<ItemPath> {
        let placeholder = self.placeholder();
        self.sections_in(range).find_map(|(s, origin)| {
            let cells = self.sections[s].cells_in(range.start - origin, range.end - origin, placeholder);
            (!cells.is_empty()).then(|| ItemPath::new(s, cells.start))
        })
    }

    fn cells_after(&self, path: ItemPath) -> impl Iterator<Item = ItemPath> + '_ {
        (path.section..self.sections.len()).flat_map(move |s| {
            let first = if s == path.section { path.item + 1 } else { 0 };
            (first..self.sections[s].len()).map(move |i| ItemPath::new(s, i))
        })
    }

    fn cells_before(&self, path: ItemPath) -> impl Iterator<Item = ItemPath> + '_ {
        (0..=path.section).rev().flat_map(move |s| {
            let end = if s == path.section {
                path.item
            } else {
                self.sections[s].len()
            };
            (0..end).rev().map(move |i| ItemPath::new(s, i))
        })
    }

    /// `start` if it survives, else the nearest surviving cell: forward in
    /// address order first, then backward.
    fn nearest_survivor(&self, start: ItemPath, doomed: &HashSet<&ItemId>) -> Option<ItemPath> {
        let survives = |path: &ItemPath| self.cell(*path).is_some_and(|m| !doomed.contains(m.id()));
        if survives(&start) {
            return Some(start);
        }
        let found = self
            .cells_after(start)
            .find(|p| survives(p))
            .or_else(|| self.cells_before(start).find(|p| survives(p)));
        debug!(%start, fallback = ?found, "scroll anchor removed, using neighbour");
        found
    }

    fn capture_anchor(&self, doomed: &HashSet<&ItemId>) -> AnchorCapture {
        let Some(viewport) = self.viewport else {
            return AnchorCapture::default();
        };
        let pinned_to_bottom = self.anchor_policy == AnchorPolicy::StickToBottom
            && anchor::is_at_bottom(&viewport, self.content_height());
        let anchor = self
            .first_cell_in(&viewport.range())
            .and_then(|path| self.nearest_survivor(path, doomed))
            .and_then(|path| {
                let id = self.cell(path)?.id().clone();
                let y = self.frame(path)?.y;
                Some(ScrollAnchor { id, y })
            });
        AnchorCapture {
            anchor,
            pinned_to_bottom,
        }
    }

    /// Scroll correction after a mutation; shifts the stored viewport.
    fn resolve_anchor(&mut self, capture: AnchorCapture) -> (f64, Option<ItemId>) {
        let Some(viewport) = self.viewport else {
            return (0.0, None);
        };
        let adjustment = if capture.pinned_to_bottom {
            anchor::bottom_offset(&viewport, self.content_height()) - viewport.offset_y
        } else if let Some(anchor) = &capture.anchor {
            match self.path_of(&anchor.id).and_then(|path| self.frame(path)) {
                Some(frame) => frame.y - anchor.y,
                None => {
                    warn!(anchor = %anchor.id, "scroll anchor vanished during mutation");
                    0.0
                }
            }
        } else {
            0.0
        };
        if adjustment != 0.0 {
            self.viewport = Some(viewport.offset_by(adjustment));
        }
        (adjustment, capture.anchor.map(|a| a.id))
    }

    fn record_measurement(&mut self, section: usize, position: usize, size: Size) -> LayoutUpdate {
        let before = self.content_height();
        let capture = self.capture_anchor(&HashSet::new());
        let placeholder = self.placeholder();

        let Some(model) = self.sections[section].stream_get_mut(position) else {
            return LayoutUpdate::unchanged(UpdateCause::Measurement, before);
        };
        let previous = model.set_measured(size, placeholder);
        if previous == size {
            return LayoutUpdate::unchanged(UpdateCause::Measurement, before);
        }

        let delta = self.sections[section].relayout_from(position + 1, placeholder);
        if delta != 0.0 {
            self.refresh_extent(section);
        }

        let (scroll_adjustment, anchor) = self.resolve_anchor(capture);
        let after = self.content_height();
        trace!(section, position, delta, scroll_adjustment, "measurement cascade");

        LayoutUpdate {
            cause: UpdateCause::Measurement,
            scroll_adjustment,
            anchor,
            content_height: after,
            content_height_delta: after - before,
            dirty_sections: vec![section],
            shifted_from_section: Some(section + 1)
                .filter(|&s| delta != 0.0 && s < self.sections.len()),
        }
    }

    fn reset_measurements(&mut self) {
        for model in self.sections.iter_mut().flat_map(SectionModel::models_mut) {
            model.reset_size();
        }
    }

    fn validate<'c>(&self, changes: &'c Changeset) -> Result<ApplyPlan<'c>, LayoutError> {
        for removal in &changes.removed_sections {
            self.check_section(&removal.id, removal.index)?;
        }
        for moved in &changes.moved_sections {
            self.check_section(&moved.id, moved.from)?;
        }
        for removal in &changes.removed_items {
            self.check_item(&removal.id, removal.path)?;
        }
        for moved in &changes.moved_items {
            self.check_item(&moved.id, moved.from)?;
        }

        let removed_sections: HashSet<usize> =
            changes.removed_sections.iter().map(|r| r.index).collect();
        let inserted_sections: HashSet<usize> = changes.inserted_sections.iter().copied().collect();

        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(changes.section_order.len());
        for (j, id) in changes.section_order.iter().enumerate() {
            if !seen.insert(id) {
                return Err(LayoutError::DuplicateSection(id.clone()));
            }
            let source = match self.section_positions.get(id) {
                Some(&i) if !removed_sections.contains(&i) => Some(i),
                _ if inserted_sections.contains(&j) => None,
                _ => return Err(LayoutError::UnknownSection(id.clone())),
            };
            sources.push(source);
        }

        let surviving = sources.iter().flatten().count();
        if surviving + removed_sections.len() != self.sections.len() {
            return Err(LayoutError::StaleChangeset(format!(
                "changeset accounts for {} of {} sections",
                surviving + removed_sections.len(),
                self.sections.len()
            )));
        }
        if let Some(&j) = changes.shapes.keys().find(|&&j| j >= sources.len()) {
            return Err(LayoutError::StaleChangeset(format!(
                "shape for section {j} beyond {} sections",
                sources.len()
            )));
        }

        // A section releases its cells if it is removed or reshaped.
        let new_index_of: HashMap<usize, usize> = sources
            .iter()
            .enumerate()
            .filter_map(|(j, source)| source.map(|i| (i, j)))
            .collect();
        let released = |old: usize| {
            removed_sections.contains(&old)
                || new_index_of
                    .get(&old)
                    .is_some_and(|j| changes.shapes.contains_key(j))
        };

        let mut seeds = HashMap::with_capacity(changes.inserted_items.len());
        for insertion in &changes.inserted_items {
            if seeds.insert(&insertion.seed.id, &insertion.seed).is_some() {
                return Err(LayoutError::DuplicateItem(insertion.seed.id.clone()));
            }
        }

        let mut removed = HashSet::with_capacity(changes.removed_items.len());
        for removal in &changes.removed_items {
            if !released(removal.path.section) {
                return Err(LayoutError::StaleChangeset(format!(
                    "{} removed from section {} which keeps its items",
                    removal.id, removal.path.section
                )));
            }
            if !removed.insert(&removal.id) {
                return Err(LayoutError::DuplicateItem(removal.id.clone()));
            }
        }

        if let Some(id) = seeds
            .keys()
            .find(|id| self.item_locations.contains_key(**id) && !removed.contains(**id))
        {
            return Err(LayoutError::DuplicateItem((*id).clone()));
        }

        let doomed: HashSet<&ItemId> = removed
            .into_iter()
            .filter(|id| !seeds.contains_key(id))
            .collect();

        let mut placed = HashSet::new();
        for (&j, shape) in &changes.shapes {
            for (k, id) in shape.items.iter().enumerate() {
                if !placed.insert(id) {
                    return Err(LayoutError::DuplicateItem(id.clone()));
                }
                match self.path_of(id) {
                    Some(current) if doomed.contains(id) || !released(current.section) => {
                        return Err(LayoutError::StaleChangeset(format!(
                            "{id} placed in section {j} but still held at {current}"
                        )));
                    }
                    Some(_) => {}
                    None if seeds.contains_key(id) => {}
                    None => {
                        return Err(LayoutError::UnknownItem {
                            id: id.clone(),
                            path: ItemPath::new(j, k),
                        });
                    }
                }
            }
        }

        let before: usize = self.sections.iter().map(SectionModel::len).sum();
        let after: usize = sources
            .iter()
            .enumerate()
            .map(|(j, source)| match changes.shapes.get(&j) {
                Some(shape) => shape.items.len(),
                None => source.map_or(0, |i| self.sections[i].len()),
            })
            .sum();
        let expected = (before + seeds.len()).checked_sub(changes.removed_items.len());
        if expected != Some(after) {
            return Err(LayoutError::StaleChangeset(format!(
                "changeset places {after} items, expected {}",
                expected.unwrap_or(0)
            )));
        }

        for update in &changes.updated_items {
            let known = (self.item_locations.contains_key(&update.seed.id)
                && !doomed.contains(&update.seed.id))
                || seeds.contains_key(&update.seed.id);
            if !known {
                return Err(LayoutError::UnknownItem {
                    id: update.seed.id.clone(),
                    path: update.path,
                });
            }
        }

        if let Some(change) = changes
            .supplementary
            .iter()
            .find(|c| c.path.section >= sources.len())
        {
            return Err(LayoutError::StaleChangeset(format!(
                "supplementary edit for section {} beyond {} sections",
                change.path.section,
                sources.len()
            )));
        }

        Ok(ApplyPlan {
            sources,
            seeds,
            doomed,
        })
    }

    fn check_section(&self, id: &SectionId, index: usize) -> Result<(), LayoutError> {
        if self.sections.get(index).map(SectionModel::id) == Some(id) {
            Ok(())
        } else {
            Err(LayoutError::UnknownSection(id.clone()))
        }
    }

    fn check_item(&self, id: &ItemId, path: ItemPath) -> Result<(), LayoutError> {
        if self.cell(path).map(ItemModel::id) == Some(id) {
            Ok(())
        } else {
            Err(LayoutError::UnknownItem {
                id: id.clone(),
                path,
            })
        }
    }
}

fn seed_model(seed: &ItemSeed, spacing: f64) -> ItemModel {
    ItemModel::new(
        seed.id.clone(),
        seed.kind,
        seed.size_hint,
        seed.alignment,
        spacing,
    )
}

fn check_size(model: &ItemModel, size: Size) -> Result<(), LayoutError> {
    if size.is_valid() {
        Ok(())
    } else {
        Err(LayoutError::InvalidSize {
            id: model.id().clone(),
            width: size.width,
            height: size.height,
        })
    }
}

fn mark_dirty(dirty: &mut BTreeMap<usize, usize>, section: usize, from: usize) {
    dirty
        .entry(section)
        .and_modify(|current| *current = (*current).min(from))
        .or_insert(from);
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
