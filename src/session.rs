//! Layout session - drives the update loop around a [`LayoutEngine`].
//!
//! A session owns a data source, a measurer and the engine, and keeps the
//! snapshot the engine currently mirrors. Callers only say *when* things
//! happen (the source changed, the viewport moved, the container resized);
//! the session diffs, applies, measures and notifies observers.

use crate::diff::{diff, Changeset, Snapshot};
use crate::layout::{InvalidationReason, LayoutEngine, LayoutUpdate, Viewport};
use crate::model::{ItemPath, LayoutError, SupplementaryPath};
use crate::source::{DataSource, Measurer};
use tracing::{debug, info};

/// Default extra distance above and below the viewport that gets measured.
pub const DEFAULT_OVERSCAN: f64 = 200.0;

/// Receives every layout change that moved something.
pub trait LayoutObserver {
    /// Called after a mutation produced a non-empty update.
    fn layout_changed(&mut self, update: &LayoutUpdate);
}

/// Observer that logs updates at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LayoutObserver for TracingObserver {
    fn layout_changed(&mut self, update: &LayoutUpdate) {
        debug!(
            cause = ?update.cause,
            scroll_adjustment = update.scroll_adjustment,
            content_height = update.content_height,
            delta = update.content_height_delta,
            dirty = update.dirty_sections.len(),
            "layout changed"
        );
    }
}

/// Result of [`LayoutSession::reload`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadOutcome {
    /// What the differ found.
    pub changeset: Changeset,
    /// What the engine did with it.
    pub update: LayoutUpdate,
}

/// Result of a measurement pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasurePass {
    /// Number of elements measured.
    pub measured: usize,
    /// Sum of the scroll adjustments of every measurement.
    pub scroll_adjustment: f64,
}

/// Owner of the source -> diff -> engine -> measurer loop.
pub struct LayoutSession<S, M>
where
    S: DataSource,
    M: Measurer<S::Content>,
{
    source: S,
    measurer: M,
    engine: LayoutEngine,
    current: Snapshot<S::Content>,
    overscan: f64,
    observers: Vec<Box<dyn LayoutObserver>>,
}

impl<S, M> LayoutSession<S, M>
where
    S: DataSource,
    M: Measurer<S::Content>,
{
    /// Session over an empty engine. Call [`reload`](Self::reload) to load
    /// the source's first snapshot.
    pub fn new(source: S, measurer: M, engine: LayoutEngine) -> Self {
        Self {
            source,
            measurer,
            engine,
            current: Snapshot::default(),
            overscan: DEFAULT_OVERSCAN,
            observers: Vec::new(),
        }
    }

    /// Builder-style overscan distance. Negative values are treated as zero.
    pub fn with_overscan(mut self, overscan: f64) -> Self {
        self.overscan = overscan.max(0.0);
        self
    }

    /// Register an observer.
    pub fn add_observer(&mut self, observer: Box<dyn LayoutObserver>) {
        self.observers.push(observer);
    }

    /// The data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable data source. Changes become visible on the next `reload`.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The engine, for queries.
    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Snapshot the engine currently mirrors.
    pub fn snapshot(&self) -> &Snapshot<S::Content> {
        &self.current
    }

    /// Pull a fresh snapshot, diff it against the current one and apply it.
    ///
    /// # Errors
    /// Any [`LayoutError`] from the differ or the engine. The engine and the
    /// current snapshot are untouched on error.
    pub fn reload(&mut self) -> Result<ReloadOutcome, LayoutError> {
        let next = self.source.snapshot();
        let changeset = diff(&self.current, &next)?;
        let update = self.engine.apply(&changeset)?;
        self.current = next;

        info!(summary = %changeset.summary(), "reloaded snapshot");
        self.notify(&update);
        Ok(ReloadOutcome { changeset, update })
    }

    /// Record the renderer's visible window.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.engine.set_viewport(viewport);
    }

    /// The container changed width; every measurement is forgotten.
    ///
    /// # Errors
    /// [`LayoutError::Settings`] for a negative or non-finite width.
    pub fn resize(&mut self, width: f64) -> Result<LayoutUpdate, LayoutError> {
        let update = self
            .engine
            .invalidate(InvalidationReason::ContainerWidthChanged(width))?;
        self.notify(&update);
        Ok(update)
    }

    /// Apply any other invalidation.
    ///
    /// # Errors
    /// Whatever [`LayoutEngine::invalidate`] rejects.
    pub fn invalidate(&mut self, reason: InvalidationReason) -> Result<LayoutUpdate, LayoutError> {
        let update = self.engine.invalidate(reason)?;
        self.notify(&update);
        Ok(update)
    }

    /// Measure every unmeasured element in the viewport plus overscan.
    ///
    /// Measuring can move content into the window (estimates above may
    /// shrink), so the window is re-queried until nothing pending remains.
    /// Without a viewport nothing is measured.
    ///
    /// # Errors
    /// [`LayoutError::InvalidSize`] if the measurer returns a negative or
    /// non-finite size.
    pub fn measure_visible(&mut self) -> Result<MeasurePass, LayoutError> {
        let mut pass = MeasurePass::default();
        loop {
            let Some(viewport) = self.engine.viewport() else {
                return Ok(pass);
            };
            let range = viewport.overscanned(self.overscan);
            let cells = self.engine.pending_measurements(range.clone());
            let supplementary = self.engine.pending_supplementary(range);
            if cells.is_empty() && supplementary.is_empty() {
                break;
            }

            let before = pass.measured;
            for path in supplementary {
                self.measure_supplementary(path, &mut pass)?;
            }
            for path in cells {
                self.measure_cell(path, &mut pass)?;
            }
            if pass.measured == before {
                break;
            }
        }

        if pass.measured > 0 {
            debug!(
                measured = pass.measured,
                adjustment = pass.scroll_adjustment,
                "measured visible items"
            );
        }
        Ok(pass)
    }

    /// Measure every unmeasured element regardless of visibility.
    ///
    /// # Errors
    /// [`LayoutError::InvalidSize`] if the measurer returns a bad size.
    pub fn measure_all(&mut self) -> Result<MeasurePass, LayoutError> {
        let mut pass = MeasurePass::default();
        let everything = f64::NEG_INFINITY..f64::INFINITY;
        for path in self.engine.pending_supplementary(everything.clone()) {
            self.measure_supplementary(path, &mut pass)?;
        }
        for path in self.engine.pending_measurements(everything) {
            self.measure_cell(path, &mut pass)?;
        }
        Ok(pass)
    }

    fn max_width(&self) -> f64 {
        self.engine
            .container_width()
            .unwrap_or_else(|| self.engine.settings().estimated_item_size().width)
    }

    fn measure_cell(&mut self, path: ItemPath, pass: &mut MeasurePass) -> Result<(), LayoutError> {
        let Some(item) = self.current.item(path) else {
            return Ok(());
        };
        let size = self.measurer.measure(&item.content, self.max_width());
        if let Some(update) = self.engine.report_measured(path, size)? {
            pass.measured += 1;
            pass.scroll_adjustment += update.scroll_adjustment;
            self.notify(&update);
        }
        Ok(())
    }

    fn measure_supplementary(
        &mut self,
        path: SupplementaryPath,
        pass: &mut MeasurePass,
    ) -> Result<(), LayoutError> {
        let Some(item) = self
            .current
            .sections
            .get(path.section)
            .and_then(|section| section.supplementary(path.kind))
        else {
            return Ok(());
        };
        let size = self.measurer.measure(&item.content, self.max_width());
        if let Some(update) = self.engine.report_supplementary_measured(path, size)? {
            pass.measured += 1;
            pass.scroll_adjustment += update.scroll_adjustment;
            self.notify(&update);
        }
        Ok(())
    }

    fn notify(&mut self, update: &LayoutUpdate) {
        if update.is_noop() {
            return;
        }
        for observer in &mut self.observers {
            observer.layout_changed(update);
        }
    }
}
