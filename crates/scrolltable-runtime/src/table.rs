#![forbid(unsafe_code)]

//! The scrolling-table driver.
//!
//! [`ScrollTable`] composes the sparse [`RowStore`], the optional
//! [`GapTracker`], and the [`ViewportController`] with an injected
//! [`RowFetcher`] transport and [`ViewMeasure`] geometry source, and runs
//! complete debounce cycles: event in, deadline fired, range planned, rows
//! fetched and merged, waiters resolved, notification delivered.
//!
//! Everything runs on the caller's thread between discrete events; the
//! embedder owns the clock and calls [`ScrollTable::pump`] from its timer.
//! Several tables on one page are fully independent - no state crosses
//! instances.

use std::time::Instant;

use scrolltable_core::{GapTracker, Record, RowStore, StoreError, TableMetadata};
use tracing::{debug, warn};

use crate::fetch::{FetchError, RowFetcher};
use crate::measure::{ViewMeasure, resolve_row_height, resolve_viewport_height};
use crate::viewport::{FetchPlan, ScrollConfig, ViewportController};

/// Callback invoked when a settle cycle resolves: `Ok(newly_fetched)` or
/// the cycle's fetch failure.
pub type SettleCallback = Box<dyn FnOnce(Result<usize, FetchError>)>;

/// A server-backed scrolling table: thin view-model over a row transport.
pub struct ScrollTable<F: RowFetcher, M: ViewMeasure> {
    config: ScrollConfig,
    fetcher: F,
    measure: M,
    store: RowStore,
    gaps: GapTracker,
    controller: ViewportController,
    metadata: Option<TableMetadata>,
    waiters: Vec<SettleCallback>,
    rows_fetched_hook: Option<Box<dyn FnMut(usize)>>,
}

impl<F: RowFetcher, M: ViewMeasure> ScrollTable<F, M> {
    /// Build a table over an injected transport and geometry source.
    /// No remote call happens until [`initialize`].
    ///
    /// [`initialize`]: ScrollTable::initialize
    #[must_use]
    pub fn new(fetcher: F, measure: M, config: ScrollConfig) -> Self {
        let controller = ViewportController::new(&config);
        Self {
            config,
            fetcher,
            measure,
            store: RowStore::new(),
            gaps: GapTracker::new(),
            controller,
            metadata: None,
            waiters: Vec::new(),
            rows_fetched_hook: None,
        }
    }

    /// Attach to the server: fetch table metadata, size the store, register
    /// the initial placeholder gap, and arm a fast first fill cycle.
    ///
    /// # Errors
    ///
    /// Propagates the transport's [`FetchError`]; the table stays
    /// uninitialized and can be retried by the caller.
    pub fn initialize(&mut self, now: Instant) -> Result<&TableMetadata, FetchError> {
        let metadata = self.fetcher.fetch_table_metadata()?;
        debug!(
            total = metadata.total_row_count,
            sort = %metadata.sort_column,
            "table metadata fetched"
        );
        self.store.set_total_row_count(metadata.total_row_count);
        if self.config.track_gaps {
            self.gaps.register_initial_gap(metadata.total_row_count);
        }
        self.resolve_geometry();
        self.controller.schedule(self.config.initial_debounce, now);
        Ok(self.metadata.insert(metadata))
    }

    /// Entry point for the rendering layer's scroll and resize events;
    /// begins (or joins) a debounce cycle.
    pub fn on_scroll_or_resize(&mut self, now: Instant) {
        let viewport = resolve_viewport_height(&self.measure, self.config.default_viewport_height);
        self.controller.on_resize(viewport, now);
        self.controller.on_scroll(self.measure.scroll_offset(), now);
    }

    /// Drive the debounce clock. Runs at most one full cycle; returns
    /// `true` if a cycle ran. Call from a timer at whatever granularity the
    /// embedder's event loop offers.
    pub fn pump(&mut self, now: Instant) -> bool {
        if !self.controller.tick(now) {
            return false;
        }
        self.run_cycle(now);
        true
    }

    /// Register a waiter resolved when the current settle cycle completes.
    /// All waiters registered during one cycle resolve together, with the
    /// count of newly fetched rows or that cycle's fetch failure. If no
    /// cycle is armed or in flight, the waiter resolves immediately with
    /// `Ok(0)`.
    pub fn when_settled(&mut self, callback: impl FnOnce(Result<usize, FetchError>) + 'static) {
        if self.controller.is_idle() {
            callback(Ok(0));
        } else {
            self.waiters.push(Box::new(callback));
        }
    }

    /// Install the per-cycle notification hook: called once per completed
    /// cycle with the count of newly populated rows, including zero.
    pub fn on_rows_fetched(&mut self, hook: impl FnMut(usize) + 'static) {
        self.rows_fetched_hook = Some(Box::new(hook));
    }

    /// Discard every cached row and placeholder, scroll bookkeeping
    /// included, then arm a refill cycle. The server total is kept; use
    /// [`resort`] or a fresh [`initialize`] when it may have changed.
    ///
    /// [`resort`]: ScrollTable::resort
    /// [`initialize`]: ScrollTable::initialize
    pub fn empty_and_refill(&mut self, now: Instant) {
        self.store.empty();
        if self.config.track_gaps {
            self.gaps.register_initial_gap(self.store.total_row_count());
        }
        self.controller.reset();
        self.resolve_geometry();
        self.controller.schedule(self.config.debounce, now);
    }

    /// Ask the server to re-sort on `column`, then empty and refill.
    /// Returns the new ascending flag.
    ///
    /// # Errors
    ///
    /// Propagates the transport's [`FetchError`]; on failure the cached
    /// rows are left untouched.
    pub fn resort(&mut self, column: &str, now: Instant) -> Result<bool, FetchError> {
        let ascending = self.fetcher.resort(column)?;
        if let Some(metadata) = &mut self.metadata {
            metadata.sort_column = column.to_owned();
            metadata.sort_ascending = ascending;
        }
        self.empty_and_refill(now);
        Ok(ascending)
    }

    /// Invoke a named server-side action against a row, then empty and
    /// refill so the view reflects whatever the action changed.
    ///
    /// # Errors
    ///
    /// Propagates the transport's [`FetchError`]; on failure the cached
    /// rows are left untouched.
    pub fn perform_action(
        &mut self,
        action: &str,
        row_id: &str,
        now: Instant,
    ) -> Result<(), FetchError> {
        self.fetcher.perform_action(action, row_id)?;
        self.empty_and_refill(now);
        Ok(())
    }

    /// Delete the row at `index`, renumbering later rows and keeping the
    /// placeholder gaps and server total consistent.
    ///
    /// # Errors
    ///
    /// `StoreError::IndexOutOfBounds` if `index >= row_count()`.
    pub fn remove_row(&mut self, index: usize) -> Result<Option<Record>, StoreError> {
        let removed = self.store.remove_row(index)?;
        if self.config.track_gaps {
            self.gaps.row_removed(index);
        }
        let total = self.store.total_row_count().saturating_sub(1);
        self.store.set_total_row_count(total);
        Ok(removed)
    }

    /// Metadata from the last [`initialize`], if any.
    ///
    /// [`initialize`]: ScrollTable::initialize
    #[must_use]
    pub fn metadata(&self) -> Option<&TableMetadata> {
        self.metadata.as_ref()
    }

    /// The sparse row cache, for the rendering layer to pull current data
    /// when drawing. See [`RowStore`] for the full read contract.
    #[must_use]
    pub fn rows(&self) -> &RowStore {
        &self.store
    }

    /// The tracked placeholder gaps. Empty when gap tracking is off.
    #[must_use]
    pub fn gaps(&self) -> &GapTracker {
        &self.gaps
    }

    /// Run one fired cycle to completion: plan, fetch, merge, resolve.
    fn run_cycle(&mut self, now: Instant) {
        match self.controller.plan(&self.store) {
            FetchPlan::Satisfied => {
                debug!("cycle satisfied from cache, no fetch issued");
                self.controller.fetch_completed(now);
                self.settle(Ok(0));
            }
            FetchPlan::Fetch { start, stop } => {
                debug!(start, stop, "fetching row range");
                match self.fetcher.fetch_row_range(start, stop) {
                    Ok(rows) => {
                        let fresh = self.merge_rows(start, rows);
                        debug!(fresh, "row range merged");
                        self.controller.fetch_completed(now);
                        self.settle(Ok(fresh));
                    }
                    Err(err) => {
                        warn!(%err, start, stop, "row range fetch failed");
                        self.controller.fetch_completed(now);
                        self.settle(Err(err));
                    }
                }
            }
        }
    }

    /// Merge fetched rows at their target indices. Already-populated slots
    /// are left untouched, so duplicate responses for the same range are
    /// idempotent. Returns the count of newly populated slots.
    fn merge_rows(&mut self, start: usize, rows: Vec<Record>) -> usize {
        let mut fresh = 0;
        for (offset, record) in rows.into_iter().enumerate() {
            let index = start + offset;
            if self.store.is_populated(index) {
                continue;
            }
            self.store.set_row_data(index, record);
            if self.config.track_gaps {
                self.gaps.row_fetched(index);
            }
            fresh += 1;
        }
        fresh
    }

    /// Resolve one cycle: every waiter gets the same outcome, and the
    /// rows-fetched hook fires on success (zero included).
    fn settle(&mut self, outcome: Result<usize, FetchError>) {
        for waiter in self.waiters.drain(..) {
            waiter(outcome.clone());
        }
        if let Ok(fresh) = outcome
            && let Some(hook) = &mut self.rows_fetched_hook
        {
            hook(fresh);
        }
    }

    /// Re-read pixel geometry through the measurement fallback chains.
    fn resolve_geometry(&mut self) {
        let row = resolve_row_height(&self.measure, self.config.default_row_height);
        let viewport = resolve_viewport_height(&self.measure, self.config.default_viewport_height);
        self.controller.set_geometry(row, viewport);
    }
}
