#![forbid(unsafe_code)]

//! Viewport-driven fetch scheduling.
//!
//! [`ViewportController`] decides *when* a row fetch should happen and
//! *which* index range it should cover, given the table's scroll state. It
//! is a pure, caller-driven state machine: the embedder feeds it scroll and
//! resize events plus a clock, asks it to fire due deadlines, and reports
//! fetch completion back. No threads, no timers, no I/O.
//!
//! # Cycle state machine
//!
//! ```text
//!            scroll/resize            deadline due
//!   Idle ───────────────────▶ Armed ──────────────▶ InFlight
//!    ▲                          │  events: deadline │
//!    │   completed, no backlog  │  left running     │ events: set the
//!    └──────────────────────────┴───────────────────┤ one-more flag
//!    ▲                                              │
//!    └── completed, backlog ──▶ Armed (fresh deadline)
//! ```
//!
//! At most one fetch is in flight per controller. Events arriving while a
//! fetch is outstanding never start a second one; they collapse into
//! exactly one trailing cycle, armed when the outstanding fetch completes.
//!
//! # Invariants
//!
//! 1. `tick` returns `true` at most once per armed deadline.
//! 2. An armed deadline is never moved by later events (no reset).
//! 3. `fetch_completed` is the only way out of `InFlight`.

use std::time::{Duration, Instant};

use scrolltable_core::RowStore;
use tracing::{debug, trace};

/// Tuning knobs for the fetch scheduler.
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// Quiet period between a scroll/resize event and the fetch decision.
    pub debounce: Duration,

    /// Debounce for the very first cycle after initialization, when the
    /// viewport is known to be empty and waiting the full quiet period
    /// would just delay first paint.
    pub initial_debounce: Duration,

    /// Row height used when the view cannot measure a sample row or its
    /// header.
    pub default_row_height: u32,

    /// Viewport height used when the view is unmeasurable and carries no
    /// styled height.
    pub default_viewport_height: u32,

    /// Track unfetched ranges in a [`GapTracker`](scrolltable_core::GapTracker)
    /// so the rendering layer can pad the view with placeholders.
    pub track_gaps: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(250),
            initial_debounce: Duration::from_millis(10),
            default_row_height: crate::measure::DEFAULT_ROW_HEIGHT_PX,
            default_viewport_height: crate::measure::DEFAULT_VIEWPORT_HEIGHT_PX,
            track_gaps: true,
        }
    }
}

impl ScrollConfig {
    /// Override the debounce interval.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Override the first-cycle debounce.
    #[must_use]
    pub fn with_initial_debounce(mut self, debounce: Duration) -> Self {
        self.initial_debounce = debounce;
        self
    }

    /// Enable or disable placeholder gap tracking.
    #[must_use]
    pub fn with_track_gaps(mut self, track: bool) -> Self {
        self.track_gaps = track;
        self
    }
}

/// What the planner decided a cycle should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Every index the viewport needs is already populated; resolve the
    /// cycle immediately with zero new rows.
    Satisfied,
    /// Fetch rows `[start, stop)`.
    Fetch {
        /// First row index to request.
        start: usize,
        /// One past the last row index to request.
        stop: usize,
    },
}

/// Debounce phase of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Armed { deadline: Instant },
    InFlight,
}

/// Decides when to fetch and which row range, from scroll state alone.
#[derive(Debug, Clone)]
pub struct ViewportController {
    debounce: Duration,
    phase: Phase,
    /// One more cycle was requested while a fetch was in flight.
    more_after_fetch: bool,
    /// Last direction of motion; starts downward so the first fill walks
    /// forward from the top.
    scrolling_down: bool,
    last_scroll_px: u32,
    row_height_px: u32,
    viewport_height_px: u32,
}

impl ViewportController {
    /// Create a controller with the given debounce. Geometry starts at the
    /// configured defaults and is overwritten by [`set_geometry`].
    ///
    /// [`set_geometry`]: ViewportController::set_geometry
    #[must_use]
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            debounce: config.debounce,
            phase: Phase::Idle,
            more_after_fetch: false,
            scrolling_down: true,
            last_scroll_px: 0,
            row_height_px: config.default_row_height,
            viewport_height_px: config.default_viewport_height,
        }
    }

    /// Record resolved pixel geometry.
    pub fn set_geometry(&mut self, row_height_px: u32, viewport_height_px: u32) {
        self.row_height_px = row_height_px.max(1);
        self.viewport_height_px = viewport_height_px;
    }

    /// Resolved row height in pixels.
    #[must_use]
    pub fn row_height_px(&self) -> u32 {
        self.row_height_px
    }

    /// Direction of the most recent scroll motion.
    #[must_use]
    pub fn scrolling_down(&self) -> bool {
        self.scrolling_down
    }

    /// Whether a fetch is currently outstanding.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.phase == Phase::InFlight
    }

    /// Whether no cycle is armed or outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// A scroll event: derive direction from the offset delta, then request
    /// a cycle after the standard debounce.
    pub fn on_scroll(&mut self, offset_px: u32, now: Instant) {
        self.scrolling_down = self.last_scroll_px < offset_px;
        self.last_scroll_px = offset_px;
        self.schedule(self.debounce, now);
    }

    /// A resize event: record the new viewport height, then request a cycle
    /// after the standard debounce.
    pub fn on_resize(&mut self, viewport_height_px: u32, now: Instant) {
        self.viewport_height_px = viewport_height_px;
        self.schedule(self.debounce, now);
    }

    /// Request a cycle after `delay`.
    ///
    /// If a deadline is already armed it is left running - bursts of events
    /// share one deadline. If a fetch is in flight, the request collapses
    /// into the one-more flag and the cycle runs after that fetch
    /// completes.
    pub fn schedule(&mut self, delay: Duration, now: Instant) {
        match self.phase {
            Phase::InFlight => {
                self.more_after_fetch = true;
            }
            Phase::Armed { .. } => {}
            Phase::Idle => {
                trace!(delay_ms = delay.as_millis() as u64, "cycle armed");
                self.phase = Phase::Armed {
                    deadline: now + delay,
                };
            }
        }
    }

    /// Fire the armed deadline if it is due. Returns `true` exactly when a
    /// cycle begins; the controller is then in flight until
    /// [`fetch_completed`] is called, even for cycles that turn out to need
    /// no fetch.
    ///
    /// [`fetch_completed`]: ViewportController::fetch_completed
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Armed { deadline } if now >= deadline => {
                self.phase = Phase::InFlight;
                true
            }
            _ => false,
        }
    }

    /// The fetch (or no-op cycle) finished. Returns `true` when events
    /// arrived mid-flight and one trailing cycle was armed.
    pub fn fetch_completed(&mut self, now: Instant) -> bool {
        debug_assert!(self.phase == Phase::InFlight, "no cycle outstanding");
        self.phase = Phase::Idle;
        if self.more_after_fetch {
            self.more_after_fetch = false;
            self.phase = Phase::Armed {
                deadline: now + self.debounce,
            };
            debug!("trailing cycle armed after in-flight fetch");
            return true;
        }
        false
    }

    /// Forget scroll position and any pending cycle, as part of an explicit
    /// empty-and-refill.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.more_after_fetch = false;
        self.scrolling_down = true;
        self.last_scroll_px = 0;
    }

    /// Number of rows the viewport needs resident: `ceil(viewport / row)`,
    /// floored to at least one.
    #[must_use]
    pub fn desired_row_count(&self) -> usize {
        (self.viewport_height_px.div_ceil(self.row_height_px) as usize).max(1)
    }

    /// Compute the fetch range for the current scroll state.
    ///
    /// The window is the `desired_row_count()` rows starting at
    /// `floor(offset / row_height)`, clamped to the known total. Scrolling
    /// down, the walk runs forward from the window start and stops at the
    /// first unpopulated index; the fetch covers from there to the window
    /// end. Scrolling up, the walk runs backward from the window end and
    /// the fetch covers from the window start to just past the first
    /// unpopulated index found. Either way the request is the leading edge
    /// of motion, not a centered window, at the cost of re-requesting the
    /// odd interior row the idempotent merge then ignores.
    #[must_use]
    pub fn plan(&self, store: &RowStore) -> FetchPlan {
        let total = store.total_row_count();
        let first = (self.last_scroll_px / self.row_height_px) as usize;
        let window_stop = (first + self.desired_row_count()).min(total);
        if first >= window_stop {
            return FetchPlan::Satisfied;
        }

        if self.scrolling_down {
            for index in first..window_stop {
                if !store.is_populated(index) {
                    return FetchPlan::Fetch {
                        start: index,
                        stop: window_stop,
                    };
                }
            }
        } else {
            for index in (first..window_stop).rev() {
                if !store.is_populated(index) {
                    return FetchPlan::Fetch {
                        start: first,
                        stop: index + 1,
                    };
                }
            }
        }
        FetchPlan::Satisfied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrolltable_core::Record;
    use serde_json::json;

    const DEBOUNCE: Duration = Duration::from_millis(250);

    fn controller() -> ViewportController {
        let mut ctl = ViewportController::new(&ScrollConfig::default());
        // 5-row window: 100px viewport over 20px rows.
        ctl.set_geometry(20, 100);
        ctl
    }

    fn store_with(total: usize, populated: &[usize]) -> RowStore {
        let mut store = RowStore::new();
        store.set_total_row_count(total);
        for &index in populated {
            let rec = Record::try_from(json!({ "__id__": format!("r{index}") })).unwrap();
            store.set_row_data(index, rec);
        }
        store
    }

    #[test]
    fn idle_until_scheduled() {
        let mut ctl = controller();
        let t0 = Instant::now();
        assert!(ctl.is_idle());
        assert!(!ctl.tick(t0));
    }

    #[test]
    fn fires_only_once_deadline_is_due() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.on_scroll(40, t0);
        assert!(!ctl.tick(t0 + Duration::from_millis(100)));
        assert!(ctl.tick(t0 + DEBOUNCE));
        assert!(ctl.in_flight());
        // Firing is one-shot until the cycle completes.
        assert!(!ctl.tick(t0 + DEBOUNCE * 2));
    }

    #[test]
    fn armed_deadline_is_not_reset_by_later_events() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.on_scroll(40, t0);
        // A later event inside the window must not push the deadline out.
        ctl.on_scroll(80, t0 + Duration::from_millis(200));
        assert!(ctl.tick(t0 + DEBOUNCE));
    }

    #[test]
    fn burst_during_flight_collapses_to_one_trailing_cycle() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.on_scroll(40, t0);
        assert!(ctl.tick(t0 + DEBOUNCE));

        // Three events while the fetch is outstanding.
        ctl.on_scroll(60, t0 + DEBOUNCE);
        ctl.on_scroll(80, t0 + DEBOUNCE);
        ctl.on_scroll(100, t0 + DEBOUNCE);
        assert!(!ctl.tick(t0 + DEBOUNCE * 4), "no second concurrent fetch");

        let t_done = t0 + DEBOUNCE * 4;
        assert!(ctl.fetch_completed(t_done), "one trailing cycle armed");
        assert!(ctl.tick(t_done + DEBOUNCE));
        // And only one: completing it with no new events goes idle.
        assert!(!ctl.fetch_completed(t_done + DEBOUNCE));
        assert!(ctl.is_idle());
    }

    #[test]
    fn completion_without_backlog_goes_idle() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.on_scroll(40, t0);
        assert!(ctl.tick(t0 + DEBOUNCE));
        assert!(!ctl.fetch_completed(t0 + DEBOUNCE));
        assert!(ctl.is_idle());
    }

    #[test]
    fn direction_tracks_offset_deltas() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.on_scroll(40, t0);
        assert!(ctl.scrolling_down());
        ctl.on_scroll(20, t0);
        assert!(!ctl.scrolling_down());
        ctl.on_scroll(20, t0);
        assert!(!ctl.scrolling_down(), "equal offsets are not downward");
    }

    #[test]
    fn initial_fill_plans_whole_window() {
        let ctl = controller();
        let store = store_with(10, &[]);
        assert_eq!(ctl.plan(&store), FetchPlan::Fetch { start: 0, stop: 5 });
    }

    #[test]
    fn scroll_down_excludes_populated_prefix() {
        let mut ctl = controller();
        let t0 = Instant::now();
        let store = store_with(10, &[0, 1, 2, 3, 4]);
        // Scroll down by 3 rows: window is [3, 8); rows 3 and 4 are held.
        ctl.on_scroll(60, t0);
        assert_eq!(ctl.plan(&store), FetchPlan::Fetch { start: 5, stop: 8 });
    }

    #[test]
    fn scroll_down_fully_populated_is_satisfied() {
        let mut ctl = controller();
        let t0 = Instant::now();
        let store = store_with(10, &[3, 4, 5, 6, 7]);
        ctl.on_scroll(60, t0);
        assert_eq!(ctl.plan(&store), FetchPlan::Satisfied);
    }

    #[test]
    fn scroll_up_excludes_populated_suffix() {
        let mut ctl = controller();
        let t0 = Instant::now();
        // Rows 5..10 held from an earlier downward pass; scroll up to row 2.
        let store = store_with(10, &[5, 6, 7, 8, 9]);
        ctl.on_scroll(100, t0);
        ctl.on_scroll(40, t0);
        assert!(!ctl.scrolling_down());
        // Window [2, 7); rows 5 and 6 are held, so fetch [2, 5).
        assert_eq!(ctl.plan(&store), FetchPlan::Fetch { start: 2, stop: 5 });
    }

    #[test]
    fn scroll_up_fully_populated_is_satisfied() {
        let mut ctl = controller();
        let t0 = Instant::now();
        let store = store_with(10, &[0, 1, 2, 3, 4, 5, 6]);
        ctl.on_scroll(40, t0);
        ctl.on_scroll(20, t0);
        assert_eq!(ctl.plan(&store), FetchPlan::Satisfied);
    }

    #[test]
    fn window_clamps_to_total_row_count() {
        let mut ctl = controller();
        let t0 = Instant::now();
        let store = store_with(7, &[]);
        // Window would be [5, 10); only [5, 7) exists.
        ctl.on_scroll(100, t0);
        assert_eq!(ctl.plan(&store), FetchPlan::Fetch { start: 5, stop: 7 });
    }

    #[test]
    fn window_past_end_is_satisfied() {
        let mut ctl = controller();
        let t0 = Instant::now();
        let store = store_with(3, &[0, 1, 2]);
        ctl.on_scroll(200, t0);
        assert_eq!(ctl.plan(&store), FetchPlan::Satisfied);
    }

    #[test]
    fn empty_table_is_satisfied() {
        let ctl = controller();
        let store = store_with(0, &[]);
        assert_eq!(ctl.plan(&store), FetchPlan::Satisfied);
    }

    #[test]
    fn desired_row_count_rounds_up_and_floors_at_one() {
        let mut ctl = controller();
        ctl.set_geometry(20, 90);
        assert_eq!(ctl.desired_row_count(), 5);
        ctl.set_geometry(20, 0);
        assert_eq!(ctl.desired_row_count(), 1);
    }

    #[test]
    fn reset_clears_position_and_pending_state() {
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.on_scroll(100, t0);
        assert!(ctl.tick(t0 + DEBOUNCE));
        ctl.on_scroll(120, t0 + DEBOUNCE);
        ctl.reset();
        assert!(ctl.is_idle());
        assert!(ctl.scrolling_down());
        // No trailing cycle survives a reset.
        assert!(!ctl.tick(t0 + DEBOUNCE * 10));
    }

    #[test]
    fn zero_row_height_is_clamped() {
        let mut ctl = controller();
        ctl.set_geometry(0, 100);
        assert_eq!(ctl.row_height_px(), 1);
    }
}
