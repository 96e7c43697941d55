#![forbid(unsafe_code)]

//! Fetch scheduling runtime for server-backed scrolling tables.
//!
//! The data model lives in `scrolltable-core`; this crate decides when to
//! talk to the server and integrates what comes back:
//!
//! - [`ViewportController`] - the debounce/fetch cycle state machine,
//!   caller-driven and deterministic
//! - [`RowFetcher`] - the injected transport seam, with [`FetchError`]
//! - [`ViewMeasure`] - the injected geometry seam, with the row-height and
//!   viewport-height fallback chains
//! - [`ScrollTable`] - the batteries-included driver composing all of the
//!   above for single-threaded embedders
//!
//! Concurrency model: cooperative and single-threaded. All operations run
//! between discrete events (scroll, timer fire, fetch completion); the
//! event loop is the only synchronization mechanism, and at most one fetch
//! is in flight per table.

pub mod fetch;
pub mod measure;
pub mod table;
pub mod viewport;

pub use fetch::{FetchError, RowFetcher};
pub use measure::{
    DEFAULT_ROW_HEIGHT_PX, DEFAULT_VIEWPORT_HEIGHT_PX, StaticMeasure, ViewMeasure,
    resolve_row_height, resolve_viewport_height,
};
pub use table::{ScrollTable, SettleCallback};
pub use viewport::{FetchPlan, ScrollConfig, ViewportController};
