#![forbid(unsafe_code)]

//! The row transport seam.
//!
//! Everything this crate knows about the network is the [`RowFetcher`]
//! trait: a request/response channel keyed by operation and arguments. The
//! transport is constructor-injected into the driver; no ambient lookup.

use std::fmt;

use scrolltable_core::{Record, TableMetadata};

/// A failed remote operation, as reported by the transport collaborator.
///
/// `Clone` so a single failure can be fanned out to every waiter of the
/// settle cycle it belongs to. This layer never retries and does not
/// distinguish transient from permanent failure; that judgment belongs to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The round trip itself failed (connection, timeout, server fault).
    Transport(String),
    /// The server answered, but the payload could not be decoded into rows
    /// or metadata.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "row fetch failed: {msg}"),
            Self::Decode(msg) => write!(f, "row fetch returned an undecodable payload: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// The paired server-side object the table talks to.
///
/// `fetch_row_range` is the only operation the viewport scheduler issues on
/// its own; the rest are invoked by explicit caller actions (initial
/// attach, header click, row action button).
pub trait RowFetcher {
    /// Describe the table: columns, sort order, total row count.
    ///
    /// Called once at initialization and again only on explicit refill
    /// flows that need fresh totals.
    fn fetch_table_metadata(&mut self) -> Result<TableMetadata, FetchError>;

    /// Fetch rows `[start, stop)`. The server may return fewer rows than
    /// requested when the range overlaps the end of the table.
    fn fetch_row_range(&mut self, start: usize, stop: usize) -> Result<Vec<Record>, FetchError>;

    /// Ask the server to re-sort on `column`; returns the new ascending
    /// flag. The caller is expected to empty and refill afterwards.
    fn resort(&mut self, column: &str) -> Result<bool, FetchError>;

    /// Invoke a named server-side action against the row with `row_id`.
    /// The caller is expected to empty and refill afterwards.
    fn perform_action(&mut self, action: &str, row_id: &str) -> Result<(), FetchError>;
}
