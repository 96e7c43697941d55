#![forbid(unsafe_code)]

//! Public facade for the scrolltable crates.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports the data model from `scrolltable-core` and the fetch
//! scheduling runtime from `scrolltable-runtime`, and offers a lightweight
//! prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use scrolltable_core::{
    ColumnKind, ColumnSpec, Gap, GapTracker, ID_COLUMN, Record, RowStore, StoreError,
    TableMetadata,
};

// --- Runtime re-exports ----------------------------------------------------

pub use scrolltable_runtime::{
    DEFAULT_ROW_HEIGHT_PX, DEFAULT_VIEWPORT_HEIGHT_PX, FetchError, FetchPlan, RowFetcher,
    ScrollConfig, ScrollTable, StaticMeasure, ViewMeasure, ViewportController,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for scrolltable users.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A store-level contract violation (bad index, malformed record,
    /// unknown identifier).
    Store(StoreError),
    /// A failed remote operation.
    Fetch(FetchError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Fetch(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Fetch(err) => Some(err),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

/// Standard result type for scrolltable APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, FetchError, Record, Result, RowFetcher, RowStore, ScrollConfig, ScrollTable,
        StoreError, TableMetadata, ViewMeasure,
    };

    pub use crate::{core, runtime};
}

pub use scrolltable_core as core;
pub use scrolltable_runtime as runtime;
