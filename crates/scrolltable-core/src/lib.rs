#![forbid(unsafe_code)]

//! Data model for server-backed scrolling tables.
//!
//! A scrolling table keeps only the rows the user has actually scrolled past
//! in memory. This crate provides the two bookkeeping structures that make
//! that work, plus the record and metadata types they operate on:
//!
//! - [`RowStore`] - sparse, index-addressed cache of fetched rows
//! - [`GapTracker`] - ordered list of contiguous unfetched index ranges,
//!   used when the table pads its view with visual placeholders
//! - [`Record`] - one fetched row: a JSON object with a mandatory string
//!   identifier column
//! - [`TableMetadata`] - the initialization payload describing columns,
//!   sort order, and total row count
//!
//! Fetch scheduling lives in `scrolltable-runtime`; this crate is purely
//! single-threaded data bookkeeping with no I/O.

pub mod error;
pub mod gap_tracker;
pub mod metadata;
pub mod record;
pub mod row_store;

pub use error::StoreError;
pub use gap_tracker::{Gap, GapTracker};
pub use metadata::{ColumnKind, ColumnSpec, TableMetadata};
pub use record::{ID_COLUMN, Record};
pub use row_store::RowStore;
