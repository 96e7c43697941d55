#![forbid(unsafe_code)]

//! Table metadata: the initialization payload of the row transport.
//!
//! Fetched once when a table attaches, before any row range is requested.
//! Serde-derived so transports can decode it straight off the wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a column's values should be interpreted by a rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Plain text; rendered as-is.
    #[default]
    Text,
    /// Seconds since the epoch; rendered as a formatted date.
    Timestamp,
    /// Pre-rendered markup supplied by the server.
    Fragment,
    /// Anything this model does not interpret.
    #[serde(other)]
    Other,
}

/// Per-column description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Value interpretation.
    pub kind: ColumnKind,
    /// Whether the server accepts a resort on this column.
    pub sortable: bool,
}

/// Everything the server reports about a table at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Column names in display order.
    pub column_names: Vec<String>,
    /// Per-column specs, keyed by column name.
    pub column_types: BTreeMap<String, ColumnSpec>,
    /// Total row count on the server. May exceed the number of rows ever
    /// fetched locally.
    pub total_row_count: usize,
    /// Column the server is currently sorting by.
    pub sort_column: String,
    /// Whether the current sort is ascending.
    pub sort_ascending: bool,
}

impl TableMetadata {
    /// Spec for a named column, if the server described one.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.column_types.get(name)
    }

    /// Whether a resort on `column` is allowed.
    #[must_use]
    pub fn sortable(&self, column: &str) -> bool {
        self.column(column).is_some_and(|spec| spec.sortable)
    }
}
