#![forbid(unsafe_code)]

//! Row records.
//!
//! A record is one fetched unit of table data: an opaque mapping of column
//! name to JSON value, carrying a mandatory unique string identifier in the
//! [`ID_COLUMN`] column. Identifier *uniqueness* is caller discipline; this
//! module only enforces presence and type.

use serde_json::{Map, Value};

use crate::error::StoreError;

/// Column name of the mandatory row identifier.
pub const ID_COLUMN: &str = "__id__";

/// One fetched row: a JSON object with a string identifier column.
///
/// Column values are deliberately untyped (`serde_json::Value`); the data
/// model never interprets them. Rendering layers consult
/// [`ColumnKind`](crate::ColumnKind) from the table metadata to decide how
/// a value should be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Map<String, Value>,
}

impl Record {
    /// Build a record from a column map, validating the identifier column.
    ///
    /// # Errors
    ///
    /// `StoreError::InvalidRecord` if [`ID_COLUMN`] is missing or not a
    /// string.
    pub fn new(columns: Map<String, Value>) -> Result<Self, StoreError> {
        match columns.get(ID_COLUMN) {
            Some(Value::String(_)) => Ok(Self { columns }),
            Some(other) => Err(StoreError::InvalidRecord(format!(
                "identifier column {ID_COLUMN:?} must be a string, got {other}"
            ))),
            None => Err(StoreError::InvalidRecord(format!(
                "missing identifier column {ID_COLUMN:?}"
            ))),
        }
    }

    /// The row identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self.columns.get(ID_COLUMN) {
            Some(Value::String(id)) => id,
            // Construction validated the column; the map is not exposed
            // mutably, so this arm is unreachable.
            _ => unreachable!("record constructed without a string identifier"),
        }
    }

    /// Value of a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// All columns, in insertion order.
    #[must_use]
    pub fn columns(&self) -> &Map<String, Value> {
        &self.columns
    }

    /// Consume the record, returning the raw column map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.columns
    }
}

impl TryFrom<Value> for Record {
    type Error = StoreError;

    /// Decode a record straight off a JSON wire value.
    fn try_from(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(columns) => Self::new(columns),
            other => Err(StoreError::InvalidRecord(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}
