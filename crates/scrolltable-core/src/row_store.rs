#![forbid(unsafe_code)]

//! Sparse, index-addressed cache of fetched rows.
//!
//! The store is a sequence indexed `0..row_count()` where each slot holds
//! either one [`Record`] or nothing (not yet fetched). `row_count()` is the
//! backing length - highest populated index plus one - not the number of
//! populated slots; the server-reported total is tracked separately via
//! [`RowStore::set_total_row_count`].
//!
//! # Operations
//!
//! | Operation | Time |
//! |-----------|------|
//! | `set_row_data` / `get_row_data` | O(1) amortised |
//! | `find_index` / `find_row_data` | O(n) linear scan |
//! | `find_next_row` / `find_prev_row` | O(n) |
//! | `remove_row` | O(n) (ordered delete, shifts later slots) |
//!
//! The linear identifier scan is deliberate: tables here hold hundreds of
//! rows, not millions, and a reverse index would have to be kept consistent
//! across the index renumbering `remove_row` performs.
//!
//! # Thread Safety
//!
//! `RowStore` is not thread-safe. It is mutated only from the single UI
//! event loop that owns the table.

use crate::error::StoreError;
use crate::record::Record;

/// Sparse row cache with ordered deletion.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    /// Backing sequence; `None` marks a never-fetched slot.
    rows: Vec<Option<Record>>,
    /// Server-reported total, independent of local cache fill.
    total_row_count: usize,
}

impl RowStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` at `index`, overwriting any existing record there.
    ///
    /// Grows the backing sequence as needed; intermediate slots stay absent.
    pub fn set_row_data(&mut self, index: usize, record: Record) {
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, || None);
        }
        self.rows[index] = Some(record);
    }

    /// Record at `index`, or `None` if the in-range slot was never fetched.
    ///
    /// # Errors
    ///
    /// `StoreError::IndexOutOfBounds` if `index >= row_count()`.
    pub fn get_row_data(&self, index: usize) -> Result<Option<&Record>, StoreError> {
        if index >= self.rows.len() {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows[index].as_ref())
    }

    /// Whether the slot at `index` holds a record. Out-of-range is absent.
    #[must_use]
    pub fn is_populated(&self, index: usize) -> bool {
        self.rows.get(index).is_some_and(Option::is_some)
    }

    /// Backing length: highest populated index + 1.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of populated slots.
    #[must_use]
    pub fn populated_count(&self) -> usize {
        self.rows.iter().filter(|slot| slot.is_some()).count()
    }

    /// Index of the row with the given identifier.
    ///
    /// # Errors
    ///
    /// `StoreError::NoSuchIdentifier` if no populated row carries `id`.
    pub fn find_index(&self, id: &str) -> Result<usize, StoreError> {
        self.rows
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|rec| rec.id() == id))
            .ok_or_else(|| StoreError::NoSuchIdentifier(id.to_owned()))
    }

    /// Record with the given identifier.
    ///
    /// # Errors
    ///
    /// `StoreError::NoSuchIdentifier` if no populated row carries `id`.
    pub fn find_row_data(&self, id: &str) -> Result<&Record, StoreError> {
        self.rows
            .iter()
            .flatten()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::NoSuchIdentifier(id.to_owned()))
    }

    /// Identifier of the first populated row after the row with identifier
    /// `id` for which `predicate(index, record)` holds.
    ///
    /// Absent slots are skipped. `Ok(None)` when the scan runs off the end.
    ///
    /// # Errors
    ///
    /// `StoreError::NoSuchIdentifier` if the anchor `id` is not present.
    pub fn find_next_row_matching(
        &self,
        id: &str,
        predicate: impl Fn(usize, &Record) -> bool,
    ) -> Result<Option<&str>, StoreError> {
        let start = self.find_index(id)? + 1;
        for (index, slot) in self.rows.iter().enumerate().skip(start) {
            if let Some(record) = slot
                && predicate(index, record)
            {
                return Ok(Some(record.id()));
            }
        }
        Ok(None)
    }

    /// Identifier of the first populated row after the row with identifier
    /// `id`. See [`RowStore::find_next_row_matching`].
    pub fn find_next_row(&self, id: &str) -> Result<Option<&str>, StoreError> {
        self.find_next_row_matching(id, |_, _| true)
    }

    /// Identifier of the first populated row before the row with identifier
    /// `id` for which `predicate(index, record)` holds, scanning backward.
    ///
    /// # Errors
    ///
    /// `StoreError::NoSuchIdentifier` if the anchor `id` is not present.
    pub fn find_prev_row_matching(
        &self,
        id: &str,
        predicate: impl Fn(usize, &Record) -> bool,
    ) -> Result<Option<&str>, StoreError> {
        let anchor = self.find_index(id)?;
        for index in (0..anchor).rev() {
            if let Some(record) = &self.rows[index]
                && predicate(index, record)
            {
                return Ok(Some(record.id()));
            }
        }
        Ok(None)
    }

    /// Identifier of the first populated row before the row with identifier
    /// `id`. See [`RowStore::find_prev_row_matching`].
    pub fn find_prev_row(&self, id: &str) -> Result<Option<&str>, StoreError> {
        self.find_prev_row_matching(id, |_, _| true)
    }

    /// Delete the slot at `index`, shifting every later slot down by one.
    ///
    /// Returns the removed record, or `None` if the slot was absent. This is
    /// a true ordered-sequence delete: `row_count()` always decreases by
    /// exactly one.
    ///
    /// # Errors
    ///
    /// `StoreError::IndexOutOfBounds` if `index >= row_count()`.
    pub fn remove_row(&mut self, index: usize) -> Result<Option<Record>, StoreError> {
        if index >= self.rows.len() {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.rows.len(),
            });
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(index, len = self.rows.len(), "remove_row");
        Ok(self.rows.remove(index))
    }

    /// Ascending indices of populated slots.
    #[must_use]
    pub fn row_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
            .collect()
    }

    /// Discard all rows. The server-reported total is left untouched; an
    /// explicit refill re-learns it from fresh metadata.
    pub fn empty(&mut self) {
        self.rows.clear();
    }

    /// Record the server-reported total row count.
    pub fn set_total_row_count(&mut self, total: usize) {
        self.total_row_count = total;
    }

    /// Server-reported total row count.
    #[must_use]
    pub fn total_row_count(&self) -> usize {
        self.total_row_count
    }
}
