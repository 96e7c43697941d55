#![forbid(unsafe_code)]

//! Placeholder-gap tracking for the fixed-height table variant.
//!
//! When a table pads its view with visual placeholders while data streams
//! in, it needs to know exactly which index ranges are still unfetched.
//! [`GapTracker`] keeps those ranges as an ordered list of half-open
//! intervals over row indices.
//!
//! # Invariants
//!
//! 1. Gaps are sorted ascending by `start`.
//! 2. Gaps never overlap and never touch: `gaps[i].stop < gaps[i+1].start`.
//! 3. No gap is empty (`start < stop`).
//! 4. Between operations, the union of all gaps plus all populated indices
//!    in the paired [`RowStore`](crate::RowStore) covers exactly
//!    `[0, total)`.
//!
//! Inserting `k` freshly fetched rows is done per row: binary-search the
//! gap the row falls in (O(log g) for g tracked gaps), then split it into
//! at most two remaining gaps. `g` is bounded by the number of fetch
//! operations, not the row count, so the per-row loop stays cheap.

/// A contiguous half-open range `[start, stop)` of unfetched row indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    /// First unfetched index.
    pub start: usize,
    /// One past the last unfetched index.
    pub stop: usize,
}

impl Gap {
    /// Build a gap. Empty gaps (`start >= stop`) are legal values here but
    /// are never stored by the tracker.
    #[must_use]
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// Number of indices covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    /// Whether the gap covers no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    /// Whether `row` falls inside the gap.
    #[must_use]
    pub fn contains(&self, row: usize) -> bool {
        self.start <= row && row < self.stop
    }
}

/// Ordered, non-overlapping, non-touching list of unfetched index ranges.
#[derive(Debug, Clone, Default)]
pub struct GapTracker {
    gaps: Vec<Gap>,
}

impl GapTracker {
    /// Create a tracker with no gaps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the tracker to a single gap `[0, total)`, discarding prior
    /// state. A `total` of zero leaves the tracker empty.
    pub fn register_initial_gap(&mut self, total: usize) {
        self.gaps.clear();
        if total > 0 {
            self.gaps.push(Gap::new(0, total));
        }
    }

    /// Position of the gap containing `row`, or `None` if `row` falls in
    /// already-fetched territory. O(log g).
    #[must_use]
    pub fn find_gap_for_row(&self, row: usize) -> Option<usize> {
        let i = self.gaps.partition_point(|gap| gap.stop <= row);
        (i < self.gaps.len() && self.gaps[i].start <= row).then_some(i)
    }

    /// Position of the first gap starting at or after `row`. O(log g).
    #[must_use]
    pub fn find_first_gap_after_row(&self, row: usize) -> Option<usize> {
        let i = self.gaps.partition_point(|gap| gap.start < row);
        (i < self.gaps.len()).then_some(i)
    }

    /// Replace the gap at `gap_index` with up to two gaps. Degenerate
    /// (empty) halves are dropped rather than inserted.
    ///
    /// # Panics
    ///
    /// Panics if `gap_index` is out of range.
    pub fn split_gap(&mut self, gap_index: usize, above: Option<Gap>, below: Option<Gap>) {
        assert!(
            gap_index < self.gaps.len(),
            "gap index {gap_index} out of range ({} gaps)",
            self.gaps.len()
        );
        let replacement = [above, below]
            .into_iter()
            .flatten()
            .filter(|gap| !gap.is_empty());
        self.gaps.splice(gap_index..=gap_index, replacement);
    }

    /// Overwrite the gap at `gap_index`.
    ///
    /// # Panics
    ///
    /// Panics if `gap_index` is out of range or `gap` is empty.
    pub fn replace_gap(&mut self, gap_index: usize, gap: Gap) {
        assert!(!gap.is_empty(), "cannot store an empty gap");
        self.gaps[gap_index] = gap;
    }

    /// Delete the gap at `gap_index` entirely.
    ///
    /// # Panics
    ///
    /// Panics if `gap_index` is out of range.
    pub fn remove_gap(&mut self, gap_index: usize) {
        self.gaps.remove(gap_index);
    }

    /// Mark `row` as fetched: locate its gap and split around it.
    ///
    /// Returns `false` when `row` was already in fetched territory, which
    /// makes repeated merges of the same range idempotent.
    pub fn row_fetched(&mut self, row: usize) -> bool {
        let Some(i) = self.find_gap_for_row(row) else {
            return false;
        };
        let gap = self.gaps[i];
        self.split_gap(
            i,
            Some(Gap::new(gap.start, row)),
            Some(Gap::new(row + 1, gap.stop)),
        );
        true
    }

    /// Keep gap bounds consistent after an ordered row deletion at `row`:
    /// every boundary strictly greater than `row` shifts down by one.
    ///
    /// A deletion can leave two gaps touching (when the populated row
    /// separating them is the one removed); such neighbours are merged so
    /// the never-touch invariant holds.
    pub fn row_removed(&mut self, row: usize) {
        for gap in &mut self.gaps {
            if gap.start > row {
                gap.start -= 1;
            }
            if gap.stop > row {
                gap.stop -= 1;
            }
        }
        self.gaps.retain(|gap| !gap.is_empty());

        let mut merged: Vec<Gap> = Vec::with_capacity(self.gaps.len());
        for gap in self.gaps.drain(..) {
            match merged.last_mut() {
                Some(last) if last.stop >= gap.start => last.stop = last.stop.max(gap.stop),
                _ => merged.push(gap),
            }
        }
        self.gaps = merged;
    }

    /// Discard all gaps.
    pub fn empty(&mut self) {
        self.gaps.clear();
    }

    /// The tracked gaps, ascending by `start`.
    #[must_use]
    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// Total number of unfetched indices across all gaps.
    #[must_use]
    pub fn unfetched_count(&self) -> usize {
        self.gaps.iter().map(Gap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaps_of(tracker: &GapTracker) -> Vec<(usize, usize)> {
        tracker.gaps().iter().map(|g| (g.start, g.stop)).collect()
    }

    #[test]
    fn initial_gap_covers_everything() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        assert_eq!(gaps_of(&tracker), vec![(0, 10)]);
        assert_eq!(tracker.unfetched_count(), 10);
    }

    #[test]
    fn initial_gap_of_zero_rows_is_empty() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(0);
        assert!(tracker.gaps().is_empty());
    }

    #[test]
    fn register_discards_prior_state() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.row_fetched(4);
        tracker.register_initial_gap(6);
        assert_eq!(gaps_of(&tracker), vec![(0, 6)]);
    }

    #[test]
    fn find_gap_for_row_hits_and_misses() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.row_fetched(4);
        // Gaps are now [0,4) and [5,10).
        assert_eq!(tracker.find_gap_for_row(0), Some(0));
        assert_eq!(tracker.find_gap_for_row(3), Some(0));
        assert_eq!(tracker.find_gap_for_row(4), None);
        assert_eq!(tracker.find_gap_for_row(5), Some(1));
        assert_eq!(tracker.find_gap_for_row(9), Some(1));
        assert_eq!(tracker.find_gap_for_row(10), None);
    }

    #[test]
    fn find_first_gap_after_row() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.row_fetched(4);
        assert_eq!(tracker.find_first_gap_after_row(0), Some(0));
        assert_eq!(tracker.find_first_gap_after_row(1), Some(1));
        assert_eq!(tracker.find_first_gap_after_row(5), Some(1));
        assert_eq!(tracker.find_first_gap_after_row(6), None);
    }

    #[test]
    fn fetch_at_gap_start_trims_leading_edge() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        assert!(tracker.row_fetched(0));
        assert_eq!(gaps_of(&tracker), vec![(1, 10)]);
    }

    #[test]
    fn fetch_at_gap_end_trims_trailing_edge() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        assert!(tracker.row_fetched(9));
        assert_eq!(gaps_of(&tracker), vec![(0, 9)]);
    }

    #[test]
    fn fetch_mid_gap_splits_in_two() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        assert!(tracker.row_fetched(4));
        assert_eq!(gaps_of(&tracker), vec![(0, 4), (5, 10)]);
    }

    #[test]
    fn fetch_single_row_gap_removes_it() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(1);
        assert!(tracker.row_fetched(0));
        assert!(tracker.gaps().is_empty());
    }

    #[test]
    fn refetch_is_idempotent() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        assert!(tracker.row_fetched(4));
        assert!(!tracker.row_fetched(4));
        assert_eq!(gaps_of(&tracker), vec![(0, 4), (5, 10)]);
    }

    #[test]
    fn row_removed_shifts_later_gaps() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.row_fetched(2);
        // [0,2) and [3,10); delete fetched row 2.
        tracker.row_removed(2);
        // Former [3,10) shifts to [2,9) and now touches [0,2): merged.
        assert_eq!(gaps_of(&tracker), vec![(0, 9)]);
    }

    #[test]
    fn row_removed_inside_gap_shrinks_it() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.row_removed(5);
        assert_eq!(gaps_of(&tracker), vec![(0, 9)]);
    }

    #[test]
    fn row_removed_drops_emptied_gap() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        for row in 0..9 {
            tracker.row_fetched(row);
        }
        // Only [9,10) remains; delete the unfetched row 9.
        tracker.row_removed(9);
        assert!(tracker.gaps().is_empty());
    }

    #[test]
    fn split_gap_drops_degenerate_halves() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.split_gap(0, Some(Gap::new(0, 0)), Some(Gap::new(3, 10)));
        assert_eq!(gaps_of(&tracker), vec![(3, 10)]);
        tracker.split_gap(0, None, Some(Gap::new(7, 10)));
        assert_eq!(gaps_of(&tracker), vec![(7, 10)]);
    }

    #[test]
    fn replace_and_remove_gap() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.replace_gap(0, Gap::new(2, 10));
        assert_eq!(gaps_of(&tracker), vec![(2, 10)]);
        tracker.remove_gap(0);
        assert!(tracker.gaps().is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn split_gap_bad_index_panics() {
        let mut tracker = GapTracker::new();
        tracker.split_gap(0, None, None);
    }

    #[test]
    fn empty_clears_all() {
        let mut tracker = GapTracker::new();
        tracker.register_initial_gap(10);
        tracker.empty();
        assert!(tracker.gaps().is_empty());
        assert_eq!(tracker.unfetched_count(), 0);
    }
}
