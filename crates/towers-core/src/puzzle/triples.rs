//! # Triple Collection
//!
//! Tri-indexed store of the live `(row, col, val)` possibilities.
//!
//! Three parallel maps are kept:
//! - `(row, col) -> {val}`
//! - `(row, val) -> {col}`
//! - `(col, val) -> {row}`
//!
//! A missing key means "the full domain `0..size`". Keys are materialized
//! explicitly through the `get_with_*` accessors before any mutation, so
//! the three maps always describe the same live triple set.

use crate::types::Triple;
use std::collections::{BTreeMap, BTreeSet};

type Index = BTreeMap<(usize, usize), BTreeSet<usize>>;

/// Sparse possibility store for an N x N grid with N values per cell.
#[derive(Debug, Clone)]
pub struct TripleCollection {
    size: usize,
    by_row_col: Index,
    by_row_val: Index,
    by_col_val: Index,
}

impl TripleCollection {
    /// Create a collection in which every triple is live.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            by_row_col: Index::new(),
            by_row_val: Index::new(),
            by_col_val: Index::new(),
        }
    }

    /// Grid size N.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    fn full_domain(&self) -> BTreeSet<usize> {
        (0..self.size).collect()
    }

    fn entry(index: &mut Index, size: usize, key: (usize, usize)) -> &mut BTreeSet<usize> {
        index.entry(key).or_insert_with(|| (0..size).collect())
    }

    // -------------------------------------------------------------------------
    // Get-or-insert accessors
    // -------------------------------------------------------------------------

    /// Values still possible in cell `(row, col)`, materializing the key.
    pub fn get_with_row_col(&mut self, row: usize, col: usize) -> &BTreeSet<usize> {
        Self::entry(&mut self.by_row_col, self.size, (row, col))
    }

    /// Columns of `row` that can still hold `val`, materializing the key.
    pub fn get_with_row_val(&mut self, row: usize, val: usize) -> &BTreeSet<usize> {
        Self::entry(&mut self.by_row_val, self.size, (row, val))
    }

    /// Rows of `col` that can still hold `val`, materializing the key.
    pub fn get_with_col_val(&mut self, col: usize, val: usize) -> &BTreeSet<usize> {
        Self::entry(&mut self.by_col_val, self.size, (col, val))
    }

    // -------------------------------------------------------------------------
    // Read-only snapshots
    // -------------------------------------------------------------------------

    /// Snapshot of the values possible in `(row, col)`.
    #[must_use]
    pub fn row_col(&self, row: usize, col: usize) -> BTreeSet<usize> {
        self.by_row_col
            .get(&(row, col))
            .cloned()
            .unwrap_or_else(|| self.full_domain())
    }

    /// Snapshot of the columns of `row` that can hold `val`.
    #[must_use]
    pub fn row_val(&self, row: usize, val: usize) -> BTreeSet<usize> {
        self.by_row_val
            .get(&(row, val))
            .cloned()
            .unwrap_or_else(|| self.full_domain())
    }

    /// Snapshot of the rows of `col` that can hold `val`.
    #[must_use]
    pub fn col_val(&self, col: usize, val: usize) -> BTreeSet<usize> {
        self.by_col_val
            .get(&(col, val))
            .cloned()
            .unwrap_or_else(|| self.full_domain())
    }

    /// Number of values possible in `(row, col)` without cloning.
    #[must_use]
    pub fn count_row_col(&self, row: usize, col: usize) -> usize {
        self.by_row_col
            .get(&(row, col))
            .map_or(self.size, BTreeSet::len)
    }

    // -------------------------------------------------------------------------
    // Membership and mutation
    // -------------------------------------------------------------------------

    /// Whether `triple` is still live.
    #[must_use]
    pub fn has(&self, triple: Triple) -> bool {
        if triple.val >= self.size {
            return false;
        }
        self.by_row_col
            .get(&(triple.row, triple.col))
            .is_none_or(|vals| vals.contains(&triple.val))
    }

    /// Make `triple` live. Returns whether it was absent before.
    pub fn add(&mut self, triple: Triple) -> bool {
        let Triple { row, col, val } = triple;
        let size = self.size;
        let added = Self::entry(&mut self.by_row_col, size, (row, col)).insert(val);
        Self::entry(&mut self.by_row_val, size, (row, val)).insert(col);
        Self::entry(&mut self.by_col_val, size, (col, val)).insert(row);
        added
    }

    /// Remove `triple`. Returns whether it was present.
    pub fn delete(&mut self, triple: Triple) -> bool {
        let Triple { row, col, val } = triple;
        let size = self.size;
        let removed = Self::entry(&mut self.by_row_col, size, (row, col)).remove(&val);
        Self::entry(&mut self.by_row_val, size, (row, val)).remove(&col);
        Self::entry(&mut self.by_col_val, size, (col, val)).remove(&row);
        removed
    }

    /// Replace the values of `(row, col)` with exactly `values`.
    ///
    /// Returns the previous values.
    pub fn replace_cell(
        &mut self,
        row: usize,
        col: usize,
        values: &BTreeSet<usize>,
    ) -> BTreeSet<usize> {
        let previous = self.row_col(row, col);
        for &val in previous.difference(values) {
            self.delete(Triple::new(row, col, val));
        }
        for &val in values.difference(&previous) {
            self.add(Triple::new(row, col, val));
        }
        previous
    }

    /// Check that the three indices describe the same live set.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        for row in 0..self.size {
            for col in 0..self.size {
                for val in 0..self.size {
                    let a = self.row_col(row, col).contains(&val);
                    let b = self.row_val(row, val).contains(&col);
                    let c = self.col_val(col, val).contains(&row);
                    if a != b || b != c {
                        return false;
                    }
                }
            }
        }
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_keys_are_full_domain() {
        let mut triples = TripleCollection::new(4);
        assert_eq!(triples.row_col(1, 2).len(), 4);
        assert_eq!(triples.get_with_col_val(3, 0).len(), 4);
        assert!(triples.has(Triple::new(0, 0, 3)));
        assert!(!triples.has(Triple::new(0, 0, 4)));
    }

    #[test]
    fn delete_updates_all_indices() {
        let mut triples = TripleCollection::new(3);
        let t = Triple::new(1, 2, 0);

        assert!(triples.delete(t));
        assert!(!triples.delete(t));

        assert!(!triples.has(t));
        assert!(!triples.get_with_row_col(1, 2).contains(&0));
        assert!(!triples.get_with_row_val(1, 0).contains(&2));
        assert!(!triples.get_with_col_val(2, 0).contains(&1));
        assert!(triples.is_consistent());
    }

    #[test]
    fn add_restores_deleted_triple() {
        let mut triples = TripleCollection::new(3);
        let t = Triple::new(0, 1, 2);
        triples.delete(t);

        assert!(triples.add(t));
        assert!(!triples.add(t));
        assert!(triples.has(t));
        assert!(triples.is_consistent());
    }

    #[test]
    fn replace_cell_returns_previous() {
        let mut triples = TripleCollection::new(4);
        let only_two: BTreeSet<usize> = [2].into_iter().collect();

        let previous = triples.replace_cell(3, 3, &only_two);
        assert_eq!(previous.len(), 4);
        assert_eq!(triples.row_col(3, 3), only_two);
        assert_eq!(triples.count_row_col(3, 3), 1);
        assert!(!triples.row_val(3, 0).contains(&3));
        assert!(triples.is_consistent());

        let back = triples.replace_cell(3, 3, &previous);
        assert_eq!(back, only_two);
        assert_eq!(triples.row_col(3, 3).len(), 4);
    }
}
