//! Sparse storage backed by an ordered map

use super::{Layout, MatrixView, Storage, assert_index, check_index};
use crate::error::Result;
use crate::field::{Field, Scalar, Zero};
use std::any::Any;
use std::collections::BTreeMap;

/// Non-zero elements keyed by `(row, col)`
///
/// Keys are ordered row-major, so iteration visits entries in the same order
/// as a dense scan would. Writing the zero removes the entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseStorage<E> {
    rows: usize,
    cols: usize,
    entries: BTreeMap<(usize, usize), E>,
    zero: Zero<E>,
}

impl<E: Scalar> SparseStorage<E> {
    /// Create an empty `rows x cols` storage
    pub fn new(rows: usize, cols: usize, zero: E) -> Self {
        Self {
            rows,
            cols,
            entries: BTreeMap::new(),
            zero: Zero::exact(zero),
        }
    }

    /// Decide implicit entries with `field`'s zero test instead of `==`
    pub fn with_field<F: Field<Elem = E>>(mut self, field: &F) -> Self {
        self.zero = Zero::of(field);
        self
    }

    /// Sparse copy of row-major `data`, keeping entries `zero` does not match
    pub(crate) fn from_row_major(rows: usize, cols: usize, data: Vec<E>, zero: Zero<E>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        let entries = data
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !zero.matches(v))
            .map(|(k, v)| ((k / cols, k % cols), v))
            .collect();
        Self {
            rows,
            cols,
            entries,
            zero,
        }
    }

    /// Number of stored (non-zero) entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Iterate stored entries in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &E)> {
        self.entries.iter().map(|(&(i, j), v)| (i, j, v))
    }

    /// Iterate the stored entries of one row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, &E)> {
        self.entries
            .range((row, 0)..(row + 1, 0))
            .map(|(&(_, j), v)| (j, v))
    }

    /// The zero returned for absent entries
    #[inline]
    pub fn zero(&self) -> &E {
        self.zero.value()
    }
}

impl<E: Scalar> MatrixView<E> for SparseStorage<E> {
    #[inline]
    fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, row: usize, col: usize) -> E {
        assert_index(self.rows, self.cols, row, col);
        self.entries
            .get(&(row, col))
            .cloned()
            .unwrap_or_else(|| self.zero.value().clone())
    }
}

impl<E: Scalar> Storage<E> for SparseStorage<E> {
    fn layout(&self) -> Layout {
        Layout::Sparse
    }

    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()> {
        check_index(self.rows, self.cols, row, col)?;
        if self.zero.matches(&value) {
            self.entries.remove(&(row, col));
        } else {
            self.entries.insert((row, col), value);
        }
        Ok(())
    }

    fn stored_len(&self) -> usize {
        self.entries.len()
    }

    fn clone_box(&self) -> Box<dyn Storage<E>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
