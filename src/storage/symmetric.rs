//! Symmetric storage

use super::{Layout, MatrixView, Storage, assert_index, check_index, require_square};
use crate::error::Result;
use crate::field::Scalar;
use std::any::Any;

/// Upper triangle of a symmetric matrix, packed row by row
///
/// `(i, j)` and `(j, i)` share one slot, so a write to either is visible
/// through both.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetricStorage<E> {
    n: usize,
    packed: Vec<E>,
}

impl<E: Scalar> SymmetricStorage<E> {
    /// Create an `rows x cols` symmetric storage filled with `zero`
    pub fn new(rows: usize, cols: usize, zero: E) -> Result<Self> {
        let n = require_square("Symmetric storage", rows, cols)?;
        Ok(Self {
            n,
            packed: vec![zero; n * (n + 1) / 2],
        })
    }

    #[inline]
    fn packed_index(&self, row: usize, col: usize) -> usize {
        let (i, j) = if row <= col { (row, col) } else { (col, row) };
        i * self.n - i * i.saturating_sub(1) / 2 + (j - i)
    }
}

impl<E: Scalar> MatrixView<E> for SymmetricStorage<E> {
    fn rows(&self) -> usize {
        self.n
    }

    fn cols(&self) -> usize {
        self.n
    }

    fn get(&self, row: usize, col: usize) -> E {
        assert_index(self.n, self.n, row, col);
        self.packed[self.packed_index(row, col)].clone()
    }
}

impl<E: Scalar> Storage<E> for SymmetricStorage<E> {
    fn layout(&self) -> Layout {
        Layout::Symmetric
    }

    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()> {
        check_index(self.n, self.n, row, col)?;
        let idx = self.packed_index(row, col);
        self.packed[idx] = value;
        Ok(())
    }

    fn stored_len(&self) -> usize {
        self.packed.len()
    }

    fn clone_box(&self) -> Box<dyn Storage<E>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_is_mirrored() {
        let mut s = SymmetricStorage::new(3, 3, 0).unwrap();
        s.set(2, 0, 7).unwrap();
        assert_eq!(s.get(0, 2), 7);
        assert_eq!(s.get(2, 0), 7);
        s.set(1, 2, 4).unwrap();
        assert_eq!(s.get(2, 1), 4);
        assert_eq!(s.stored_len(), 6);
    }
}
