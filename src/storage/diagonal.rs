//! Diagonal storage

use super::{Layout, MatrixView, Storage, assert_index, check_index, require_square};
use crate::error::{Error, Result};
use crate::field::{Field, Scalar, Zero};
use std::any::Any;

/// Main diagonal of a square matrix
#[derive(Clone, Debug, PartialEq)]
pub struct DiagonalStorage<E> {
    diag: Vec<E>,
    zero: Zero<E>,
}

impl<E: Scalar> DiagonalStorage<E> {
    /// Create a `rows x cols` diagonal storage filled with `zero`
    ///
    /// Fails with `NonSquare` if `rows != cols`.
    pub fn new(rows: usize, cols: usize, zero: E) -> Result<Self> {
        let n = require_square("Diagonal storage", rows, cols)?;
        Ok(Self {
            diag: vec![zero.clone(); n],
            zero: Zero::exact(zero),
        })
    }

    /// Build from the diagonal entries
    pub fn from_diagonal(diag: Vec<E>, zero: E) -> Self {
        Self {
            diag,
            zero: Zero::exact(zero),
        }
    }

    /// Decide implicit entries with `field`'s zero test instead of `==`
    pub fn with_field<F: Field<Elem = E>>(mut self, field: &F) -> Self {
        self.zero = Zero::of(field);
        self
    }

    /// Diagonal entries
    pub fn diagonal(&self) -> &[E] {
        &self.diag
    }
}

impl<E: Scalar> MatrixView<E> for DiagonalStorage<E> {
    fn rows(&self) -> usize {
        self.diag.len()
    }

    fn cols(&self) -> usize {
        self.diag.len()
    }

    fn get(&self, row: usize, col: usize) -> E {
        let n = self.diag.len();
        assert_index(n, n, row, col);
        if row == col {
            self.diag[row].clone()
        } else {
            self.zero.value().clone()
        }
    }
}

impl<E: Scalar> Storage<E> for DiagonalStorage<E> {
    fn layout(&self) -> Layout {
        Layout::Diagonal
    }

    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()> {
        let n = self.diag.len();
        check_index(n, n, row, col)?;
        if row == col {
            self.diag[row] = value;
        } else if !self.zero.matches(&value) {
            return Err(Error::shape_violation("Diagonal", row, col));
        }
        Ok(())
    }

    fn stored_len(&self) -> usize {
        self.diag.len()
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
    fn test_rejects_non_square() {
        assert_eq!(
            DiagonalStorage::new(2, 3, 0),
            Err(Error::non_square("Diagonal storage", 2, 3))
        );
    }

    #[test]
    fn test_off_diagonal_write_is_violation() {
        let mut s = DiagonalStorage::new(3, 3, 0).unwrap();
        s.set(1, 1, 5).unwrap();
        assert_eq!(s.get(1, 1), 5);
        assert_eq!(s.get(1, 0), 0);
        assert_eq!(
            s.set(0, 2, 1),
            Err(Error::shape_violation("Diagonal", 0, 2))
        );
        // Writing zero off the diagonal is a no-op
        assert!(s.set(0, 2, 0).is_ok());
    }
}
