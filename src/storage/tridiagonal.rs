//! Tridiagonal storage

use super::{Layout, MatrixView, Storage, assert_index, check_index, require_square};
use crate::error::{Error, Result};
use crate::field::{Field, Scalar, Zero};
use std::any::Any;

/// Sub-diagonal, main diagonal and super-diagonal of a square matrix
#[derive(Clone, Debug, PartialEq)]
pub struct TridiagonalStorage<E> {
    lower: Vec<E>,
    diag: Vec<E>,
    upper: Vec<E>,
    zero: Zero<E>,
}

impl<E: Scalar> TridiagonalStorage<E> {
    /// Create an `rows x cols` tridiagonal storage filled with `zero`
    pub fn new(rows: usize, cols: usize, zero: E) -> Result<Self> {
        let n = require_square("Tridiagonal storage", rows, cols)?;
        let off = n.saturating_sub(1);
        Ok(Self {
            lower: vec![zero.clone(); off],
            diag: vec![zero.clone(); n],
            upper: vec![zero.clone(); off],
            zero: Zero::exact(zero),
        })
    }

    /// Decide implicit entries with `field`'s zero test instead of `==`
    pub fn with_field<F: Field<Elem = E>>(mut self, field: &F) -> Self {
        self.zero = Zero::of(field);
        self
    }

    fn slot(&self, row: usize, col: usize) -> Option<(&Vec<E>, usize)> {
        if row == col {
            Some((&self.diag, row))
        } else if row == col + 1 {
            Some((&self.lower, col))
        } else if col == row + 1 {
            Some((&self.upper, row))
        } else {
            None
        }
    }
}

impl<E: Scalar> MatrixView<E> for TridiagonalStorage<E> {
    fn rows(&self) -> usize {
        self.diag.len()
    }

    fn cols(&self) -> usize {
        self.diag.len()
    }

    fn get(&self, row: usize, col: usize) -> E {
        let n = self.diag.len();
        assert_index(n, n, row, col);
        match self.slot(row, col) {
            Some((band, k)) => band[k].clone(),
            None => self.zero.value().clone(),
        }
    }
}

impl<E: Scalar> Storage<E> for TridiagonalStorage<E> {
    fn layout(&self) -> Layout {
        Layout::Tridiagonal
    }

    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()> {
        let n = self.diag.len();
        check_index(n, n, row, col)?;
        if row == col {
            self.diag[row] = value;
        } else if row == col + 1 {
            self.lower[col] = value;
        } else if col == row + 1 {
            self.upper[row] = value;
        } else if !self.zero.matches(&value) {
            return Err(Error::shape_violation("Tridiagonal", row, col));
        }
        Ok(())
    }

    fn stored_len(&self) -> usize {
        self.lower.len() + self.diag.len() + self.upper.len()
    }

    fn clone_box(&self) -> Box<dyn Storage<E>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
