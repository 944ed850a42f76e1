//! Banded storage

use super::{Layout, MatrixView, Storage, assert_index, check_index};
use crate::error::{Error, Result};
use crate::field::{Field, Scalar, Zero};
use std::any::Any;

/// Fixed number of sub- and super-diagonals
///
/// Row `i` keeps columns `i - lower ..= i + upper` in a row of width
/// `lower + upper + 1`; slots that fall outside the matrix stay zero.
/// Banded storages are never chosen automatically.
#[derive(Clone, Debug, PartialEq)]
pub struct BandedStorage<E> {
    rows: usize,
    cols: usize,
    lower: usize,
    upper: usize,
    band: Vec<E>,
    zero: Zero<E>,
}

impl<E: Scalar> BandedStorage<E> {
    /// Create a `rows x cols` storage with `lower` sub- and `upper`
    /// super-diagonals
    pub fn new(rows: usize, cols: usize, lower: usize, upper: usize, zero: E) -> Self {
        let width = lower + upper + 1;
        Self {
            rows,
            cols,
            lower,
            upper,
            band: vec![zero.clone(); rows * width],
            zero: Zero::exact(zero),
        }
    }

    /// Decide implicit entries with `field`'s zero test instead of `==`
    pub fn with_field<F: Field<Elem = E>>(mut self, field: &F) -> Self {
        self.zero = Zero::of(field);
        self
    }

    /// Number of `(sub, super)` diagonals
    pub fn bandwidth(&self) -> (usize, usize) {
        (self.lower, self.upper)
    }

    #[inline]
    fn band_index(&self, row: usize, col: usize) -> Option<usize> {
        if col + self.lower < row || col > row + self.upper {
            return None;
        }
        let width = self.lower + self.upper + 1;
        Some(row * width + (col + self.lower - row))
    }
}

impl<E: Scalar> MatrixView<E> for BandedStorage<E> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, row: usize, col: usize) -> E {
        assert_index(self.rows, self.cols, row, col);
        match self.band_index(row, col) {
            Some(idx) => self.band[idx].clone(),
            None => self.zero.value().clone(),
        }
    }
}

impl<E: Scalar> Storage<E> for BandedStorage<E> {
    fn layout(&self) -> Layout {
        Layout::Banded {
            lower: self.lower,
            upper: self.upper,
        }
    }

    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()> {
        check_index(self.rows, self.cols, row, col)?;
        match self.band_index(row, col) {
            Some(idx) => self.band[idx] = value,
            None if !self.zero.matches(&value) => {
                return Err(Error::shape_violation("Banded", row, col));
            }
            None => {}
        }
        Ok(())
    }

    fn stored_len(&self) -> usize {
        self.band.len()
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
    fn test_band_support() {
        let mut s = BandedStorage::new(4, 4, 1, 2, 0);
        s.set(3, 2, 1).unwrap();
        s.set(0, 2, 2).unwrap();
        assert_eq!(s.get(3, 2), 1);
        assert_eq!(s.get(0, 2), 2);
        assert_eq!(s.get(3, 0), 0);
        assert_eq!(
            s.set(0, 3, 5),
            Err(Error::shape_violation("Banded", 0, 3))
        );
        assert_eq!(
            s.set(2, 0, 5),
            Err(Error::shape_violation("Banded", 2, 0))
        );
    }

    #[test]
    fn test_rectangular() {
        let mut s = BandedStorage::new(2, 5, 0, 1, 0);
        s.set(1, 2, 3).unwrap();
        assert_eq!(s.to_row_major(), vec![0, 0, 0, 0, 0, 0, 0, 3, 0, 0]);
    }
}
