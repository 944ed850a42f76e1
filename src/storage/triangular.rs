//! Packed triangular storage

use super::{Layout, MatrixView, Storage, assert_index, check_index, require_square};
use crate::error::{Error, Result};
use crate::field::{Field, Scalar, Zero};
use std::any::Any;

/// One triangle of a square matrix, packed row by row
///
/// An upper storage keeps `i <= j`, a lower storage keeps `i >= j`. Both hold
/// `n * (n + 1) / 2` elements.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangularStorage<E> {
    n: usize,
    upper: bool,
    packed: Vec<E>,
    zero: Zero<E>,
}

impl<E: Scalar> TriangularStorage<E> {
    /// Create an `rows x cols` triangular storage filled with `zero`
    ///
    /// Fails with `NonSquare` if `rows != cols`.
    pub fn new(rows: usize, cols: usize, upper: bool, zero: E) -> Result<Self> {
        let n = require_square("Triangular storage", rows, cols)?;
        Ok(Self {
            n,
            upper,
            packed: vec![zero.clone(); n * (n + 1) / 2],
            zero: Zero::exact(zero),
        })
    }

    /// Decide implicit entries with `field`'s zero test instead of `==`
    pub fn with_field<F: Field<Elem = E>>(mut self, field: &F) -> Self {
        self.zero = Zero::of(field);
        self
    }

    /// Returns true for an upper-triangular storage
    pub fn is_upper(&self) -> bool {
        self.upper
    }

    #[inline]
    fn in_support(&self, row: usize, col: usize) -> bool {
        if self.upper { row <= col } else { row >= col }
    }

    #[inline]
    fn packed_index(&self, row: usize, col: usize) -> usize {
        if self.upper {
            // Rows 0..row hold n, n-1, ... elements
            row * self.n - row * row.saturating_sub(1) / 2 + (col - row)
        } else {
            row * (row + 1) / 2 + col
        }
    }
}

impl<E: Scalar> MatrixView<E> for TriangularStorage<E> {
    fn rows(&self) -> usize {
        self.n
    }

    fn cols(&self) -> usize {
        self.n
    }

    fn get(&self, row: usize, col: usize) -> E {
        assert_index(self.n, self.n, row, col);
        if self.in_support(row, col) {
            self.packed[self.packed_index(row, col)].clone()
        } else {
            self.zero.value().clone()
        }
    }
}

impl<E: Scalar> Storage<E> for TriangularStorage<E> {
    fn layout(&self) -> Layout {
        Layout::Triangular { upper: self.upper }
    }

    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()> {
        check_index(self.n, self.n, row, col)?;
        if self.in_support(row, col) {
            let idx = self.packed_index(row, col);
            self.packed[idx] = value;
        } else if !self.zero.matches(&value) {
            return Err(Error::shape_violation("Triangular", row, col));
        }
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

    fn fill(s: &mut TriangularStorage<i64>) {
        let n = s.rows();
        for i in 0..n {
            for j in 0..n {
                if s.in_support(i, j) {
                    s.set(i, j, (i * 10 + j) as i64 + 1).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_upper_packing_is_bijective() {
        let mut s = TriangularStorage::new(4, 4, true, 0).unwrap();
        fill(&mut s);
        assert_eq!(s.stored_len(), 10);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i <= j { (i * 10 + j) as i64 + 1 } else { 0 };
                assert_eq!(s.get(i, j), expected, "({i}, {j})");
            }
        }
    }

    #[test]
    fn test_lower_packing_is_bijective() {
        let mut s = TriangularStorage::new(4, 4, false, 0).unwrap();
        fill(&mut s);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i >= j { (i * 10 + j) as i64 + 1 } else { 0 };
                assert_eq!(s.get(i, j), expected, "({i}, {j})");
            }
        }
    }

    #[test]
    fn test_write_below_upper_triangle() {
        let mut s = TriangularStorage::new(2, 2, true, 0.0).unwrap();
        assert_eq!(
            s.set(1, 0, 3.0),
            Err(Error::shape_violation("Triangular", 1, 0))
        );
        assert!(s.set(1, 0, 0.0).is_ok());
        assert_eq!(s.get(1, 0), 0.0);
    }

    #[test]
    fn test_rejects_non_square() {
        assert!(matches!(
            TriangularStorage::new(3, 2, true, 0),
            Err(Error::NonSquare { .. })
        ));
    }
}
