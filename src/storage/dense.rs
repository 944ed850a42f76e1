//! Dense row-major storage

use super::{Layout, MatrixView, Storage, assert_index, check_index};
use crate::error::{Error, Result};
use crate::field::Scalar;
use std::any::Any;

/// Every element in a row-major `Vec`
#[derive(Clone, Debug, PartialEq)]
pub struct DenseStorage<E> {
    rows: usize,
    cols: usize,
    data: Vec<E>,
}

impl<E: Scalar> DenseStorage<E> {
    /// Create a `rows x cols` storage filled with `fill`
    pub fn new(rows: usize, cols: usize, fill: E) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }

    /// Wrap row-major data
    ///
    /// Fails with `InvalidArgument` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<E>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "expected {} elements for {}x{}, got {}",
                    rows * cols,
                    rows,
                    cols,
                    data.len()
                ),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Wrap row-major data whose length is already known to match
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<E>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Row-major elements
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        &self.data
    }

    /// Decompose into `(rows, cols, data)`
    pub fn into_parts(self) -> (usize, usize, Vec<E>) {
        (self.rows, self.cols, self.data)
    }
}

impl<E: Scalar> MatrixView<E> for DenseStorage<E> {
    #[inline]
    fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> E {
        assert_index(self.rows, self.cols, row, col);
        self.data[row * self.cols + col].clone()
    }

    fn to_row_major(&self) -> Vec<E> {
        self.data.clone()
    }
}

impl<E: Scalar> Storage<E> for DenseStorage<E> {
    fn layout(&self) -> Layout {
        Layout::Dense
    }

    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()> {
        check_index(self.rows, self.cols, row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    fn stored_len(&self) -> usize {
        self.data.len()
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
    fn test_row_major_layout() {
        let s = DenseStorage::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(s.get(0, 2), 3);
        assert_eq!(s.get(1, 0), 4);
        assert_eq!(s.stored_len(), 6);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            DenseStorage::from_vec(2, 2, vec![1, 2, 3]),
            Err(Error::InvalidArgument { arg: "data", .. })
        ));
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut s = DenseStorage::new(2, 2, 0);
        s.set(1, 1, 9).unwrap();
        assert_eq!(s.get(1, 1), 9);
        assert!(matches!(
            s.set(2, 0, 1),
            Err(Error::IndexOutOfBounds { index: 2, size: 2 })
        ));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds_panics() {
        let s = DenseStorage::new(1, 1, 0);
        s.get(0, 1);
    }
}
