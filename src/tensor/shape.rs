//! Shape type: dimensions of a tensor

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;

/// Most tensors have 4 or fewer dimensions, so we stack-allocate up to 4
pub(crate) const STACK_DIMS: usize = 4;

/// Row-major element strides
pub type Strides = SmallVec<[usize; STACK_DIMS]>;

/// Validated tensor dimensions
///
/// A shape has at least one dimension and every dimension is positive.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape(SmallVec<[usize; STACK_DIMS]>);

impl Shape {
    /// Validate `dims` as a tensor shape
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() {
            return Err(Error::invalid_argument(
                "shape",
                "a tensor needs at least one dimension",
            ));
        }
        if let Some(axis) = dims.iter().position(|&d| d == 0) {
            return Err(Error::invalid_argument(
                "shape",
                format!("dimension {} of {:?} is zero", axis, dims),
            ));
        }
        if dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)).is_none() {
            return Err(Error::invalid_argument(
                "shape",
                format!("{:?} overflows the element count", dims),
            ));
        }
        Ok(Self(dims.iter().copied().collect()))
    }

    /// View shape as a slice.
    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Compute contiguous strides (row-major order)
    pub fn strides(&self) -> Strides {
        let mut strides: Strides = SmallVec::with_capacity(self.ndim());
        let mut stride = 1usize;

        // From last dimension to first
        for &dim in self.0.iter().rev() {
            strides.push(stride);
            stride *= dim;
        }

        strides.reverse();
        strides
    }

    /// Flat offset of `index` under `strides`
    ///
    /// Fails with `InvalidArgument` when the index has the wrong rank and with
    /// `IndexOutOfBounds` when a component exceeds its dimension.
    pub(crate) fn offset(&self, strides: &[usize], index: &[usize]) -> Result<usize> {
        if index.len() != self.ndim() {
            return Err(Error::invalid_argument(
                "index",
                format!(
                    "expected {} indices for shape {:?}, got {}",
                    self.ndim(),
                    self,
                    index.len()
                ),
            ));
        }

        let mut flat = 0;
        for ((&i, &dim), &stride) in index.iter().zip(self.0.iter()).zip(strides) {
            if i >= dim {
                return Err(Error::IndexOutOfBounds {
                    index: i,
                    size: dim,
                });
            }
            flat += i * stride;
        }
        Ok(flat)
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<[usize]> for Shape {
    fn as_ref(&self) -> &[usize] {
        self.0.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides() {
        let shape = Shape::new(&[2, 3, 4]).unwrap();
        assert_eq!(shape.strides().as_slice(), &[12, 4, 1]);
        assert_eq!(shape.elem_count(), 24);
    }

    #[test]
    fn test_rejects_empty_and_zero_dims() {
        assert!(matches!(
            Shape::new(&[]),
            Err(Error::InvalidArgument { arg: "shape", .. })
        ));
        assert!(matches!(
            Shape::new(&[3, 0]),
            Err(Error::InvalidArgument { arg: "shape", .. })
        ));
    }

    #[test]
    fn test_offset() {
        let shape = Shape::new(&[2, 3]).unwrap();
        let strides = shape.strides();
        assert_eq!(shape.offset(&strides, &[1, 2]), Ok(5));
        assert_eq!(
            shape.offset(&strides, &[2, 0]),
            Err(Error::IndexOutOfBounds { index: 2, size: 2 })
        );
        assert!(matches!(
            shape.offset(&strides, &[1]),
            Err(Error::InvalidArgument { arg: "index", .. })
        ));
    }
}
