//! Contiguous row-major tensor

use super::shape::{Shape, Strides};
use crate::error::{Error, Result};
use crate::field::Scalar;

/// Tensor holding every element in a flat row-major buffer
#[derive(Clone, Debug, PartialEq)]
pub struct DenseTensor<E> {
    shape: Shape,
    strides: Strides,
    data: Vec<E>,
}

impl<E: Scalar> DenseTensor<E> {
    /// Wrap row-major `data` of the given shape
    pub fn from_vec(data: Vec<E>, shape: &[usize]) -> Result<Self> {
        let shape = Shape::new(shape)?;
        if data.len() != shape.elem_count() {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "expected {} elements for shape {:?}, got {}",
                    shape.elem_count(),
                    shape,
                    data.len()
                ),
            ));
        }
        Ok(Self::from_shape(shape, data))
    }

    /// Tensor of `shape` with every element set to `value`
    pub fn filled(shape: &[usize], value: E) -> Result<Self> {
        let shape = Shape::new(shape)?;
        let data = vec![value; shape.elem_count()];
        Ok(Self::from_shape(shape, data))
    }

    pub(crate) fn from_shape(shape: Shape, data: Vec<E>) -> Self {
        debug_assert_eq!(data.len(), shape.elem_count());
        let strides = shape.strides();
        Self {
            shape,
            strides,
            data,
        }
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Elements in row-major order
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<E> {
        self.data
    }

    pub fn get(&self, index: &[usize]) -> Result<E> {
        let flat = self.shape.offset(&self.strides, index)?;
        Ok(self.data[flat].clone())
    }

    pub fn set(&mut self, index: &[usize], value: E) -> Result<()> {
        let flat = self.shape.offset(&self.strides, index)?;
        self.data[flat] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_length() {
        let t = DenseTensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        assert_eq!(t.get(&[1, 0]), Ok(4));
        assert!(matches!(
            DenseTensor::from_vec(vec![1, 2, 3], &[2, 2]),
            Err(Error::InvalidArgument { arg: "data", .. })
        ));
    }

    #[test]
    fn test_set_and_get_rank3() {
        let mut t = DenseTensor::filled(&[2, 2, 2], 0i64).unwrap();
        t.set(&[1, 0, 1], 9).unwrap();
        assert_eq!(t.get(&[1, 0, 1]), Ok(9));
        assert_eq!(t.as_slice()[5], 9);
    }
}
