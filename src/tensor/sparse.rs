//! Tensor storing only its non-zero elements

use super::dense::DenseTensor;
use super::shape::{Shape, Strides};
use crate::error::Result;
use crate::field::{Field, Scalar, Zero};
use std::collections::BTreeMap;

/// Ordered map from flat row-major offset to value
///
/// Writing the zero removes the entry, so `nnz` counts non-zero elements.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseTensor<E> {
    shape: Shape,
    strides: Strides,
    entries: BTreeMap<usize, E>,
    zero: Zero<E>,
}

impl<E: Scalar> SparseTensor<E> {
    /// Empty (all-zero) tensor of `shape`
    pub fn new(shape: &[usize], zero: E) -> Result<Self> {
        Ok(Self::from_shape(Shape::new(shape)?, Zero::exact(zero)))
    }

    /// Decide implicit elements with `field`'s zero test instead of `==`
    ///
    /// Stored elements that are zero in `field` are dropped.
    pub fn with_field<F: Field<Elem = E>>(mut self, field: &F) -> Self {
        self.zero = Zero::of(field);
        let zero = &self.zero;
        self.entries.retain(|_, v| !zero.matches(v));
        self
    }

    pub(crate) fn from_shape(shape: Shape, zero: Zero<E>) -> Self {
        let strides = shape.strides();
        Self {
            shape,
            strides,
            entries: BTreeMap::new(),
            zero,
        }
    }

    /// Sparse copy of row-major `data`, skipping zeros
    pub(crate) fn from_flat(shape: Shape, data: Vec<E>, zero: Zero<E>) -> Self {
        let mut t = Self::from_shape(shape, zero);
        for (flat, value) in data.into_iter().enumerate() {
            if !t.zero.matches(&value) {
                t.entries.insert(flat, value);
            }
        }
        t
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn zero(&self) -> &E {
        self.zero.value()
    }

    pub(crate) fn zero_rule(&self) -> &Zero<E> {
        &self.zero
    }

    /// Stored elements by ascending flat offset
    pub fn iter(&self) -> impl Iterator<Item = (usize, &E)> {
        self.entries.iter().map(|(&k, v)| (k, v))
    }

    pub fn get(&self, index: &[usize]) -> Result<E> {
        let flat = self.shape.offset(&self.strides, index)?;
        Ok(self.at_flat(flat))
    }

    pub fn set(&mut self, index: &[usize], value: E) -> Result<()> {
        let flat = self.shape.offset(&self.strides, index)?;
        self.set_flat(flat, value);
        Ok(())
    }

    pub(crate) fn at_flat(&self, flat: usize) -> E {
        self.entries
            .get(&flat)
            .cloned()
            .unwrap_or_else(|| self.zero.value().clone())
    }

    pub(crate) fn set_flat(&mut self, flat: usize, value: E) {
        if self.zero.matches(&value) {
            self.entries.remove(&flat);
        } else {
            self.entries.insert(flat, value);
        }
    }

    /// Materialize every element
    pub fn to_dense(&self) -> DenseTensor<E> {
        let mut data = vec![self.zero.value().clone(); self.shape.elem_count()];
        for (&flat, value) in &self.entries {
            data[flat] = value.clone();
        }
        DenseTensor::from_shape(self.shape.clone(), data)
    }
}
