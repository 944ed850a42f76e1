//! N-dimensional arrays
//!
//! Tensors are built by [`TensorProvider`](crate::provider::TensorProvider)s.
//! A [`Tensor`] is either dense (flat row-major buffer) or sparse (ordered map
//! of non-zero elements); both answer the same indexed reads and writes.
//! Rank-2 tensors can take part in matrix algebra as an
//! [`Operand`](crate::matrix::Operand).

mod dense;
mod shape;
mod sparse;

pub use dense::DenseTensor;
pub use shape::{Shape, Strides};
pub use sparse::SparseTensor;

use crate::error::{Error, Result};
use crate::field::{Field, Scalar, Zero};

/// Dense or sparse N-dimensional array
#[derive(Clone, Debug, PartialEq)]
pub enum Tensor<E> {
    Dense(DenseTensor<E>),
    Sparse(SparseTensor<E>),
}

impl<E: Scalar> Tensor<E> {
    pub fn shape(&self) -> &Shape {
        match self {
            Tensor::Dense(t) => t.shape(),
            Tensor::Sparse(t) => t.shape(),
        }
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.shape().ndim()
    }

    /// Total number of elements, stored or not
    pub fn len(&self) -> usize {
        self.shape().elem_count()
    }

    /// Always false: every dimension of a tensor is positive
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Tensor::Sparse(_))
    }

    /// Element at a full multi-index
    pub fn get(&self, index: &[usize]) -> Result<E> {
        match self {
            Tensor::Dense(t) => t.get(index),
            Tensor::Sparse(t) => t.get(index),
        }
    }

    pub fn set(&mut self, index: &[usize], value: E) -> Result<()> {
        match self {
            Tensor::Dense(t) => t.set(index, value),
            Tensor::Sparse(t) => t.set(index, value),
        }
    }

    /// Element at a flat row-major offset inside the tensor
    pub(crate) fn at_flat(&self, flat: usize) -> E {
        match self {
            Tensor::Dense(t) => t.as_slice()[flat].clone(),
            Tensor::Sparse(t) => t.at_flat(flat),
        }
    }

    /// Fraction of elements that are not the field's zero
    pub fn density<F: Field<Elem = E>>(&self, field: &F) -> f64 {
        let nonzero = match self {
            Tensor::Dense(t) => t.as_slice().iter().filter(|v| !field.is_zero(v)).count(),
            Tensor::Sparse(t) => t.iter().filter(|(_, v)| !field.is_zero(v)).count(),
        };
        nonzero as f64 / self.len() as f64
    }

    /// Dense copy of every element
    pub fn to_dense(&self) -> DenseTensor<E> {
        match self {
            Tensor::Dense(t) => t.clone(),
            Tensor::Sparse(t) => t.to_dense(),
        }
    }

    /// Same elements under a new shape with the same element count
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor<E>> {
        let new_shape = Shape::new(shape)?;
        if new_shape.elem_count() != self.len() {
            return Err(Error::invalid_argument(
                "shape",
                format!(
                    "cannot reshape {:?} ({} elements) into {:?}",
                    self.shape(),
                    self.len(),
                    new_shape
                ),
            ));
        }
        Ok(match self {
            Tensor::Dense(t) => {
                Tensor::Dense(DenseTensor::from_shape(new_shape, t.as_slice().to_vec()))
            }
            Tensor::Sparse(t) => {
                // Row-major flat offsets are shape independent
                let mut out = SparseTensor::from_shape(new_shape, t.zero_rule().clone());
                for (flat, v) in t.iter() {
                    out.set_flat(flat, v.clone());
                }
                Tensor::Sparse(out)
            }
        })
    }

    /// Element-wise `self + other`
    ///
    /// Sparse plus sparse stays sparse; any dense operand gives a dense result.
    pub fn add<F: Field<Elem = E>>(&self, field: &F, other: &Tensor<E>) -> Result<Tensor<E>> {
        self.zip_with("add", other, field, |a, b| field.add(a, b))
    }

    /// Element-wise `self - other`
    pub fn sub<F: Field<Elem = E>>(&self, field: &F, other: &Tensor<E>) -> Result<Tensor<E>> {
        self.zip_with("sub", other, field, |a, b| field.sub(a, b))
    }

    /// Multiply every element by `factor`
    pub fn scale<F: Field<Elem = E>>(&self, field: &F, factor: &E) -> Tensor<E> {
        match self {
            Tensor::Dense(t) => {
                let data = t.as_slice().iter().map(|v| field.mul(factor, v)).collect();
                Tensor::Dense(DenseTensor::from_shape(t.shape().clone(), data))
            }
            Tensor::Sparse(t) => {
                let mut out = SparseTensor::from_shape(t.shape().clone(), Zero::of(field));
                for (flat, v) in t.iter() {
                    let scaled = field.mul(factor, v);
                    if !field.is_zero(&scaled) {
                        out.set_flat(flat, scaled);
                    }
                }
                Tensor::Sparse(out)
            }
        }
    }

    /// Sum of all elements, seeded at the field's zero
    pub fn sum<F: Field<Elem = E>>(&self, field: &F) -> E {
        match self {
            Tensor::Dense(t) => t
                .as_slice()
                .iter()
                .fold(field.zero(), |acc, v| field.add(&acc, v)),
            Tensor::Sparse(t) => t.iter().fold(field.zero(), |acc, (_, v)| field.add(&acc, v)),
        }
    }

    fn zip_with<F: Field<Elem = E>>(
        &self,
        op: &'static str,
        other: &Tensor<E>,
        field: &F,
        f: impl Fn(&E, &E) -> E,
    ) -> Result<Tensor<E>> {
        if self.shape() != other.shape() {
            return Err(Error::invalid_argument(
                "other",
                format!(
                    "{} needs equal shapes, got {:?} and {:?}",
                    op,
                    self.shape(),
                    other.shape()
                ),
            ));
        }

        if let (Tensor::Sparse(a), Tensor::Sparse(b)) = (self, other) {
            let zero = field.zero();
            let mut out = SparseTensor::from_shape(a.shape().clone(), Zero::of(field));
            for (flat, v) in a.iter() {
                out.set_flat(flat, f(v, &zero));
            }
            for (flat, v) in b.iter() {
                let lhs = a.at_flat(flat);
                out.set_flat(flat, f(&lhs, v));
            }
            return Ok(Tensor::Sparse(out));
        }

        let data = (0..self.len())
            .map(|i| f(&self.at_flat(i), &other.at_flat(i)))
            .collect();
        Ok(Tensor::Dense(DenseTensor::from_shape(
            self.shape().clone(),
            data,
        )))
    }
}

impl<E: Scalar> From<DenseTensor<E>> for Tensor<E> {
    fn from(t: DenseTensor<E>) -> Self {
        Tensor::Dense(t)
    }
}

impl<E: Scalar> From<SparseTensor<E>> for Tensor<E> {
    fn from(t: SparseTensor<E>) -> Self {
        Tensor::Sparse(t)
    }
}
