//! Sparse tensor construction with a dense redirect

use super::{Provider, TensorProvider, registry};
use crate::error::{Error, Result};
use crate::field::{Field, Zero};
use crate::selector::SPARSITY_THRESHOLD;
use crate::tensor::{Shape, SparseTensor, Tensor};
use log::debug;
use std::sync::Arc;

/// Builds [`SparseTensor`]s, handing dense data to a dense provider
///
/// `create` measures the density of its input: at or above
/// [`SPARSITY_THRESHOLD`] the data is not worth a sparse representation and
/// construction is redirected to the dense delegate. `ones` is always dense.
///
/// Not registered by default; callers opt in with
/// [`register_tensor`](super::registry::register_tensor).
pub struct SparseTensorProvider<F: Field> {
    dense: Arc<dyn TensorProvider<F>>,
}

impl<F: Field> SparseTensorProvider<F> {
    /// Redirect dense data to the best dense provider registered for `F`
    ///
    /// The delegate is bound here; later registrations do not change it.
    pub fn new() -> Self {
        Self::with_dense(registry::dense_tensor::<F>())
    }

    /// Redirect dense data to `dense`
    pub fn with_dense(dense: Arc<dyn TensorProvider<F>>) -> Self {
        Self { dense }
    }

    /// Name of the provider dense data is redirected to
    pub fn dense_provider(&self) -> &'static str {
        self.dense.name()
    }
}

impl<F: Field> Default for SparseTensorProvider<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> Provider for SparseTensorProvider<F> {
    fn name(&self) -> &'static str {
        "sparse-tensor"
    }

    fn priority(&self) -> u8 {
        60
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl<F: Field> TensorProvider<F> for SparseTensorProvider<F> {
    fn zeros(&self, field: &F, shape: &[usize]) -> Result<Tensor<F::Elem>> {
        Ok(SparseTensor::from_shape(Shape::new(shape)?, Zero::of(field)).into())
    }

    fn ones(&self, field: &F, shape: &[usize]) -> Result<Tensor<F::Elem>> {
        self.dense.ones(field, shape)
    }

    fn create(&self, field: &F, data: Vec<F::Elem>, shape: &[usize]) -> Result<Tensor<F::Elem>> {
        let dims = Shape::new(shape)?;
        if data.len() != dims.elem_count() {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "expected {} elements for shape {:?}, got {}",
                    dims.elem_count(),
                    dims,
                    data.len()
                ),
            ));
        }

        let nonzero = data.iter().filter(|v| !field.is_zero(v)).count();
        let density = nonzero as f64 / data.len() as f64;
        if density >= SPARSITY_THRESHOLD {
            debug!(
                "sparse-tensor: density {:.3} >= {}, redirecting {:?} to '{}'",
                density,
                SPARSITY_THRESHOLD,
                dims,
                self.dense.name()
            );
            return self.dense.create(field, data, shape);
        }

        Ok(SparseTensor::from_flat(dims, data, Zero::of(field)).into())
    }

    fn builds_sparse(&self) -> bool {
        true
    }
}
