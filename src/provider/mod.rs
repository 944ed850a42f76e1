//! Compute providers: pluggable strategies behind the matrix facade
//!
//! A provider implements the numeric work of [`Matrix`](crate::matrix::Matrix)
//! and [`Tensor`] operations for one field and one compute backend. Each one
//! declares its capabilities (priority, GPU and parallel support) and an
//! availability flag fixed at construction. The [`registry`] picks the
//! highest-priority available provider per field; unavailable providers are
//! skipped silently.
//!
//! | Provider | Field | Priority | Availability |
//! |----------|-------|----------|--------------|
//! | [`CpuNaiveProvider`] | any | 50 | always |
//! | [`CpuSimdProvider`] | [`Reals`](crate::field::Reals) | 90 | AVX-512 / AVX2+FMA / NEON detected |
//! | `NativeCpuProvider` | `Reals` (tensors) | 80 | native library loaded |
//! | `NativeCudaProvider` | `Reals` (tensors) | 100 | native library reports CUDA devices |
//! | [`SparseTensorProvider`] | any (tensors) | 60 | always; constructed explicitly |

mod cpu;
pub mod kernels;
#[cfg(feature = "native")]
pub mod native;
pub mod registry;
#[cfg(feature = "simd")]
mod simd;
mod sparse;

pub use cpu::CpuNaiveProvider;
pub use kernels::{DoubleKernels, ScalarKernels};
pub use registry::ProviderRegistry;
#[cfg(feature = "simd")]
pub use simd::CpuSimdProvider;
pub use sparse::SparseTensorProvider;

use crate::algorithm;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::storage::{DenseStorage, Storage};
use crate::tensor::Tensor;

/// Priority of the baseline CPU implementation
pub const DEFAULT_PRIORITY: u8 = 50;

/// Device an execution context is bound to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Cpu,
    Gpu {
        /// Device index within the backend
        ordinal: usize,
    },
}

/// Resources granted by a provider to a caller that asked for them directly
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Name of the granting provider
    pub provider: &'static str,
    pub device: DeviceKind,
}

/// Capability metadata shared by every provider
pub trait Provider: Send + Sync {
    /// Stable provider name
    fn name(&self) -> &'static str;

    /// Selection priority in `0..=100`, higher preferred
    fn priority(&self) -> u8 {
        DEFAULT_PRIORITY
    }

    fn supports_gpu(&self) -> bool {
        false
    }

    fn supports_parallel_ops(&self) -> bool {
        false
    }

    /// Whether the backend is usable, fixed at construction
    fn is_available(&self) -> bool;

    /// Explicitly request this provider's execution resources
    ///
    /// Unlike selection through the registry, this fails with
    /// [`Error::BackendUnavailable`] when the provider is not available.
    fn create_context(&self) -> Result<ExecutionContext> {
        if !self.is_available() {
            return Err(Error::backend_unavailable(
                self.name(),
                "backend was not detected at construction",
            ));
        }
        let device = if self.supports_gpu() {
            DeviceKind::Gpu { ordinal: 0 }
        } else {
            DeviceKind::Cpu
        };
        Ok(ExecutionContext {
            provider: self.name(),
            device,
        })
    }
}

/// Materialize an algorithm result in the field's dense storage
pub(crate) fn materialize<F: Field>(
    field: &F,
    out: DenseStorage<F::Elem>,
) -> Box<dyn Storage<F::Elem>> {
    let (rows, cols, data) = out.into_parts();
    field.dense_storage(rows, cols, data)
}

/// Matrix algebra over the field `F`
///
/// Every operation has a default that runs the reference algorithm and
/// materializes the result through [`Field::dense_storage`]. Implementations
/// override the operations they accelerate.
pub trait LinearAlgebraProvider<F: Field>: Provider {
    fn add(
        &self,
        field: &F,
        a: &dyn Storage<F::Elem>,
        b: &dyn Storage<F::Elem>,
    ) -> Result<Box<dyn Storage<F::Elem>>> {
        Ok(materialize(field, algorithm::add(field, a, b)?))
    }

    fn sub(
        &self,
        field: &F,
        a: &dyn Storage<F::Elem>,
        b: &dyn Storage<F::Elem>,
    ) -> Result<Box<dyn Storage<F::Elem>>> {
        Ok(materialize(field, algorithm::sub(field, a, b)?))
    }

    fn multiply(
        &self,
        field: &F,
        a: &dyn Storage<F::Elem>,
        b: &dyn Storage<F::Elem>,
    ) -> Result<Box<dyn Storage<F::Elem>>> {
        Ok(materialize(field, algorithm::matmul(field, a, b)?))
    }

    fn multiply_vector(
        &self,
        field: &F,
        a: &dyn Storage<F::Elem>,
        x: &[F::Elem],
    ) -> Result<Vec<F::Elem>> {
        algorithm::matvec(field, a, x)
    }

    fn transpose(&self, field: &F, a: &dyn Storage<F::Elem>) -> Box<dyn Storage<F::Elem>> {
        materialize(field, algorithm::transpose(a))
    }

    fn scale(
        &self,
        field: &F,
        factor: &F::Elem,
        a: &dyn Storage<F::Elem>,
    ) -> Box<dyn Storage<F::Elem>> {
        materialize(field, algorithm::scale(field, factor, a))
    }

    fn determinant(&self, field: &F, a: &dyn Storage<F::Elem>) -> Result<F::Elem> {
        algorithm::determinant(field, a)
    }

    fn inverse(&self, field: &F, a: &dyn Storage<F::Elem>) -> Result<Box<dyn Storage<F::Elem>>> {
        Ok(materialize(field, algorithm::inverse(field, a)?))
    }

    fn solve(
        &self,
        field: &F,
        a: &dyn Storage<F::Elem>,
        b: &dyn Storage<F::Elem>,
    ) -> Result<Box<dyn Storage<F::Elem>>> {
        Ok(materialize(field, algorithm::solve(field, a, b)?))
    }

    /// Primitive f64 kernels for [`RealMatrix`](crate::matrix::RealMatrix)
    fn double_kernels(&self) -> Option<&dyn DoubleKernels> {
        None
    }
}

/// N-dimensional array construction over the field `F`
pub trait TensorProvider<F: Field>: Provider {
    /// Tensor of `shape` filled with the field's zero
    fn zeros(&self, field: &F, shape: &[usize]) -> Result<Tensor<F::Elem>>;

    /// Tensor of `shape` filled with the field's one
    fn ones(&self, field: &F, shape: &[usize]) -> Result<Tensor<F::Elem>>;

    /// Tensor of `shape` holding row-major `data`
    fn create(&self, field: &F, data: Vec<F::Elem>, shape: &[usize]) -> Result<Tensor<F::Elem>>;

    /// Whether `create` may return sparse tensors
    ///
    /// Such providers are never chosen as a dense delegate.
    fn builds_sparse(&self) -> bool {
        false
    }
}
