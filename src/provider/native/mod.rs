//! Native/GPU tensor providers backed by a dynamically loaded runtime
//!
//! Both providers route tensor `zeros`, `ones` and `create` through the
//! [`NativeRuntime`] into 64-byte aligned [`DirectBuffer`]s and convert the
//! result back into a [`Tensor`]. When the runtime is absent, or a call into
//! it fails, the call is served by the CPU-naive provider instead; only
//! malformed input is reported.

mod cpu;
mod cuda;
pub mod runtime;

pub use cpu::NativeCpuProvider;
pub use cuda::NativeCudaProvider;
pub use runtime::NativeRuntime;

use super::{CpuNaiveProvider, TensorProvider};
use crate::error::{Error, Result};
use crate::field::Reals;
use crate::storage::DirectBuffer;
use crate::tensor::{DenseTensor, Shape, Tensor};
use log::warn;
use std::sync::Arc;

/// Tensor construction shared by the native providers
#[derive(Clone, Debug)]
struct NativeTensors {
    provider: &'static str,
    runtime: Option<Arc<NativeRuntime>>,
    fallback: CpuNaiveProvider,
}

impl NativeTensors {
    fn new(provider: &'static str, runtime: Option<Arc<NativeRuntime>>) -> Self {
        Self {
            provider,
            runtime,
            fallback: CpuNaiveProvider::new(),
        }
    }

    /// Run `native` on the runtime, degrading to `fallback` on backend failure
    fn route(
        &self,
        native: impl FnOnce(&NativeRuntime) -> Result<Tensor<f64>>,
        fallback: impl FnOnce(&CpuNaiveProvider) -> Result<Tensor<f64>>,
    ) -> Result<Tensor<f64>> {
        let Some(runtime) = self.runtime.as_deref() else {
            return fallback(&self.fallback);
        };
        match native(runtime) {
            Err(Error::Backend(reason)) => {
                warn!(
                    "{}: native call failed ({}), using cpu-naive",
                    self.provider, reason
                );
                fallback(&self.fallback)
            }
            other => other,
        }
    }

    fn filled(&self, shape: &[usize], value: f64) -> Result<Tensor<f64>> {
        self.route(
            |rt| {
                let dims = Shape::new(shape)?;
                let mut buf = DirectBuffer::zeroed(dims.elem_count());
                rt.fill(&mut buf, value)?;
                Ok(DenseTensor::from_shape(dims, buf.as_slice().to_vec()).into())
            },
            |cpu| {
                let field = Reals;
                if value == 0.0 {
                    TensorProvider::<Reals>::zeros(cpu, &field, shape)
                } else {
                    TensorProvider::<Reals>::ones(cpu, &field, shape)
                }
            },
        )
    }

    fn zeros(&self, shape: &[usize]) -> Result<Tensor<f64>> {
        self.filled(shape, 0.0)
    }

    fn ones(&self, shape: &[usize]) -> Result<Tensor<f64>> {
        self.filled(shape, 1.0)
    }

    fn create(&self, data: Vec<f64>, shape: &[usize]) -> Result<Tensor<f64>> {
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

        let Some(runtime) = self.runtime.as_deref() else {
            return TensorProvider::<Reals>::create(&self.fallback, &Reals, data, shape);
        };
        let mut buf = DirectBuffer::zeroed(data.len());
        match runtime.copy_into(&data, &mut buf) {
            Ok(()) => Ok(DenseTensor::from_shape(dims, buf.as_slice().to_vec()).into()),
            Err(e) => {
                warn!("{}: native call failed ({}), using cpu-naive", self.provider, e);
                TensorProvider::<Reals>::create(&self.fallback, &Reals, data, shape)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_runtime_uses_cpu_naive() {
        let t = NativeTensors::new("native-test", None);
        let ones = t.ones(&[2, 2]).unwrap();
        assert_eq!(ones.to_dense().as_slice(), &[1.0; 4]);
        let zeros = t.zeros(&[3]).unwrap();
        assert_eq!(zeros.to_dense().as_slice(), &[0.0; 3]);
        let created = t.create(vec![1.0, 2.0], &[1, 2]).unwrap();
        assert_eq!(created.get(&[0, 1]), Ok(2.0));
    }

    #[test]
    fn test_malformed_input_is_reported() {
        let t = NativeTensors::new("native-test", None);
        assert!(matches!(
            t.create(vec![1.0; 3], &[2, 2]),
            Err(Error::InvalidArgument { arg: "data", .. })
        ));
        assert!(t.zeros(&[]).is_err());
    }
}
