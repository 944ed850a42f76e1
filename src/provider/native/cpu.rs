//! Native runtime provider for host memory

use super::runtime::{self, NativeRuntime};
use super::NativeTensors;
use crate::error::Result;
use crate::field::Reals;
use crate::provider::{Provider, TensorProvider};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Host-side tensors through the native runtime
///
/// Priority 80, available whenever the runtime library loaded.
#[derive(Clone, Debug)]
pub struct NativeCpuProvider {
    tensors: NativeTensors,
}

impl NativeCpuProvider {
    /// Bind to the process-wide runtime
    pub fn new() -> Self {
        Self::with_runtime(runtime::probe())
    }

    /// Bind to an explicit runtime, or to none
    pub fn with_runtime(runtime: Option<Arc<NativeRuntime>>) -> Self {
        Self {
            tensors: NativeTensors::new("native-cpu", runtime),
        }
    }
}

impl Default for NativeCpuProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for NativeCpuProvider {
    fn name(&self) -> &'static str {
        "native-cpu"
    }

    fn priority(&self) -> u8 {
        80
    }

    fn is_available(&self) -> bool {
        self.tensors.runtime.is_some()
    }
}

impl TensorProvider<Reals> for NativeCpuProvider {
    fn zeros(&self, _field: &Reals, shape: &[usize]) -> Result<Tensor<f64>> {
        self.tensors.zeros(shape)
    }

    fn ones(&self, _field: &Reals, shape: &[usize]) -> Result<Tensor<f64>> {
        self.tensors.ones(shape)
    }

    fn create(&self, _field: &Reals, data: Vec<f64>, shape: &[usize]) -> Result<Tensor<f64>> {
        self.tensors.create(data, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_unavailable_without_runtime() {
        let p = NativeCpuProvider::with_runtime(None);
        assert!(!p.is_available());
        assert!(!p.supports_gpu());
        assert!(matches!(
            p.create_context(),
            Err(Error::BackendUnavailable { provider: "native-cpu", .. })
        ));
        // Still serves tensors through the fallback
        assert_eq!(p.ones(&Reals, &[2]).unwrap().sum(&Reals), 2.0);
    }
}
