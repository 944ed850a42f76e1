//! Native runtime provider for CUDA devices

use super::runtime::{self, NativeRuntime};
use super::NativeTensors;
use crate::error::{Error, Result};
use crate::field::Reals;
use crate::provider::{DeviceKind, ExecutionContext, Provider, TensorProvider};
use crate::tensor::Tensor;
use std::sync::Arc;

/// GPU tensors through the native runtime's CUDA backend
///
/// Priority 100. Only available, and only reporting GPU support, when the
/// runtime loaded and reported at least one CUDA device.
#[derive(Clone, Debug)]
pub struct NativeCudaProvider {
    tensors: NativeTensors,
    devices: usize,
}

impl NativeCudaProvider {
    /// Bind to the process-wide runtime
    pub fn new() -> Self {
        Self::with_runtime(runtime::probe())
    }

    /// Bind to an explicit runtime, or to none
    pub fn with_runtime(runtime: Option<Arc<NativeRuntime>>) -> Self {
        let devices = runtime.as_ref().map_or(0, |rt| rt.cuda_device_count());
        // Without a device every call is served on the CPU
        let runtime = runtime.filter(|_| devices > 0);
        Self {
            tensors: NativeTensors::new("native-cuda", runtime),
            devices,
        }
    }

    /// CUDA devices reported at construction
    pub fn device_count(&self) -> usize {
        self.devices
    }
}

impl Default for NativeCudaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for NativeCudaProvider {
    fn name(&self) -> &'static str {
        "native-cuda"
    }

    fn priority(&self) -> u8 {
        100
    }

    fn supports_gpu(&self) -> bool {
        self.is_available()
    }

    fn is_available(&self) -> bool {
        self.devices > 0
    }

    fn create_context(&self) -> Result<ExecutionContext> {
        if !self.is_available() {
            return Err(Error::backend_unavailable(
                self.name(),
                "no CUDA device reported by the native runtime",
            ));
        }
        Ok(ExecutionContext {
            provider: self.name(),
            device: DeviceKind::Gpu { ordinal: 0 },
        })
    }
}

impl TensorProvider<Reals> for NativeCudaProvider {
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
