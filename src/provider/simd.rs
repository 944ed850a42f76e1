//! CPU-SIMD provider for the primitive-double field

use super::kernels::simd::{SimdKernels, SimdLevel};
use super::{DoubleKernels, LinearAlgebraProvider, Provider};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::field::{Field, Reals};
use crate::storage::{DenseStorage, DoubleStorage, Storage};
use log::info;
use std::borrow::Cow;

/// Vector-width f64 kernels over [`Reals`]
///
/// Available when runtime detection finds AVX-512, AVX2+FMA or NEON and the
/// configuration does not disable SIMD. Operations the kernels do not cover
/// (determinant, inverse, solve, transpose) use the reference algorithms.
#[derive(Clone, Debug)]
pub struct CpuSimdProvider {
    kernels: SimdKernels,
    available: bool,
}

impl CpuSimdProvider {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::global())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        let kernels = SimdKernels::detect();
        let available = config.simd_enabled && kernels.level() != SimdLevel::Scalar;
        info!(
            "cpu-simd provider: level {} (enabled by config: {}, available: {})",
            kernels.level(),
            config.simd_enabled,
            available
        );
        Self { kernels, available }
    }

    /// Detected instruction set
    pub fn level(&self) -> SimdLevel {
        self.kernels.level()
    }
}

impl Default for CpuSimdProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Contiguous row-major view of a storage, borrowed when the layout allows
fn contiguous(a: &dyn Storage<f64>) -> Cow<'_, [f64]> {
    let any = a.as_any();
    if let Some(d) = any.downcast_ref::<DoubleStorage>() {
        return Cow::Borrowed(d.as_slice());
    }
    if let Some(d) = any.downcast_ref::<DenseStorage<f64>>() {
        return Cow::Borrowed(d.as_slice());
    }
    Cow::Owned(a.to_row_major())
}

impl CpuSimdProvider {
    fn binary(
        &self,
        op: &'static str,
        a: &dyn Storage<f64>,
        b: &dyn Storage<f64>,
        kernel: impl Fn(&SimdKernels, &[f64], &[f64], &mut [f64]),
    ) -> Result<Box<dyn Storage<f64>>> {
        if a.shape() != b.shape() {
            return Err(Error::dimension_mismatch(op, a.shape(), b.shape()));
        }
        let (rows, cols) = a.shape();
        let mut out = vec![0.0; rows * cols];
        kernel(&self.kernels, &contiguous(a), &contiguous(b), &mut out);
        Ok(Reals.dense_storage(rows, cols, out))
    }
}

impl Provider for CpuSimdProvider {
    fn name(&self) -> &'static str {
        "cpu-simd"
    }

    fn priority(&self) -> u8 {
        90
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

impl LinearAlgebraProvider<Reals> for CpuSimdProvider {
    fn add(
        &self,
        _field: &Reals,
        a: &dyn Storage<f64>,
        b: &dyn Storage<f64>,
    ) -> Result<Box<dyn Storage<f64>>> {
        self.binary("add", a, b, |k, x, y, out| k.add(x, y, out))
    }

    fn sub(
        &self,
        _field: &Reals,
        a: &dyn Storage<f64>,
        b: &dyn Storage<f64>,
    ) -> Result<Box<dyn Storage<f64>>> {
        self.binary("sub", a, b, |k, x, y, out| k.sub(x, y, out))
    }

    fn multiply(
        &self,
        _field: &Reals,
        a: &dyn Storage<f64>,
        b: &dyn Storage<f64>,
    ) -> Result<Box<dyn Storage<f64>>> {
        let (m, k) = a.shape();
        let (k2, n) = b.shape();
        if k != k2 {
            return Err(Error::dimension_mismatch("multiply", a.shape(), b.shape()));
        }
        let mut out = vec![0.0; m * n];
        self.kernels
            .gemm(&contiguous(a), &contiguous(b), &mut out, m, k, n);
        Ok(Reals.dense_storage(m, n, out))
    }

    fn scale(&self, _field: &Reals, factor: &f64, a: &dyn Storage<f64>) -> Box<dyn Storage<f64>> {
        let (rows, cols) = a.shape();
        let mut out = vec![0.0; rows * cols];
        self.kernels.scale(*factor, &contiguous(a), &mut out);
        Reals.dense_storage(rows, cols, out)
    }

    fn double_kernels(&self) -> Option<&dyn DoubleKernels> {
        Some(&self.kernels)
    }
}
