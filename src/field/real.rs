//! The optimized real field over primitive f64

use super::Field;
use crate::provider::{CpuNaiveProvider, LinearAlgebraProvider, TensorProvider};
use crate::storage::{BufferMode, DoubleStorage, Storage};
use std::cmp::Ordering;
use std::sync::Arc;

/// Real numbers represented as primitive `f64`
///
/// This is the engine's optimized scalar type: dense matrices over `Reals`
/// are stored in a contiguous primitive buffer ([`DoubleStorage`]) and the
/// CPU-SIMD and native providers are registered for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reals;

impl Field for Reals {
    type Elem = f64;

    fn name(&self) -> &'static str {
        "Reals"
    }

    #[inline]
    fn zero(&self) -> f64 {
        0.0
    }

    #[inline]
    fn one(&self) -> f64 {
        1.0
    }

    #[inline]
    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    #[inline]
    fn sub(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    #[inline]
    fn mul(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    #[inline]
    fn neg(&self, a: &f64) -> f64 {
        -a
    }

    fn inv(&self, a: &f64) -> Option<f64> {
        if *a == 0.0 { None } else { Some(1.0 / a) }
    }

    fn cmp(&self, a: &f64, b: &f64) -> Option<Ordering> {
        a.partial_cmp(b)
    }

    #[inline]
    fn is_zero(&self, a: &f64) -> bool {
        *a == 0.0
    }

    fn magnitude(&self, a: &f64) -> Option<f64> {
        Some(a.abs())
    }

    fn dense_storage(&self, rows: usize, cols: usize, data: Vec<f64>) -> Box<dyn Storage<f64>> {
        Box::new(DoubleStorage::from_buffer(rows, cols, data, BufferMode::Heap))
    }

    fn linear_algebra_providers() -> Vec<Arc<dyn LinearAlgebraProvider<Self>>> {
        #[allow(unused_mut)]
        let mut providers: Vec<Arc<dyn LinearAlgebraProvider<Self>>> =
            vec![Arc::new(CpuNaiveProvider::new())];

        #[cfg(feature = "simd")]
        providers.push(Arc::new(crate::provider::CpuSimdProvider::new()));

        providers
    }

    fn tensor_providers() -> Vec<Arc<dyn TensorProvider<Self>>> {
        #[allow(unused_mut)]
        let mut providers: Vec<Arc<dyn TensorProvider<Self>>> =
            vec![Arc::new(CpuNaiveProvider::new())];

        #[cfg(feature = "native")]
        {
            use crate::provider::native::{NativeCpuProvider, NativeCudaProvider};
            providers.push(Arc::new(NativeCpuProvider::new()));
            providers.push(Arc::new(NativeCudaProvider::new()));
        }

        providers
    }
}
