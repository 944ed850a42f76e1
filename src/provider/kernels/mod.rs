//! Primitive f64 kernels behind [`RealMatrix`](crate::matrix::RealMatrix)
//!
//! ```text
//! kernels/
//! ├── mod.rs      # DoubleKernels trait
//! ├── scalar.rs   # Portable reference kernels (single source of truth for tails)
//! └── simd/       # Runtime-detected AVX-512 / AVX2+FMA / NEON (feature "simd")
//! ```
//!
//! Every kernel takes row-major slices and writes into a caller-provided
//! output. Slice lengths must agree; mismatches panic like slice indexing.

pub mod scalar;
#[cfg(feature = "simd")]
pub mod simd;

pub use scalar::ScalarKernels;

/// Element-wise and GEMM kernels over contiguous f64 buffers
pub trait DoubleKernels: Send + Sync {
    /// Kernel family name, for logging
    fn name(&self) -> &'static str;

    /// `out[i] = a[i] + b[i]`
    fn add(&self, a: &[f64], b: &[f64], out: &mut [f64]);

    /// `out[i] = a[i] - b[i]`
    fn sub(&self, a: &[f64], b: &[f64], out: &mut [f64]);

    /// `out[i] = factor * a[i]`
    fn scale(&self, factor: f64, a: &[f64], out: &mut [f64]);

    /// `out += a @ b` for row-major `a: m x k`, `b: k x n`, `out: m x n`
    ///
    /// `out` is accumulated into, so callers pass a zeroed buffer for a plain
    /// product.
    fn gemm(&self, a: &[f64], b: &[f64], out: &mut [f64], m: usize, k: usize, n: usize);
}

#[inline]
#[track_caller]
pub(crate) fn check_binary(a: &[f64], b: &[f64], out: &[f64]) {
    assert!(
        a.len() == b.len() && a.len() == out.len(),
        "kernel length mismatch: {} / {} / {}",
        a.len(),
        b.len(),
        out.len()
    );
}

#[inline]
#[track_caller]
pub(crate) fn check_gemm(a: &[f64], b: &[f64], out: &[f64], m: usize, k: usize, n: usize) {
    assert!(
        a.len() == m * k && b.len() == k * n && out.len() == m * n,
        "gemm buffer sizes do not match {}x{} @ {}x{}",
        m,
        k,
        k,
        n
    );
}
