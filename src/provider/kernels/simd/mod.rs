//! SIMD detection and dispatch for f64 kernels
//!
//! # Architecture Support
//!
//! | Architecture | Instruction Set | f64 lanes |
//! |--------------|-----------------|-----------|
//! | x86-64       | AVX-512F + FMA  | 8         |
//! | x86-64       | AVX2 + FMA      | 4         |
//! | ARM64        | NEON            | 2         |
//! | Any          | Scalar          | 1         |
//!
//! Architecture kernels process whole lanes only and report nothing back;
//! dispatch computes the chunk count up front and finishes the remainder with
//! the scalar kernels.

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
mod avx512;
#[cfg(target_arch = "aarch64")]
mod neon;

use super::scalar::{add_f64, axpy_f64, gemm_with, scale_f64, sub_f64};
use super::{DoubleKernels, check_binary, check_gemm};
use std::sync::OnceLock;

/// SIMD capability level detected at runtime
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(dead_code)] // Variants may not be constructed on all architectures
pub enum SimdLevel {
    /// Scalar fallback
    Scalar = 0,
    /// NEON baseline for AArch64 (128-bit vectors, 2 f64s)
    Neon = 1,
    /// AVX2 with FMA (256-bit vectors, 4 f64s)
    Avx2Fma = 2,
    /// AVX-512F with FMA (512-bit vectors, 8 f64s)
    Avx512 = 3,
}

impl SimdLevel {
    /// Number of f64 elements per vector register
    #[inline]
    pub const fn f64_lanes(self) -> usize {
        match self {
            Self::Avx512 => 8,
            Self::Avx2Fma => 4,
            Self::Neon => 2,
            Self::Scalar => 1,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avx512 => "AVX-512",
            Self::Avx2Fma => "AVX2+FMA",
            Self::Neon => "NEON",
            Self::Scalar => "Scalar",
        }
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// Detect the best available SIMD level for the current CPU
///
/// The first call performs detection; later calls return the cached result.
#[inline]
pub fn detect_simd() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(detect_simd_uncached)
}

#[cold]
fn detect_simd_uncached() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("fma") {
            return SimdLevel::Avx512;
        }

        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return SimdLevel::Avx2Fma;
        }
    }

    // NEON is mandatory on AArch64
    #[cfg(target_arch = "aarch64")]
    {
        return SimdLevel::Neon;
    }

    #[allow(unreachable_code)]
    SimdLevel::Scalar
}

/// Element-wise binary operation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
}

fn binary_scalar(op: BinaryOp, a: &[f64], b: &[f64], out: &mut [f64]) {
    match op {
        BinaryOp::Add => add_f64(a, b, out),
        BinaryOp::Sub => sub_f64(a, b, out),
    }
}

/// `out = a (op) b` at `level`
///
/// # Panics
///
/// Panics if the slice lengths differ.
pub fn binary_f64(level: SimdLevel, op: BinaryOp, a: &[f64], b: &[f64], out: &mut [f64]) {
    check_binary(a, b, out);
    let level = level.min(detect_simd());
    let len = out.len();
    let chunks = len / level.f64_lanes();

    // SAFETY: lengths checked above; `level` is capped at the detected level,
    // and the kernels touch `chunks * lanes <= len` elements.
    unsafe {
        match level {
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx512 => avx512::binary_f64(op, a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), chunks),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx2Fma => avx2::binary_f64(op, a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), chunks),
            #[cfg(target_arch = "aarch64")]
            SimdLevel::Neon => neon::binary_f64(op, a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), chunks),
            _ => return binary_scalar(op, a, b, out),
        }
    }

    let done = chunks * level.f64_lanes();
    binary_scalar(op, &a[done..], &b[done..], &mut out[done..]);
}

/// `out = factor * a` at `level`
pub fn scale_simd_f64(level: SimdLevel, factor: f64, a: &[f64], out: &mut [f64]) {
    check_binary(a, a, out);
    let level = level.min(detect_simd());
    let chunks = out.len() / level.f64_lanes();

    // SAFETY: as in `binary_f64`.
    unsafe {
        match level {
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx512 => avx512::scale_f64(factor, a.as_ptr(), out.as_mut_ptr(), chunks),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx2Fma => avx2::scale_f64(factor, a.as_ptr(), out.as_mut_ptr(), chunks),
            #[cfg(target_arch = "aarch64")]
            SimdLevel::Neon => neon::scale_f64(factor, a.as_ptr(), out.as_mut_ptr(), chunks),
            _ => return scale_f64(factor, a, out),
        }
    }

    let done = chunks * level.f64_lanes();
    scale_f64(factor, &a[done..], &mut out[done..]);
}

/// `y += alpha * x` at `level`, with fused multiply-add where available
pub fn axpy_simd_f64(level: SimdLevel, alpha: f64, x: &[f64], y: &mut [f64]) {
    assert_eq!(x.len(), y.len(), "axpy length mismatch");
    let level = level.min(detect_simd());
    let chunks = y.len() / level.f64_lanes();

    // SAFETY: as in `binary_f64`.
    unsafe {
        match level {
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx512 => avx512::axpy_f64(alpha, x.as_ptr(), y.as_mut_ptr(), chunks),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx2Fma => avx2::axpy_f64(alpha, x.as_ptr(), y.as_mut_ptr(), chunks),
            #[cfg(target_arch = "aarch64")]
            SimdLevel::Neon => neon::axpy_f64(alpha, x.as_ptr(), y.as_mut_ptr(), chunks),
            _ => return axpy_f64(alpha, x, y),
        }
    }

    let done = chunks * level.f64_lanes();
    axpy_f64(alpha, &x[done..], &mut y[done..]);
}

/// Kernels bound to one SIMD level
#[derive(Copy, Clone, Debug)]
pub struct SimdKernels {
    level: SimdLevel,
}

impl SimdKernels {
    /// Kernels at the detected level
    pub fn detect() -> Self {
        Self {
            level: detect_simd(),
        }
    }

    /// Kernels at an explicit level
    ///
    /// The level must not exceed what [`detect_simd`] reports.
    pub fn at_level(level: SimdLevel) -> Self {
        Self {
            level: level.min(detect_simd()),
        }
    }

    pub fn level(&self) -> SimdLevel {
        self.level
    }
}

impl DoubleKernels for SimdKernels {
    fn name(&self) -> &'static str {
        self.level.as_str()
    }

    fn add(&self, a: &[f64], b: &[f64], out: &mut [f64]) {
        binary_f64(self.level, BinaryOp::Add, a, b, out);
    }

    fn sub(&self, a: &[f64], b: &[f64], out: &mut [f64]) {
        binary_f64(self.level, BinaryOp::Sub, a, b, out);
    }

    fn scale(&self, factor: f64, a: &[f64], out: &mut [f64]) {
        scale_simd_f64(self.level, factor, a, out);
    }

    fn gemm(&self, a: &[f64], b: &[f64], out: &mut [f64], m: usize, k: usize, n: usize) {
        check_gemm(a, b, out, m, k, n);
        let level = self.level;
        gemm_with(a, b, out, m, k, n, |alpha, x, y| {
            axpy_simd_f64(level, alpha, x, y)
        });
    }
}
