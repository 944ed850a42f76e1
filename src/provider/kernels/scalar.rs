//! Portable f64 kernels
//!
//! These also finish the remainder that SIMD lane loops leave behind.

use super::{DoubleKernels, check_binary, check_gemm};

#[inline]
pub fn add_f64(a: &[f64], b: &[f64], out: &mut [f64]) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x + y;
    }
}

#[inline]
pub fn sub_f64(a: &[f64], b: &[f64], out: &mut [f64]) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x - y;
    }
}

#[inline]
pub fn scale_f64(factor: f64, a: &[f64], out: &mut [f64]) {
    for (o, x) in out.iter_mut().zip(a) {
        *o = factor * x;
    }
}

/// `y += alpha * x`
#[inline]
pub fn axpy_f64(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// i-k-j GEMM built on a row update
///
/// `axpy` computes `y += alpha * x` for one row of `b` into one row of `out`.
#[inline]
pub(crate) fn gemm_with(
    a: &[f64],
    b: &[f64],
    out: &mut [f64],
    m: usize,
    k: usize,
    n: usize,
    axpy: impl Fn(f64, &[f64], &mut [f64]),
) {
    if n == 0 {
        return;
    }
    for i in 0..m {
        let out_row = &mut out[i * n..(i + 1) * n];
        for p in 0..k {
            axpy(a[i * k + p], &b[p * n..(p + 1) * n], out_row);
        }
    }
}

/// Scalar kernels, always available
#[derive(Copy, Clone, Debug, Default)]
pub struct ScalarKernels;

impl DoubleKernels for ScalarKernels {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn add(&self, a: &[f64], b: &[f64], out: &mut [f64]) {
        check_binary(a, b, out);
        add_f64(a, b, out);
    }

    fn sub(&self, a: &[f64], b: &[f64], out: &mut [f64]) {
        check_binary(a, b, out);
        sub_f64(a, b, out);
    }

    fn scale(&self, factor: f64, a: &[f64], out: &mut [f64]) {
        check_binary(a, a, out);
        scale_f64(factor, a, out);
    }

    fn gemm(&self, a: &[f64], b: &[f64], out: &mut [f64], m: usize, k: usize, n: usize) {
        check_gemm(a, b, out, m, k, n);
        gemm_with(a, b, out, m, k, n, axpy_f64);
    }
}
