//! AVX2 + FMA f64 kernels
//!
//! Processes 4 f64s per iteration using 256-bit vectors.

use super::BinaryOp;
use std::arch::x86_64::*;

const F64_LANES: usize = 4;

macro_rules! impl_binary_f64_avx2 {
    ($name:ident, $vec_op:ident) => {
        #[target_feature(enable = "avx2")]
        unsafe fn $name(a: *const f64, b: *const f64, out: *mut f64, chunks: usize) {
            for i in 0..chunks {
                let offset = i * F64_LANES;
                unsafe {
                    let va = _mm256_loadu_pd(a.add(offset));
                    let vb = _mm256_loadu_pd(b.add(offset));
                    _mm256_storeu_pd(out.add(offset), $vec_op(va, vb));
                }
            }
        }
    };
}

impl_binary_f64_avx2!(binary_add_f64, _mm256_add_pd);
impl_binary_f64_avx2!(binary_sub_f64, _mm256_sub_pd);

/// # Safety
/// - CPU must support AVX2
/// - `a`, `b` and `out` must be valid for `chunks * 4` elements
#[inline]
pub unsafe fn binary_f64(op: BinaryOp, a: *const f64, b: *const f64, out: *mut f64, chunks: usize) {
    unsafe {
        match op {
            BinaryOp::Add => binary_add_f64(a, b, out, chunks),
            BinaryOp::Sub => binary_sub_f64(a, b, out, chunks),
        }
    }
}

/// # Safety
/// - CPU must support AVX2
/// - `a` and `out` must be valid for `chunks * 4` elements
#[target_feature(enable = "avx2")]
pub unsafe fn scale_f64(factor: f64, a: *const f64, out: *mut f64, chunks: usize) {
    let vf = _mm256_set1_pd(factor);
    for i in 0..chunks {
        let offset = i * F64_LANES;
        unsafe {
            let va = _mm256_loadu_pd(a.add(offset));
            _mm256_storeu_pd(out.add(offset), _mm256_mul_pd(vf, va));
        }
    }
}

/// # Safety
/// - CPU must support AVX2 and FMA
/// - `x` and `y` must be valid for `chunks * 4` elements
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn axpy_f64(alpha: f64, x: *const f64, y: *mut f64, chunks: usize) {
    let va = _mm256_set1_pd(alpha);
    for i in 0..chunks {
        let offset = i * F64_LANES;
        unsafe {
            let vx = _mm256_loadu_pd(x.add(offset));
            let vy = _mm256_loadu_pd(y.add(offset));
            _mm256_storeu_pd(y.add(offset), _mm256_fmadd_pd(va, vx, vy));
        }
    }
}
