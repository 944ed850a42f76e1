//! AVX-512 f64 kernels
//!
//! Processes 8 f64s per iteration using 512-bit vectors.

use super::BinaryOp;
use std::arch::x86_64::*;

const F64_LANES: usize = 8;

macro_rules! impl_binary_f64_avx512 {
    ($name:ident, $vec_op:ident) => {
        #[target_feature(enable = "avx512f")]
        unsafe fn $name(a: *const f64, b: *const f64, out: *mut f64, chunks: usize) {
            for i in 0..chunks {
                let offset = i * F64_LANES;
                unsafe {
                    let va = _mm512_loadu_pd(a.add(offset));
                    let vb = _mm512_loadu_pd(b.add(offset));
                    _mm512_storeu_pd(out.add(offset), $vec_op(va, vb));
                }
            }
        }
    };
}

impl_binary_f64_avx512!(binary_add_f64, _mm512_add_pd);
impl_binary_f64_avx512!(binary_sub_f64, _mm512_sub_pd);

/// # Safety
/// - CPU must support AVX-512F
/// - `a`, `b` and `out` must be valid for `chunks * 8` elements
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
/// - CPU must support AVX-512F
/// - `a` and `out` must be valid for `chunks * 8` elements
#[target_feature(enable = "avx512f")]
pub unsafe fn scale_f64(factor: f64, a: *const f64, out: *mut f64, chunks: usize) {
    let vf = _mm512_set1_pd(factor);
    for i in 0..chunks {
        let offset = i * F64_LANES;
        unsafe {
            let va = _mm512_loadu_pd(a.add(offset));
            _mm512_storeu_pd(out.add(offset), _mm512_mul_pd(vf, va));
        }
    }
}

/// # Safety
/// - CPU must support AVX-512F
/// - `x` and `y` must be valid for `chunks * 8` elements
#[target_feature(enable = "avx512f", enable = "fma")]
pub unsafe fn axpy_f64(alpha: f64, x: *const f64, y: *mut f64, chunks: usize) {
    let va = _mm512_set1_pd(alpha);
    for i in 0..chunks {
        let offset = i * F64_LANES;
        unsafe {
            let vx = _mm512_loadu_pd(x.add(offset));
            let vy = _mm512_loadu_pd(y.add(offset));
            _mm512_storeu_pd(y.add(offset), _mm512_fmadd_pd(va, vx, vy));
        }
    }
}
