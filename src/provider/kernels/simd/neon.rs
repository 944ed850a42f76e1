//! NEON f64 kernels for ARM64
//!
//! Processes 2 f64s per iteration using 128-bit vectors.

use super::BinaryOp;
use std::arch::aarch64::*;

const F64_LANES: usize = 2;

/// # Safety
/// - `a`, `b` and `out` must be valid for `chunks * 2` elements
#[target_feature(enable = "neon")]
pub unsafe fn binary_f64(op: BinaryOp, a: *const f64, b: *const f64, out: *mut f64, chunks: usize) {
    for i in 0..chunks {
        let offset = i * F64_LANES;
        unsafe {
            let va = vld1q_f64(a.add(offset));
            let vb = vld1q_f64(b.add(offset));
            let vr = match op {
                BinaryOp::Add => vaddq_f64(va, vb),
                BinaryOp::Sub => vsubq_f64(va, vb),
            };
            vst1q_f64(out.add(offset), vr);
        }
    }
}

/// # Safety
/// - `a` and `out` must be valid for `chunks * 2` elements
#[target_feature(enable = "neon")]
pub unsafe fn scale_f64(factor: f64, a: *const f64, out: *mut f64, chunks: usize) {
    let vf = vdupq_n_f64(factor);
    for i in 0..chunks {
        let offset = i * F64_LANES;
        unsafe {
            let va = vld1q_f64(a.add(offset));
            vst1q_f64(out.add(offset), vmulq_f64(vf, va));
        }
    }
}

/// # Safety
/// - `x` and `y` must be valid for `chunks * 2` elements
#[target_feature(enable = "neon")]
pub unsafe fn axpy_f64(alpha: f64, x: *const f64, y: *mut f64, chunks: usize) {
    let va = vdupq_n_f64(alpha);
    for i in 0..chunks {
        let offset = i * F64_LANES;
        unsafe {
            let vx = vld1q_f64(x.add(offset));
            let vy = vld1q_f64(y.add(offset));
            // vy + va * vx
            vst1q_f64(y.add(offset), vfmaq_f64(vy, va, vx));
        }
    }
}
