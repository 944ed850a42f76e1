//! Common test utilities
#![allow(dead_code)]

use matrixkit::prelude::*;

/// Route `log` output through the test harness; safe to call repeatedly
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Row-major elements of a matrix
pub fn flatten<F: Field>(m: &Matrix<F>) -> Vec<F::Elem> {
    m.to_rows().into_iter().flatten().collect()
}

/// Deterministic `rows x cols` real matrix with every entry non-zero
pub fn filled_reals(rows: usize, cols: usize) -> Vec<f64> {
    (0..rows * cols).map(|k| (k % 7) as f64 + 1.0).collect()
}
