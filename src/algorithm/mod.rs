//! Reference algorithms over any [`MatrixView`]
//!
//! These are the correctness baseline for every provider: each function reads
//! its operands only through `MatrixView::get`, performs arithmetic only
//! through the [`Field`](crate::field::Field), and materializes a fresh
//! [`DenseStorage`](crate::storage::DenseStorage) or `Vec`. Providers with
//! specialized kernels must agree with them.
//!
//! | Module | Operations |
//! |--------|------------|
//! | [`elementwise`] | `add`, `sub`, `scale`, `dot` |
//! | [`structural`] | `transpose`, `submatrix`, `trace`, `identity` |
//! | [`matmul`] | `matmul` (i-k-j, Strassen for large powers of two), `matvec` |
//! | [`linalg`] | `determinant`, `inverse`, `solve` |

pub mod elementwise;
pub mod linalg;
pub mod matmul;
pub mod structural;

pub use elementwise::{add, dot, scale, sub};
pub use linalg::{determinant, inverse, solve};
pub use matmul::{matmul, matvec};
pub use structural::{identity, submatrix, trace, transpose};

use crate::error::{Error, Result};
use crate::storage::MatrixView;

/// Validate that two operands have equal shapes
pub(crate) fn validate_same_shape<E, A, B>(op: &'static str, a: &A, b: &B) -> Result<()>
where
    A: MatrixView<E> + ?Sized,
    B: MatrixView<E> + ?Sized,
{
    if a.shape() != b.shape() {
        return Err(Error::dimension_mismatch(op, a.shape(), b.shape()));
    }
    Ok(())
}

/// Validate that a matrix is square, returning its order
pub(crate) fn validate_square<E, A>(op: &'static str, a: &A) -> Result<usize>
where
    A: MatrixView<E> + ?Sized,
{
    let (rows, cols) = a.shape();
    if rows != cols {
        return Err(Error::non_square(op, rows, cols));
    }
    Ok(rows)
}
