//! Element-wise operations

use super::validate_same_shape;
use crate::error::{Error, Result};
use crate::field::{Field, Scalar};
use crate::storage::{DenseStorage, MatrixView};

fn zip_with<E, A, B, G>(op: &'static str, a: &A, b: &B, f: G) -> Result<DenseStorage<E>>
where
    E: Scalar,
    A: MatrixView<E> + ?Sized,
    B: MatrixView<E> + ?Sized,
    G: Fn(&E, &E) -> E,
{
    validate_same_shape(op, a, b)?;
    let (rows, cols) = a.shape();
    let mut out = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            out.push(f(&a.get(i, j), &b.get(i, j)));
        }
    }
    Ok(DenseStorage::from_parts(rows, cols, out))
}

/// `a + b`
pub fn add<F, A, B>(field: &F, a: &A, b: &B) -> Result<DenseStorage<F::Elem>>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
    B: MatrixView<F::Elem> + ?Sized,
{
    zip_with("add", a, b, |x, y| field.add(x, y))
}

/// `a - b`
pub fn sub<F, A, B>(field: &F, a: &A, b: &B) -> Result<DenseStorage<F::Elem>>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
    B: MatrixView<F::Elem> + ?Sized,
{
    zip_with("sub", a, b, |x, y| field.sub(x, y))
}

/// `factor * a`
pub fn scale<F, A>(field: &F, factor: &F::Elem, a: &A) -> DenseStorage<F::Elem>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
{
    let (rows, cols) = a.shape();
    let data = a
        .to_row_major()
        .iter()
        .map(|x| field.mul(factor, x))
        .collect();
    DenseStorage::from_parts(rows, cols, data)
}

/// Inner product of two equal-length vectors
pub fn dot<F: Field>(field: &F, a: &[F::Elem], b: &[F::Elem]) -> Result<F::Elem> {
    if a.len() != b.len() {
        return Err(Error::dimension_mismatch(
            "dot",
            (a.len(), 1),
            (b.len(), 1),
        ));
    }
    Ok(a
        .iter()
        .zip(b)
        .fold(field.zero(), |acc, (x, y)| field.add(&acc, &field.mul(x, y))))
}
