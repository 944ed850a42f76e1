//! Shape-changing operations

use crate::error::{Error, Result};
use crate::field::{Field, Scalar};
use crate::storage::{DenseStorage, MatrixView};

/// Transposed dense copy
pub fn transpose<E, A>(a: &A) -> DenseStorage<E>
where
    E: Scalar,
    A: MatrixView<E> + ?Sized,
{
    let (rows, cols) = a.shape();
    let mut out = Vec::with_capacity(rows * cols);
    for j in 0..cols {
        for i in 0..rows {
            out.push(a.get(i, j));
        }
    }
    DenseStorage::from_parts(cols, rows, out)
}

/// Dense copy of rows `row_start..row_end` and columns `col_start..col_end`
///
/// Ranges are half-open and must be non-empty. The result never aliases `a`.
pub fn submatrix<E, A>(
    a: &A,
    row_start: usize,
    row_end: usize,
    col_start: usize,
    col_end: usize,
) -> Result<DenseStorage<E>>
where
    E: Scalar,
    A: MatrixView<E> + ?Sized,
{
    let (rows, cols) = a.shape();
    if row_start >= row_end || row_end > rows {
        return Err(Error::invalid_argument(
            "rows",
            format!("range {}..{} is empty or outside 0..{}", row_start, row_end, rows),
        ));
    }
    if col_start >= col_end || col_end > cols {
        return Err(Error::invalid_argument(
            "cols",
            format!("range {}..{} is empty or outside 0..{}", col_start, col_end, cols),
        ));
    }

    let (m, n) = (row_end - row_start, col_end - col_start);
    let mut out = Vec::with_capacity(m * n);
    for i in row_start..row_end {
        for j in col_start..col_end {
            out.push(a.get(i, j));
        }
    }
    Ok(DenseStorage::from_parts(m, n, out))
}

/// Sum of `a[i, i]` for `i < min(rows, cols)`
pub fn trace<F, A>(field: &F, a: &A) -> F::Elem
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
{
    let n = a.rows().min(a.cols());
    (0..n).fold(field.zero(), |acc, i| field.add(&acc, &a.get(i, i)))
}

/// `n x n` identity
pub fn identity<F: Field>(field: &F, n: usize) -> DenseStorage<F::Elem> {
    let mut out = vec![field.zero(); n * n];
    for i in 0..n {
        out[i * n + i] = field.one();
    }
    DenseStorage::from_parts(n, n, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Reals;

    fn sample() -> DenseStorage<i32> {
        DenseStorage::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn test_transpose() {
        let t = transpose(&sample());
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.as_slice(), &[1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_submatrix() {
        let s = submatrix(&sample(), 0, 2, 1, 3).unwrap();
        assert_eq!(s.as_slice(), &[2, 3, 5, 6]);
        let row = submatrix(&sample(), 1, 2, 0, 3).unwrap();
        assert_eq!(row.shape(), (1, 3));
        assert_eq!(row.as_slice(), &[4, 5, 6]);
        assert!(submatrix(&sample(), 0, 3, 0, 1).is_err());
        assert!(submatrix(&sample(), 0, 1, 2, 1).is_err());
    }

    #[test]
    fn test_submatrix_rejects_empty_ranges() {
        assert!(matches!(
            submatrix(&sample(), 1, 1, 0, 3),
            Err(Error::InvalidArgument { arg: "rows", .. })
        ));
        assert!(matches!(
            submatrix(&sample(), 0, 2, 3, 3),
            Err(Error::InvalidArgument { arg: "cols", .. })
        ));
    }

    #[test]
    fn test_trace_rectangular() {
        let a = DenseStorage::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(trace(&Reals, &a), 6.0);
    }

    #[test]
    fn test_identity() {
        assert_eq!(identity(&Reals, 2).as_slice(), &[1.0, 0.0, 0.0, 1.0]);
    }
}
