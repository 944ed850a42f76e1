//! Elimination-based linear algebra: determinant, inverse, solve
//!
//! All three run Gaussian elimination on a row-major copy. Pivots are chosen
//! by largest [`Field::magnitude`] when the field reports one, otherwise the
//! first non-zero entry in the column is used, which is exact for finite
//! fields.

use super::validate_square;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::storage::{DenseStorage, MatrixView};

/// Row index of the pivot for column `col`, searching rows `col..n`
fn find_pivot<F: Field>(field: &F, a: &[F::Elem], width: usize, n: usize, col: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for r in col..n {
        let v = &a[r * width + col];
        if field.is_zero(v) {
            continue;
        }
        match field.magnitude(v) {
            None => return Some(r),
            Some(mag) => {
                if best.is_none_or(|(_, b)| mag > b) {
                    best = Some((r, mag));
                }
            }
        }
    }
    best.map(|(r, _)| r)
}

fn swap_rows<E>(a: &mut [E], width: usize, r1: usize, r2: usize) {
    if r1 == r2 {
        return;
    }
    let (lo, hi) = (r1.min(r2), r1.max(r2));
    let (head, tail) = a.split_at_mut(hi * width);
    head[lo * width..(lo + 1) * width].swap_with_slice(&mut tail[..width]);
}

/// Determinant by elimination
///
/// A row swap negates the running product; a column with no non-zero pivot
/// makes the determinant zero. The determinant of a `0 x 0` matrix is one.
pub fn determinant<F, A>(field: &F, a: &A) -> Result<F::Elem>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
{
    let n = validate_square("determinant", a)?;
    let mut m = a.to_row_major();
    let mut det = field.one();

    for col in 0..n {
        let Some(p) = find_pivot(field, &m, n, n, col) else {
            return Ok(field.zero());
        };
        if p != col {
            swap_rows(&mut m, n, p, col);
            det = field.neg(&det);
        }
        let pivot = m[col * n + col].clone();
        det = field.mul(&det, &pivot);

        for r in col + 1..n {
            let factor = field.div(&m[r * n + col], &pivot)?;
            if field.is_zero(&factor) {
                continue;
            }
            for c in col..n {
                let delta = field.mul(&factor, &m[col * n + c]);
                m[r * n + c] = field.sub(&m[r * n + c], &delta);
            }
        }
    }
    Ok(det)
}

/// Reduce the augmented system `[a | rhs]` in place to `[I | x]`
///
/// `m` is row-major with `width = n + rhs_cols`.
fn gauss_jordan<F: Field>(field: &F, m: &mut [F::Elem], n: usize, width: usize) -> Result<()> {
    for col in 0..n {
        let p = find_pivot(field, m, width, n, col).ok_or(Error::Singular)?;
        swap_rows(m, width, p, col);

        let pivot_inv = field.inv(&m[col * width + col]).ok_or(Error::Singular)?;
        for c in 0..width {
            m[col * width + c] = field.mul(&m[col * width + c], &pivot_inv);
        }

        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = m[r * width + col].clone();
            if field.is_zero(&factor) {
                continue;
            }
            for c in 0..width {
                let delta = field.mul(&factor, &m[col * width + c]);
                m[r * width + c] = field.sub(&m[r * width + c], &delta);
            }
        }
    }
    Ok(())
}

/// Inverse by Gauss-Jordan elimination
///
/// Fails with [`Error::Singular`] when some column has no non-zero pivot.
pub fn inverse<F, A>(field: &F, a: &A) -> Result<DenseStorage<F::Elem>>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
{
    let n = validate_square("inverse", a)?;
    let width = 2 * n;
    let mut m = Vec::with_capacity(n * width);
    for i in 0..n {
        for j in 0..n {
            m.push(a.get(i, j));
        }
        for j in 0..n {
            m.push(if i == j { field.one() } else { field.zero() });
        }
    }

    gauss_jordan(field, &mut m, n, width)?;

    let out = m
        .chunks(width.max(1))
        .take(n)
        .flat_map(|row| row[n..].iter().cloned())
        .collect();
    Ok(DenseStorage::from_parts(n, n, out))
}

/// Solve `a @ x = b` for `x`, where `b` has one or more columns
pub fn solve<F, A, B>(field: &F, a: &A, b: &B) -> Result<DenseStorage<F::Elem>>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
    B: MatrixView<F::Elem> + ?Sized,
{
    let n = validate_square("solve", a)?;
    let (b_rows, k) = b.shape();
    if b_rows != n {
        return Err(Error::dimension_mismatch("solve", a.shape(), b.shape()));
    }

    let width = n + k;
    let mut m = Vec::with_capacity(n * width);
    for i in 0..n {
        for j in 0..n {
            m.push(a.get(i, j));
        }
        for j in 0..k {
            m.push(b.get(i, j));
        }
    }

    gauss_jordan(field, &mut m, n, width)?;

    let out = m
        .chunks(width.max(1))
        .take(n)
        .flat_map(|row| row[n..].iter().cloned())
        .collect();
    Ok(DenseStorage::from_parts(n, k, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{PrimeField, Reals};

    fn dense(rows: usize, cols: usize, data: &[f64]) -> DenseStorage<f64> {
        DenseStorage::from_vec(rows, cols, data.to_vec()).unwrap()
    }

    #[test]
    fn test_determinant() {
        let det = determinant(&Reals, &dense(2, 2, &[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert!((det + 2.0).abs() < 1e-12, "{det}");
        // Needs a row swap on the first column
        let det = determinant(
            &Reals,
            &dense(3, 3, &[0.0, 1.0, 2.0, 1.0, 0.0, 3.0, 4.0, -3.0, 8.0]),
        )
        .unwrap();
        assert!((det + 2.0).abs() < 1e-12, "{det}");
        assert_eq!(determinant(&Reals, &dense(2, 2, &[1.0, 2.0, 2.0, 4.0])), Ok(0.0));
        assert_eq!(determinant(&Reals, &dense(0, 0, &[])), Ok(1.0));
    }

    #[test]
    fn test_determinant_non_square() {
        assert_eq!(
            determinant(&Reals, &dense(1, 2, &[1.0, 2.0])),
            Err(Error::non_square("determinant", 1, 2))
        );
    }

    #[test]
    fn test_determinant_prime_field() {
        let f = PrimeField::new(7).unwrap();
        let a = DenseStorage::from_vec(2, 2, vec![3, 5, 6, 2]).unwrap();
        // 3*2 - 5*6 = -24 = 4 (mod 7)
        assert_eq!(determinant(&f, &a), Ok(4));
    }

    #[test]
    fn test_inverse() {
        let inv = inverse(&Reals, &dense(2, 2, &[4.0, 7.0, 2.0, 6.0])).unwrap();
        let expected = [0.6, -0.7, -0.2, 0.4];
        for (got, want) in inv.as_slice().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn test_inverse_singular() {
        assert_eq!(
            inverse(&Reals, &dense(2, 2, &[1.0, 2.0, 2.0, 4.0])),
            Err(Error::Singular)
        );
    }

    #[test]
    fn test_inverse_prime_field_roundtrip() {
        let f = PrimeField::new(11).unwrap();
        let a = DenseStorage::from_vec(3, 3, vec![2, 3, 1, 4, 1, 5, 9, 2, 6]).unwrap();
        let inv = inverse(&f, &a).unwrap();
        let product = crate::algorithm::matmul(&f, &a, &inv).unwrap();
        assert_eq!(product.as_slice(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_solve() {
        let a = dense(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = dense(2, 1, &[3.0, 5.0]);
        let x = solve(&Reals, &a, &b).unwrap();
        assert!((x.get(0, 0) - 0.8).abs() < 1e-12);
        assert!((x.get(1, 0) - 1.4).abs() < 1e-12);

        let bad = dense(3, 1, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            solve(&Reals, &a, &bad),
            Err(Error::DimensionMismatch { op: "solve", .. })
        ));
    }
}
