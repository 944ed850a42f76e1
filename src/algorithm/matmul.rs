//! Matrix multiplication
//!
//! The reference kernel walks `i`, then the inner dimension `p`, then `j`, so
//! the innermost loop streams one row of `B` into one row of the output.
//! Square operands whose order is a power of two at or above
//! [`STRASSEN_THRESHOLD`] use Strassen's recursion, bottoming out in the
//! reference kernel at [`STRASSEN_LEAF`].

use crate::error::{Error, Result};
use crate::field::Field;
use crate::storage::{DenseStorage, MatrixView};

/// Smallest order for which Strassen's recursion is used
pub const STRASSEN_THRESHOLD: usize = 128;

/// Order at which the recursion falls back to the reference kernel
pub const STRASSEN_LEAF: usize = 64;

/// `a @ b`
pub fn matmul<F, A, B>(field: &F, a: &A, b: &B) -> Result<DenseStorage<F::Elem>>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
    B: MatrixView<F::Elem> + ?Sized,
{
    let (m, k) = a.shape();
    let (k2, n) = b.shape();
    if k != k2 {
        return Err(Error::dimension_mismatch("multiply", a.shape(), b.shape()));
    }

    let a_data = a.to_row_major();
    let b_data = b.to_row_major();

    let out = if m == k && k == n && n >= STRASSEN_THRESHOLD && n.is_power_of_two() {
        strassen(field, &a_data, &b_data, n)
    } else {
        gemm(field, &a_data, &b_data, m, k, n)
    };
    Ok(DenseStorage::from_parts(m, n, out))
}

/// Row-major `m x k` times `k x n`
pub(crate) fn gemm<F: Field>(
    field: &F,
    a: &[F::Elem],
    b: &[F::Elem],
    m: usize,
    k: usize,
    n: usize,
) -> Vec<F::Elem> {
    let mut out = vec![field.zero(); m * n];
    for (i, out_row) in out.chunks_mut(n.max(1)).enumerate().take(m) {
        gemm_row(field, &a[i * k..(i + 1) * k], b, out_row, n);
    }
    out
}

/// One output row: `out_row += a_row @ b`
#[inline]
pub(crate) fn gemm_row<F: Field>(
    field: &F,
    a_row: &[F::Elem],
    b: &[F::Elem],
    out_row: &mut [F::Elem],
    n: usize,
) {
    for (p, a_ip) in a_row.iter().enumerate() {
        let b_row = &b[p * n..(p + 1) * n];
        for (o, b_pj) in out_row.iter_mut().zip(b_row) {
            *o = field.add(o, &field.mul(a_ip, b_pj));
        }
    }
}

/// Row-parallel GEMM over rayon's global pool
#[cfg(feature = "rayon")]
pub(crate) fn gemm_parallel<F: Field>(
    field: &F,
    a: &[F::Elem],
    b: &[F::Elem],
    m: usize,
    k: usize,
    n: usize,
) -> Vec<F::Elem> {
    use rayon::prelude::*;

    let mut out = vec![field.zero(); m * n];
    if n == 0 {
        return out;
    }
    out.par_chunks_mut(n).enumerate().for_each(|(i, out_row)| {
        gemm_row(field, &a[i * k..(i + 1) * k], b, out_row, n);
    });
    out
}

/// Strassen's recursion on square row-major blocks of order `n`
fn strassen<F: Field>(field: &F, a: &[F::Elem], b: &[F::Elem], n: usize) -> Vec<F::Elem> {
    if n <= STRASSEN_LEAF {
        return gemm(field, a, b, n, n, n);
    }

    let h = n / 2;
    let [a11, a12, a21, a22] = split(a, n);
    let [b11, b12, b21, b22] = split(b, n);

    let m1 = strassen(field, &add(field, &a11, &a22), &add(field, &b11, &b22), h);
    let m2 = strassen(field, &add(field, &a21, &a22), &b11, h);
    let m3 = strassen(field, &a11, &sub(field, &b12, &b22), h);
    let m4 = strassen(field, &a22, &sub(field, &b21, &b11), h);
    let m5 = strassen(field, &add(field, &a11, &a12), &b22, h);
    let m6 = strassen(field, &sub(field, &a21, &a11), &add(field, &b11, &b12), h);
    let m7 = strassen(field, &sub(field, &a12, &a22), &add(field, &b21, &b22), h);

    let c11 = add(field, &sub(field, &add(field, &m1, &m4), &m5), &m7);
    let c12 = add(field, &m3, &m5);
    let c21 = add(field, &m2, &m4);
    let c22 = add(field, &add(field, &sub(field, &m1, &m2), &m3), &m6);

    join([&c11, &c12, &c21, &c22], n)
}

fn add<F: Field>(field: &F, x: &[F::Elem], y: &[F::Elem]) -> Vec<F::Elem> {
    x.iter().zip(y).map(|(p, q)| field.add(p, q)).collect()
}

fn sub<F: Field>(field: &F, x: &[F::Elem], y: &[F::Elem]) -> Vec<F::Elem> {
    x.iter().zip(y).map(|(p, q)| field.sub(p, q)).collect()
}

/// Quadrants of a row-major square block, in `[11, 12, 21, 22]` order
fn split<E: Clone>(m: &[E], n: usize) -> [Vec<E>; 4] {
    let h = n / 2;
    let quadrant = |r0: usize, c0: usize| -> Vec<E> {
        let mut q = Vec::with_capacity(h * h);
        for i in r0..r0 + h {
            q.extend_from_slice(&m[i * n + c0..i * n + c0 + h]);
        }
        q
    };
    [quadrant(0, 0), quadrant(0, h), quadrant(h, 0), quadrant(h, h)]
}

fn join<E: Clone>(quadrants: [&Vec<E>; 4], n: usize) -> Vec<E> {
    let h = n / 2;
    let [c11, c12, c21, c22] = quadrants;
    let mut out = Vec::with_capacity(n * n);
    for i in 0..h {
        out.extend_from_slice(&c11[i * h..(i + 1) * h]);
        out.extend_from_slice(&c12[i * h..(i + 1) * h]);
    }
    for i in 0..h {
        out.extend_from_slice(&c21[i * h..(i + 1) * h]);
        out.extend_from_slice(&c22[i * h..(i + 1) * h]);
    }
    out
}

/// `a @ x` for a vector `x`
pub fn matvec<F, A>(field: &F, a: &A, x: &[F::Elem]) -> Result<Vec<F::Elem>>
where
    F: Field,
    A: MatrixView<F::Elem> + ?Sized,
{
    let (rows, cols) = a.shape();
    if cols != x.len() {
        return Err(Error::dimension_mismatch(
            "multiply_vector",
            a.shape(),
            (x.len(), 1),
        ));
    }
    Ok((0..rows)
        .map(|i| {
            x.iter().enumerate().fold(field.zero(), |acc, (j, xj)| {
                field.add(&acc, &field.mul(&a.get(i, j), xj))
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{PrimeField, Reals};

    #[test]
    fn test_matmul_2x2() {
        let a = DenseStorage::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = DenseStorage::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let c = matmul(&Reals, &a, &b).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_rectangular() {
        let a = DenseStorage::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = DenseStorage::from_vec(3, 1, vec![1.0, 0.0, -1.0]).unwrap();
        let c = matmul(&Reals, &a, &b).unwrap();
        assert_eq!(c.shape(), (2, 1));
        assert_eq!(c.as_slice(), &[-2.0, -2.0]);
    }

    #[test]
    fn test_matmul_mismatch() {
        let a = DenseStorage::new(2, 3, 0.0);
        let b = DenseStorage::new(2, 2, 0.0);
        assert_eq!(
            matmul(&Reals, &a, &b),
            Err(Error::dimension_mismatch("multiply", (2, 3), (2, 2)))
        );
    }

    #[test]
    fn test_strassen_matches_reference() {
        // Exact arithmetic, so the two paths must agree bit for bit
        let f = PrimeField::new(1_000_003).unwrap();
        let n = STRASSEN_THRESHOLD;
        let a: Vec<u64> = (0..n * n).map(|k| (k as u64 * 7 + 3) % 1_000_003).collect();
        let b: Vec<u64> = (0..n * n).map(|k| (k as u64 * 13 + 1) % 1_000_003).collect();

        let expected = gemm(&f, &a, &b, n, n, n);
        let got = matmul(
            &f,
            &DenseStorage::from_vec(n, n, a).unwrap(),
            &DenseStorage::from_vec(n, n, b).unwrap(),
        )
        .unwrap();
        assert_eq!(got.as_slice(), expected.as_slice());
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_matches_serial() {
        let a: Vec<f64> = (0..12).map(f64::from).collect();
        let b: Vec<f64> = (0..20).map(f64::from).collect();
        assert_eq!(
            gemm_parallel(&Reals, &a, &b, 3, 4, 5),
            gemm(&Reals, &a, &b, 3, 4, 5)
        );
    }

    #[test]
    fn test_matvec() {
        let a = DenseStorage::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(matvec(&Reals, &a, &[1.0, 1.0]), Ok(vec![3.0, 7.0]));
        assert!(matvec(&Reals, &a, &[1.0]).is_err());
    }
}
