//! Storage layout selection from raw two-dimensional input
//!
//! [`build_storage`] turns a [`Grid`] of elements into a concrete
//! [`Storage`]. With [`StorageHint::Auto`] the layout follows the non-zero
//! density of the input: below [`SPARSITY_THRESHOLD`] the elements go into a
//! [`SparseStorage`], otherwise into the field's dense storage.

use crate::error::{Error, Result};
use crate::field::{Field, Zero};
use crate::storage::{
    DiagonalStorage, SparseStorage, Storage, SymmetricStorage, TriangularStorage,
    TridiagonalStorage, require_square,
};
use log::debug;

/// Non-zero density below which automatic selection picks sparse storage
///
/// The sparse tensor provider uses the same constant to decide when a tensor
/// is too dense to keep sparse.
pub const SPARSITY_THRESHOLD: f64 = 0.2;

/// Requested storage layout at construction time
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StorageHint {
    /// Choose by density
    #[default]
    Auto,
    Dense,
    Sparse,
    Diagonal,
    /// Upper triangle only
    Triangular,
    Tridiagonal,
    Symmetric,
    /// Not constructible from raw data; see [`build_storage`]
    Banded,
}

/// Row-major elements with explicit dimensions
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<E> {
    rows: usize,
    cols: usize,
    data: Vec<E>,
}

impl<E: Clone> Grid<E> {
    /// Build from rows; every row must have the same length
    pub fn from_rows<R: AsRef<[E]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::invalid_argument(
                    "rows",
                    format!("row {} has {} elements, expected {}", i, row.len(), cols),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Build from flat row-major data
    pub fn from_flat(rows: usize, cols: usize, data: Vec<E>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "expected {} elements for {}x{}, got {}",
                    rows * cols,
                    rows,
                    cols,
                    data.len()
                ),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> &E {
        &self.data[row * self.cols + col]
    }

    /// Take the row-major elements
    pub fn into_data(self) -> Vec<E> {
        self.data
    }
}

/// Fraction of elements that are not the field's zero
///
/// An empty grid has density 1.0 so that it is treated as dense.
pub fn density<F: Field>(field: &F, grid: &Grid<F::Elem>) -> f64 {
    if grid.data.is_empty() {
        return 1.0;
    }
    let non_zero = grid.data.iter().filter(|e| !field.is_zero(e)).count();
    non_zero as f64 / grid.data.len() as f64
}

/// Layout hint implied by a density for automatic selection
pub fn choose_layout(density: f64) -> StorageHint {
    if density < SPARSITY_THRESHOLD {
        StorageHint::Sparse
    } else {
        StorageHint::Dense
    }
}

fn sparse_from_grid<F: Field>(field: &F, grid: Grid<F::Elem>) -> SparseStorage<F::Elem> {
    SparseStorage::from_row_major(grid.rows, grid.cols, grid.data, Zero::of(field))
}

/// Build storage for `grid` with the layout its density implies
///
/// Sparse below [`SPARSITY_THRESHOLD`], otherwise the field's dense storage.
pub fn auto_storage<F: Field>(field: &F, grid: Grid<F::Elem>) -> Box<dyn Storage<F::Elem>> {
    let d = density(field, &grid);
    let chosen = choose_layout(d);
    debug!(
        "Auto layout for {}x{} {} matrix: density {:.3} -> {:?}",
        grid.rows,
        grid.cols,
        field.name(),
        d,
        chosen
    );
    match chosen {
        StorageHint::Sparse => Box::new(sparse_from_grid(field, grid)),
        _ => field.dense_storage(grid.rows, grid.cols, grid.data),
    }
}

/// Build storage for `grid` under `hint`
///
/// Structured layouts copy only their structural support from the input:
///
/// - `Diagonal` keeps `(i, i)`
/// - `Triangular` keeps the upper triangle `i <= j`; entries below the
///   diagonal are dropped without error, so `[[1, 2], [3, 4]]` reads back
///   `0` at `(1, 0)`
/// - `Tridiagonal` keeps `|i - j| <= 1`
/// - `Symmetric` keeps the upper triangle and mirrors it
///
/// These are lossy for inputs with entries outside the support. Square-only
/// layouts fail with `NonSquare`; `Banded` fails with `Unsupported` since no
/// bandwidth can be inferred from raw data.
pub fn build_storage<F: Field>(
    field: &F,
    grid: Grid<F::Elem>,
    hint: StorageHint,
) -> Result<Box<dyn Storage<F::Elem>>> {
    if hint == StorageHint::Auto {
        return Ok(auto_storage(field, grid));
    }

    let (rows, cols) = (grid.rows, grid.cols);
    let zero = field.zero();

    let storage: Box<dyn Storage<F::Elem>> = match hint {
        StorageHint::Auto | StorageHint::Dense => field.dense_storage(rows, cols, grid.data),
        StorageHint::Sparse => Box::new(sparse_from_grid(field, grid)),
        StorageHint::Diagonal => {
            let n = require_square("Diagonal storage", rows, cols)?;
            let diag = (0..n).map(|i| grid.at(i, i).clone()).collect();
            Box::new(DiagonalStorage::from_diagonal(diag, zero).with_field(field))
        }
        StorageHint::Triangular => {
            let mut s = TriangularStorage::new(rows, cols, true, zero)?.with_field(field);
            for i in 0..rows {
                for j in i..cols {
                    s.set(i, j, grid.at(i, j).clone())?;
                }
            }
            Box::new(s)
        }
        StorageHint::Tridiagonal => {
            let mut s = TridiagonalStorage::new(rows, cols, zero)?.with_field(field);
            for i in 0..rows {
                for j in i.saturating_sub(1)..(i + 2).min(cols) {
                    s.set(i, j, grid.at(i, j).clone())?;
                }
            }
            Box::new(s)
        }
        StorageHint::Symmetric => {
            let mut s = SymmetricStorage::new(rows, cols, zero)?;
            for i in 0..rows {
                for j in i..cols {
                    s.set(i, j, grid.at(i, j).clone())?;
                }
            }
            Box::new(s)
        }
        StorageHint::Banded => {
            return Err(Error::Unsupported {
                feature: "automatic Banded construction from raw data",
            });
        }
    };
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{PrimeField, Reals};
    use crate::storage::{BufferMode, Layout};

    fn grid_with_zeros(zeros: usize) -> Grid<f64> {
        let data = (0..100).map(|k| if k < zeros { 0.0 } else { 1.0 }).collect();
        Grid::from_flat(10, 10, data).unwrap()
    }

    #[test]
    fn test_threshold_constant() {
        assert_eq!(SPARSITY_THRESHOLD, 0.2);
        assert_eq!(choose_layout(0.19), StorageHint::Sparse);
        assert_eq!(choose_layout(0.2), StorageHint::Dense);
    }

    #[test]
    fn test_auto_sparse_and_dense() {
        let s = build_storage(&Reals, grid_with_zeros(90), StorageHint::Auto).unwrap();
        assert_eq!(s.layout(), Layout::Sparse);

        let s = build_storage(&Reals, grid_with_zeros(0), StorageHint::Auto).unwrap();
        assert_eq!(s.layout(), Layout::Double(BufferMode::Heap));
    }

    #[test]
    fn test_auto_dense_generic_field() {
        let f = PrimeField::new(7).unwrap();
        let grid = Grid::from_rows(&[[1u64, 2], [3, 4]]).unwrap();
        let s = build_storage(&f, grid, StorageHint::Auto).unwrap();
        assert_eq!(s.layout(), Layout::Dense);
    }

    #[test]
    fn test_empty_is_dense() {
        let grid: Grid<f64> = Grid::from_rows::<Vec<f64>>(&[]).unwrap();
        assert_eq!(density(&Reals, &grid), 1.0);
        let s = build_storage(&Reals, grid, StorageHint::Auto).unwrap();
        assert_eq!(s.shape(), (0, 0));
    }

    #[test]
    fn test_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            Grid::from_rows(&rows),
            Err(Error::InvalidArgument { arg: "rows", .. })
        ));
    }

    #[test]
    fn test_triangular_drops_lower() {
        let grid = Grid::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let s = build_storage(&Reals, grid, StorageHint::Triangular).unwrap();
        assert_eq!(s.get(1, 0), 0.0);
        assert_eq!(s.get(0, 1), 2.0);
        assert_eq!(s.get(1, 1), 4.0);
    }

    #[test]
    fn test_square_only_hints() {
        for hint in [
            StorageHint::Diagonal,
            StorageHint::Triangular,
            StorageHint::Tridiagonal,
            StorageHint::Symmetric,
        ] {
            let grid = Grid::from_flat(2, 3, vec![1.0; 6]).unwrap();
            assert!(
                matches!(build_storage(&Reals, grid, hint), Err(Error::NonSquare { .. })),
                "{hint:?}"
            );
        }
    }

    #[test]
    fn test_banded_unsupported() {
        let grid = Grid::from_flat(2, 2, vec![1.0; 4]).unwrap();
        assert!(matches!(
            build_storage(&Reals, grid, StorageHint::Banded),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_unreduced_prime_zeros_stay_implicit() {
        let f = PrimeField::new(7).unwrap();
        // 7 and 14 are zero in Z/7Z
        let mut data = vec![7u64; 100];
        data[0] = 3;
        data[50] = 14;
        let grid = Grid::from_flat(10, 10, data).unwrap();
        assert_eq!(density(&f, &grid), 0.01);
        let s = build_storage(&f, grid, StorageHint::Auto).unwrap();
        assert_eq!(s.layout(), Layout::Sparse);
        assert_eq!(s.stored_len(), 1);

        let grid = Grid::from_rows(&[[1u64, 2], [7, 4]]).unwrap();
        let mut s = build_storage(&f, grid, StorageHint::Triangular).unwrap();
        assert!(s.set(1, 0, 21).is_ok());
        assert!(matches!(s.set(1, 0, 1), Err(Error::ShapeViolation { .. })));
    }

    #[test]
    fn test_tridiagonal_copy() {
        let grid = Grid::from_flat(3, 3, (1..=9).map(f64::from).collect()).unwrap();
        let s = build_storage(&Reals, grid, StorageHint::Tridiagonal).unwrap();
        assert_eq!(
            s.to_row_major(),
            vec![1.0, 2.0, 0.0, 4.0, 5.0, 6.0, 0.0, 8.0, 9.0]
        );
    }
}
