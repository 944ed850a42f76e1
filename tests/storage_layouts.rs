//! Storage layouts and automatic layout selection

mod common;

use common::{filled_reals, init_logging};
use matrixkit::prelude::*;
use matrixkit::selector::{self, Grid, SPARSITY_THRESHOLD};
use matrixkit::storage::{
    DiagonalStorage, DoubleStorage, SymmetricStorage, TriangularStorage, TridiagonalStorage,
};

/// 10x10 real data with `non_zero` leading non-zero entries
fn ten_by_ten(non_zero: usize) -> Vec<f64> {
    (0..100).map(|k| if k < non_zero { 1.0 + k as f64 } else { 0.0 }).collect()
}

#[test]
fn test_sparsity_threshold_is_pinned() {
    // Density strictly below 20% non-zero selects sparse storage.
    assert_eq!(SPARSITY_THRESHOLD, 0.2);
}

#[test]
fn test_auto_selects_sparse_for_mostly_zero_input() {
    init_logging();
    let m = Matrix::from_flat(Reals, 10, 10, ten_by_ten(10)).unwrap();
    assert_eq!(m.layout(), Layout::Sparse);
    assert_eq!(m.storage().stored_len(), 10);
    assert_eq!(m.get(0, 9), 10.0);
    assert_eq!(m.get(9, 9), 0.0);
}

#[test]
fn test_auto_selects_dense_for_full_input() {
    let m = Matrix::from_flat(Reals, 10, 10, filled_reals(10, 10)).unwrap();
    assert_eq!(m.layout(), Layout::Double(BufferMode::Heap));

    let f = PrimeField::new(101).unwrap();
    let data: Vec<u64> = (1..=100).collect();
    let m = Matrix::from_flat(f, 10, 10, data).unwrap();
    assert_eq!(m.layout(), Layout::Dense);
}

#[test]
fn test_auto_threshold_boundary() {
    // 19 non-zero of 100 is below the threshold, 20 is not
    let below = Matrix::from_flat(Reals, 10, 10, ten_by_ten(19)).unwrap();
    let at = Matrix::from_flat(Reals, 10, 10, ten_by_ten(20)).unwrap();
    assert_eq!(below.layout(), Layout::Sparse);
    assert_eq!(at.layout(), Layout::Double(BufferMode::Heap));
}

#[test]
fn test_seventy_percent_zero_rule_is_not_used() {
    // 75% zeros would count as sparse under a "more than 70% zero" rule.
    // Only the non-zero density threshold applies, so this stays dense.
    let m = Matrix::from_flat(Reals, 10, 10, ten_by_ten(25)).unwrap();
    assert_eq!(m.layout(), Layout::Double(BufferMode::Heap));
    assert_eq!(selector::choose_layout(0.25), StorageHint::Dense);
}

#[test]
fn test_density_ignores_layout_hint() {
    let grid = Grid::from_flat(2, 2, vec![0.0, 0.0, 0.0, 3.0]).unwrap();
    assert_eq!(selector::density(&Reals, &grid), 0.25);

    // An explicit hint wins over the density
    let m = Matrix::from_flat_with(Reals, 2, 2, vec![0.0; 4], StorageHint::Dense).unwrap();
    assert_eq!(m.layout(), Layout::Double(BufferMode::Heap));
}

#[test]
fn test_square_only_constructors_reject_rectangles() {
    assert!(matches!(
        DiagonalStorage::new(2, 3, 0.0),
        Err(Error::NonSquare { rows: 2, cols: 3, .. })
    ));
    assert!(matches!(
        TriangularStorage::new(3, 2, true, 0.0),
        Err(Error::NonSquare { rows: 3, cols: 2, .. })
    ));
    assert!(matches!(
        TridiagonalStorage::new(1, 4, 0.0),
        Err(Error::NonSquare { .. })
    ));
    assert!(matches!(
        SymmetricStorage::new(4, 1, 0.0),
        Err(Error::NonSquare { .. })
    ));
}

#[test]
fn test_square_only_hints_reject_rectangles() {
    let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    for hint in [
        StorageHint::Diagonal,
        StorageHint::Triangular,
        StorageHint::Tridiagonal,
        StorageHint::Symmetric,
    ] {
        assert!(
            matches!(
                Matrix::from_rows_with(Reals, &rows, hint),
                Err(Error::NonSquare { rows: 2, cols: 3, .. })
            ),
            "{:?}",
            hint
        );
    }
}

#[test]
fn test_triangular_construction_drops_lower_entries() {
    let m = Matrix::from_rows_with(Reals, &[[1.0, 2.0], [3.0, 4.0]], StorageHint::Triangular)
        .unwrap();
    assert_eq!(m.layout(), Layout::Triangular { upper: true });
    assert_eq!(m.get(1, 0), 0.0);
    assert_eq!(m.get(0, 1), 2.0);
    assert_eq!(m.get(1, 1), 4.0);
}

#[test]
fn test_writes_outside_support_are_shape_violations() {
    let mut tri = TriangularStorage::new(3, 3, true, 0.0).unwrap();
    tri.set(0, 2, 1.0).unwrap();
    assert_eq!(
        tri.set(2, 0, 1.0),
        Err(Error::ShapeViolation {
            layout: "Triangular",
            row: 2,
            col: 0
        })
    );

    let mut diag = DiagonalStorage::new(2, 2, 0u64).unwrap();
    assert!(matches!(
        diag.set(0, 1, 5),
        Err(Error::ShapeViolation { layout: "Diagonal", .. })
    ));

    let mut band = TridiagonalStorage::new(4, 4, 0.0).unwrap();
    band.set(1, 2, 9.0).unwrap();
    assert!(matches!(
        band.set(0, 3, 9.0),
        Err(Error::ShapeViolation { layout: "Tridiagonal", .. })
    ));
}

#[test]
fn test_symmetric_writes_mirror() {
    let mut s = SymmetricStorage::new(3, 3, 0.0).unwrap();
    s.set(2, 0, 7.0).unwrap();
    assert_eq!(s.get(0, 2), 7.0);
    assert_eq!(s.get(2, 0), 7.0);
}

#[test]
fn test_banded_hint_is_unsupported() {
    let result = Matrix::from_rows_with(Reals, &[[1.0, 2.0], [3.0, 4.0]], StorageHint::Banded);
    assert!(matches!(result, Err(Error::Unsupported { .. })));
}

#[test]
fn test_ragged_rows_are_rejected() {
    let rows: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(Matrix::from_rows(Reals, &rows).is_err());
}

#[test]
fn test_double_storage_modes() {
    for mode in [BufferMode::Heap, BufferMode::Direct] {
        let mut s = DoubleStorage::try_from_vec(2, 3, filled_reals(2, 3), mode).unwrap();
        s.set_double(1, 2, -1.0).unwrap();
        assert_eq!(s.get_double(1, 2), -1.0);
        assert_eq!(s.layout(), Layout::Double(mode));
        assert!(s.set_double(2, 0, 0.0).is_err());
    }

    assert!(DoubleStorage::try_from_vec(2, 2, vec![1.0], BufferMode::Direct).is_err());
}

#[test]
fn test_raw_buffer_shares_only_direct_memory() {
    let mut direct = DoubleStorage::from_buffer(1, 3, vec![1.0, 2.0, 3.0], BufferMode::Direct);
    {
        let mut raw = direct.raw_buffer();
        assert!(raw.is_zero_copy());
        raw.as_mut_slice()[0] = 10.0;
    }
    assert_eq!(direct.get_double(0, 0), 10.0);

    let mut heap = DoubleStorage::from_buffer(1, 3, vec![1.0, 2.0, 3.0], BufferMode::Heap);
    {
        let mut raw = heap.raw_buffer();
        assert!(!raw.is_zero_copy());
        assert_eq!(raw.as_slice(), &[1.0, 2.0, 3.0]);
        raw.as_mut_slice()[0] = 10.0;
    }
    assert_eq!(heap.get_double(0, 0), 1.0);
}
