//! Primitive-double matrix specialization
//!
//! [`RealMatrix`] is permanently bound to [`Reals`] and always backed by a
//! [`DoubleStorage`]. Between two `RealMatrix` operands, `add`, `sub`,
//! `scale` and `multiply` run the bound provider's [`DoubleKernels`] directly
//! on the contiguous buffers; anything else goes through the generic
//! element-wise path.
//!
//! Result buffer modes:
//!
//! | Operation | Result mode |
//! |-----------|-------------|
//! | `add`, `sub`, `scale`, `negate` | mode of `self` |
//! | `multiply` | Direct if both operands are Direct, otherwise Heap |
//! | generic path, `transpose`, `submatrix`, `inverse` | Heap |

use super::core::Matrix;
use super::operand::{Operand, OperandView};
use crate::algorithm;
use crate::error::{Error, Result};
use crate::field::Reals;
use crate::provider::{DoubleKernels, LinearAlgebraProvider, ScalarKernels, registry};
use crate::selector::Grid;
use crate::storage::{BufferMode, DenseStorage, DoubleStorage, MatrixView, RawBuffer, Storage};
use log::trace;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Real matrix over a primitive f64 buffer
#[derive(Clone)]
pub struct RealMatrix {
    storage: DoubleStorage,
    provider: Arc<dyn LinearAlgebraProvider<Reals>>,
}

impl RealMatrix {
    /// Heap-backed matrix from row-major data
    pub fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        DoubleStorage::try_from_vec(rows, cols, data, BufferMode::Heap).map(Self::from_storage)
    }

    /// Direct-backed matrix from row-major data
    pub fn direct(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        DoubleStorage::try_from_vec(rows, cols, data, BufferMode::Direct).map(Self::from_storage)
    }

    /// Heap-backed matrix from rows of equal length
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let grid = Grid::from_rows(rows)?;
        let (r, c) = (grid.rows(), grid.cols());
        Ok(Self::from_storage(DoubleStorage::from_buffer(
            r,
            c,
            grid.into_data(),
            BufferMode::Heap,
        )))
    }

    pub fn zeros(rows: usize, cols: usize, mode: BufferMode) -> Self {
        Self::from_storage(DoubleStorage::zeros(rows, cols, mode))
    }

    /// Wrap storage, binding the registry's current best provider
    pub fn from_storage(storage: DoubleStorage) -> Self {
        Self {
            storage,
            provider: registry::linear_algebra::<Reals>(),
        }
    }

    /// Heap copy of a generic real matrix
    pub fn from_matrix(m: &Matrix<Reals>) -> Self {
        Self::from_storage(DoubleStorage::from_storage(m.storage(), BufferMode::Heap))
    }

    /// Rebind to an explicit provider
    pub fn with_provider(mut self, provider: Arc<dyn LinearAlgebraProvider<Reals>>) -> Self {
        self.provider = provider;
        self
    }

    /// Generic facade over the same storage and provider
    pub fn into_matrix(self) -> Matrix<Reals> {
        Matrix::from_storage(Reals, Box::new(self.storage)).with_provider(self.provider)
    }

    fn derive(&self, storage: DoubleStorage) -> Self {
        Self {
            storage,
            provider: Arc::clone(&self.provider),
        }
    }

    fn kernels(&self) -> &dyn DoubleKernels {
        self.provider.double_kernels().unwrap_or(&ScalarKernels)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.storage.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.storage.cols()
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.storage.shape()
    }

    pub fn mode(&self) -> BufferMode {
        self.storage.mode()
    }

    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.storage.get_double(row, col)
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<f64> {
        self.storage.try_get(row, col)
    }

    /// In-place write; the only mutation matrices expose
    ///
    /// Must not race with other access to the same matrix. Copies taken
    /// earlier (`submatrix`, `clone`) are unaffected.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.storage.set_double(row, col, value)
    }

    pub fn storage(&self) -> &DoubleStorage {
        &self.storage
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        self.storage.as_slice()
    }

    /// Contiguous buffer for native interop
    ///
    /// Zero-copy in Direct mode, a fresh copy in Heap mode; see
    /// [`DoubleStorage::raw_buffer`].
    pub fn raw_buffer(&mut self) -> RawBuffer<'_> {
        self.storage.raw_buffer()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    fn elementwise(
        &self,
        op: &'static str,
        other: &dyn Operand<f64>,
        kernel: impl Fn(&dyn DoubleKernels, &[f64], &[f64], &mut [f64]),
        generic: impl Fn(&DoubleStorage, &OperandView<'_, f64>) -> Result<DenseStorage<f64>>,
    ) -> Result<Self> {
        if let Some(rhs) = other.as_any().downcast_ref::<RealMatrix>() {
            if self.shape() != rhs.shape() {
                return Err(Error::dimension_mismatch(op, self.shape(), rhs.shape()));
            }
            let (rows, cols) = self.shape();
            let mut out = DoubleStorage::zeros(rows, cols, self.mode());
            kernel(
                self.kernels(),
                self.as_slice(),
                rhs.as_slice(),
                out.as_mut_slice(),
            );
            return Ok(self.derive(out));
        }

        let view = OperandView::new(op, other)?;
        let out = generic(&self.storage, &view)?;
        Ok(self.derive(heap(out)))
    }

    /// `self + other`
    pub fn add(&self, other: &dyn Operand<f64>) -> Result<Self> {
        self.elementwise(
            "add",
            other,
            |k, a, b, out| k.add(a, b, out),
            |a, b| algorithm::add(&Reals, a, b),
        )
    }

    /// `self - other`
    pub fn sub(&self, other: &dyn Operand<f64>) -> Result<Self> {
        self.elementwise(
            "sub",
            other,
            |k, a, b, out| k.sub(a, b, out),
            |a, b| algorithm::sub(&Reals, a, b),
        )
    }

    /// `self @ other`
    ///
    /// Fails with `DimensionMismatch` when `self.cols() != other.rows()`.
    pub fn multiply(&self, other: &dyn Operand<f64>) -> Result<Self> {
        if let Some(rhs) = other.as_any().downcast_ref::<RealMatrix>() {
            let (m, k) = self.shape();
            let (k2, n) = rhs.shape();
            if k != k2 {
                return Err(Error::dimension_mismatch("multiply", self.shape(), rhs.shape()));
            }

            let mode = match (self.mode(), rhs.mode()) {
                (BufferMode::Direct, BufferMode::Direct) => BufferMode::Direct,
                _ => BufferMode::Heap,
            };
            let kernels = self.kernels();
            trace!("gemm {}x{}x{} with {} kernels", m, k, n, kernels.name());

            let mut out = DoubleStorage::zeros(m, n, mode);
            kernels.gemm(self.as_slice(), rhs.as_slice(), out.as_mut_slice(), m, k, n);
            return Ok(self.derive(out));
        }

        let view = OperandView::new("multiply", other)?;
        let out = algorithm::matmul(&Reals, &self.storage, &view)?;
        Ok(self.derive(heap(out)))
    }

    /// `self @ x`
    pub fn multiply_vector(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.provider.multiply_vector(&Reals, &self.storage, x)
    }

    /// `factor * self`
    pub fn scale(&self, factor: f64) -> Self {
        let (rows, cols) = self.shape();
        let mut out = DoubleStorage::zeros(rows, cols, self.mode());
        self.kernels().scale(factor, self.as_slice(), out.as_mut_slice());
        self.derive(out)
    }

    pub fn negate(&self) -> Self {
        self.scale(-1.0)
    }

    pub fn transpose(&self) -> Self {
        self.derive(heap(algorithm::transpose::<f64, _>(&self.storage)))
    }

    pub fn trace(&self) -> f64 {
        algorithm::trace(&Reals, &self.storage)
    }

    pub fn determinant(&self) -> Result<f64> {
        self.provider.determinant(&Reals, &self.storage)
    }

    pub fn inverse(&self) -> Result<Self> {
        let out = self.provider.inverse(&Reals, &self.storage)?;
        Ok(self.derive(DoubleStorage::from_storage(&*out, BufferMode::Heap)))
    }

    /// Heap copy of rows `row_start..row_end`, columns `col_start..col_end`
    ///
    /// Later writes through [`RealMatrix::set`] do not reach the copy.
    pub fn submatrix(
        &self,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
    ) -> Result<Self> {
        let out = algorithm::submatrix::<f64, _>(
            &self.storage,
            row_start,
            row_end,
            col_start,
            col_end,
        )?;
        Ok(self.derive(heap(out)))
    }
}

fn heap(dense: DenseStorage<f64>) -> DoubleStorage {
    let (rows, cols, data) = dense.into_parts();
    DoubleStorage::from_buffer(rows, cols, data, BufferMode::Heap)
}

impl MatrixView<f64> for RealMatrix {
    fn rows(&self) -> usize {
        self.storage.rows()
    }

    fn cols(&self) -> usize {
        self.storage.cols()
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.storage.get_double(row, col)
    }
}

impl Operand<f64> for RealMatrix {
    fn matrix_shape(&self) -> Option<(usize, usize)> {
        Some(self.shape())
    }

    fn element(&self, row: usize, col: usize) -> f64 {
        self.storage.get_double(row, col)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Equal shape and entries; the buffer mode is not compared
impl PartialEq for RealMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for RealMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealMatrix")
            .field("shape", &self.shape())
            .field("mode", &self.mode())
            .field("provider", &self.provider.name())
            .field("data", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CpuNaiveProvider;

    #[test]
    fn test_gemm_2x2() {
        let a = RealMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = RealMatrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
        let c = a.multiply(&b).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
        assert_eq!(c.mode(), BufferMode::Heap);
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = RealMatrix::zeros(2, 3, BufferMode::Heap);
        let b = RealMatrix::zeros(2, 2, BufferMode::Heap);
        assert_eq!(
            a.multiply(&b).unwrap_err(),
            Error::dimension_mismatch("multiply", (2, 3), (2, 2))
        );
    }

    #[test]
    fn test_result_modes() {
        let d = RealMatrix::direct(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let h = RealMatrix::from_flat(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();

        assert_eq!(d.add(&h).unwrap().mode(), BufferMode::Direct);
        assert_eq!(h.add(&d).unwrap().mode(), BufferMode::Heap);
        assert_eq!(d.multiply(&d).unwrap().mode(), BufferMode::Direct);
        assert_eq!(d.multiply(&h).unwrap().mode(), BufferMode::Heap);
        assert_eq!(d.scale(2.0).mode(), BufferMode::Direct);
    }

    #[test]
    fn test_submatrix_survives_set() {
        let mut a = RealMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let sub = a.submatrix(0, 1, 0, 2).unwrap();
        a.set(0, 0, 100.0).unwrap();
        assert_eq!(sub.as_slice(), &[1.0, 2.0]);
        assert_eq!(a.get(0, 0), 100.0);
    }

    #[test]
    fn test_generic_operand_gives_heap() {
        let d = RealMatrix::direct(1, 2, vec![1.0, 2.0]).unwrap();
        let g = Matrix::from_rows(Reals, &[[3.0, 4.0]]).unwrap();
        let sum = d.add(&g).unwrap();
        assert_eq!(sum.as_slice(), &[4.0, 6.0]);
        assert_eq!(sum.mode(), BufferMode::Heap);
    }

    #[test]
    fn test_naive_provider_uses_scalar_kernels() {
        let a = RealMatrix::from_flat(1, 3, vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_provider(Arc::new(CpuNaiveProvider::new()));
        assert_eq!(a.provider_name(), "cpu-naive");
        assert_eq!(a.negate().as_slice(), &[-1.0, -2.0, -3.0]);
        assert_eq!(a.sub(&a).unwrap().as_slice(), &[0.0; 3]);
    }

    #[test]
    fn test_inverse_and_into_matrix() {
        let a = RealMatrix::from_rows(&[[4.0, 7.0], [2.0, 6.0]]).unwrap();
        let inv = a.inverse().unwrap();
        let id = a.multiply(&inv).unwrap();
        for (got, want) in id.as_slice().iter().zip([1.0, 0.0, 0.0, 1.0]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!((a.determinant().unwrap() - 10.0).abs() < 1e-12);

        let m = a.clone().into_matrix();
        assert_eq!(RealMatrix::from_matrix(&m), a);
    }
}
