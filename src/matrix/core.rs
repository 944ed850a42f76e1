//! Generic matrix facade

use super::operand::{Operand, OperandView};
use super::vector::Vector;
use crate::algorithm;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::provider::{LinearAlgebraProvider, registry};
use crate::selector::{self, Grid, StorageHint};
use crate::storage::{Layout, MatrixView, Storage};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Matrix over the field `F`
///
/// A matrix owns its storage, the field it computes in and the provider it
/// was bound to at construction. Algebra never mutates: every operation
/// returns a new matrix with new storage, bound to the same provider.
///
/// Operations take the right-hand side as a [`Operand`]. Another `Matrix<F>`
/// over an equal field goes to the provider; any other operand with matrix
/// access takes the element-wise path and yields plain dense storage.
///
/// ```
/// use matrixkit::prelude::*;
///
/// let a = Matrix::from_rows(Reals, &[[1.0, 2.0], [3.0, 4.0]])?;
/// let b = Matrix::from_rows(Reals, &[[5.0, 6.0], [7.0, 8.0]])?;
/// let c = a.multiply(&b)?;
/// assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
/// # Ok::<(), matrixkit::Error>(())
/// ```
#[derive(Clone)]
pub struct Matrix<F: Field> {
    storage: Box<dyn Storage<F::Elem>>,
    field: F,
    provider: Arc<dyn LinearAlgebraProvider<F>>,
}

impl<F: Field> Matrix<F> {
    /// Build from rows, choosing the layout by density
    pub fn from_rows<R: AsRef<[F::Elem]>>(field: F, rows: &[R]) -> Result<Self> {
        Self::from_rows_with(field, rows, StorageHint::Auto)
    }

    /// Build from rows in the requested layout
    pub fn from_rows_with<R: AsRef<[F::Elem]>>(
        field: F,
        rows: &[R],
        hint: StorageHint,
    ) -> Result<Self> {
        let grid = Grid::from_rows(rows)?;
        let storage = selector::build_storage(&field, grid, hint)?;
        Ok(Self::from_storage(field, storage))
    }

    /// Build from row-major data, choosing the layout by density
    pub fn from_flat(field: F, rows: usize, cols: usize, data: Vec<F::Elem>) -> Result<Self> {
        Self::from_flat_with(field, rows, cols, data, StorageHint::Auto)
    }

    /// Build from row-major data in the requested layout
    pub fn from_flat_with(
        field: F,
        rows: usize,
        cols: usize,
        data: Vec<F::Elem>,
        hint: StorageHint,
    ) -> Result<Self> {
        let grid = Grid::from_flat(rows, cols, data)?;
        let storage = selector::build_storage(&field, grid, hint)?;
        Ok(Self::from_storage(field, storage))
    }

    /// Wrap existing storage, binding the registry's current best provider
    pub fn from_storage(field: F, storage: Box<dyn Storage<F::Elem>>) -> Self {
        let provider = registry::linear_algebra::<F>();
        Self {
            storage,
            field,
            provider,
        }
    }

    /// Rebind to an explicit provider
    pub fn with_provider(mut self, provider: Arc<dyn LinearAlgebraProvider<F>>) -> Self {
        self.provider = provider;
        self
    }

    /// `n x n` identity, laid out by density like any other input
    pub fn identity(field: F, n: usize) -> Self {
        let (_, _, data) = algorithm::identity(&field, n).into_parts();
        Self::auto(field, n, n, data)
    }

    /// `rows x cols` matrix of the field's zero
    pub fn zeros(field: F, rows: usize, cols: usize) -> Self {
        let data = vec![field.zero(); rows * cols];
        Self::auto(field, rows, cols, data)
    }

    fn auto(field: F, rows: usize, cols: usize, data: Vec<F::Elem>) -> Self {
        let grid = Grid::from_flat(rows, cols, data)
            .expect("element count matches the requested dimensions");
        let storage = selector::auto_storage(&field, grid);
        Self::from_storage(field, storage)
    }

    /// Result of an operation on this matrix, bound to the same provider
    fn derive(&self, storage: Box<dyn Storage<F::Elem>>) -> Self {
        Self {
            storage,
            field: self.field.clone(),
            provider: Arc::clone(&self.provider),
        }
    }

    /// Same-type operand over an equal field, if `other` is one
    fn peer<'a>(&self, op: &'static str, other: &'a dyn Operand<F::Elem>) -> Result<Option<&'a Self>> {
        match other.as_any().downcast_ref::<Self>() {
            Some(m) if m.field != self.field => Err(Error::unsupported_combination(
                op,
                format!("operands over different fields: {:?} vs {:?}", self.field, m.field),
            )),
            found => Ok(found),
        }
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

    /// Element at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds; see [`Matrix::try_get`].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> F::Elem {
        self.storage.get(row, col)
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<F::Elem> {
        self.storage.try_get(row, col)
    }

    /// The field this matrix computes in
    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn layout(&self) -> Layout {
        self.storage.layout()
    }

    pub fn storage(&self) -> &dyn Storage<F::Elem> {
        self.storage.as_ref()
    }

    /// Name of the bound provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// `self + other`
    pub fn add(&self, other: &dyn Operand<F::Elem>) -> Result<Self> {
        if let Some(m) = self.peer("add", other)? {
            let out = self
                .provider
                .add(&self.field, self.storage.as_ref(), m.storage.as_ref())?;
            return Ok(self.derive(out));
        }
        let view = OperandView::new("add", other)?;
        let out = algorithm::add(&self.field, self.storage.as_ref(), &view)?;
        Ok(self.derive(Box::new(out)))
    }

    /// `self - other`
    pub fn sub(&self, other: &dyn Operand<F::Elem>) -> Result<Self> {
        if let Some(m) = self.peer("sub", other)? {
            let out = self
                .provider
                .sub(&self.field, self.storage.as_ref(), m.storage.as_ref())?;
            return Ok(self.derive(out));
        }
        let view = OperandView::new("sub", other)?;
        let out = algorithm::sub(&self.field, self.storage.as_ref(), &view)?;
        Ok(self.derive(Box::new(out)))
    }

    /// `self @ other`
    pub fn multiply(&self, other: &dyn Operand<F::Elem>) -> Result<Self> {
        if let Some(m) = self.peer("multiply", other)? {
            let out = self
                .provider
                .multiply(&self.field, self.storage.as_ref(), m.storage.as_ref())?;
            return Ok(self.derive(out));
        }
        let view = OperandView::new("multiply", other)?;
        let out = algorithm::matmul(&self.field, self.storage.as_ref(), &view)?;
        Ok(self.derive(Box::new(out)))
    }

    /// `self @ x`
    pub fn multiply_vector(&self, x: &Vector<F>) -> Result<Vector<F>> {
        if x.field() != &self.field {
            return Err(Error::unsupported_combination(
                "multiply_vector",
                "matrix and vector over different fields",
            ));
        }
        let out = self
            .provider
            .multiply_vector(&self.field, self.storage.as_ref(), x.as_slice())?;
        Ok(Vector::from_vec(self.field.clone(), out))
    }

    pub fn transpose(&self) -> Self {
        self.derive(self.provider.transpose(&self.field, self.storage.as_ref()))
    }

    /// Sum of `get(i, i)` for `i < min(rows, cols)`, seeded at zero
    pub fn trace(&self) -> F::Elem {
        algorithm::trace(&self.field, self.storage.as_ref())
    }

    pub fn determinant(&self) -> Result<F::Elem> {
        self.provider.determinant(&self.field, self.storage.as_ref())
    }

    pub fn inverse(&self) -> Result<Self> {
        let out = self.provider.inverse(&self.field, self.storage.as_ref())?;
        Ok(self.derive(out))
    }

    /// `x` with `self @ x == b`
    pub fn solve(&self, b: &Matrix<F>) -> Result<Self> {
        if b.field != self.field {
            return Err(Error::unsupported_combination(
                "solve",
                "operands over different fields",
            ));
        }
        let out = self
            .provider
            .solve(&self.field, self.storage.as_ref(), b.storage.as_ref())?;
        Ok(self.derive(out))
    }

    /// Dense copy of rows `row_start..row_end`, columns `col_start..col_end`
    ///
    /// Ranges are half-open. The result is independent of `self`.
    pub fn submatrix(
        &self,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
    ) -> Result<Self> {
        let out = algorithm::submatrix::<F::Elem, _>(
            self.storage.as_ref(),
            row_start,
            row_end,
            col_start,
            col_end,
        )?;
        Ok(self.derive(Box::new(out)))
    }

    /// `factor * self`
    pub fn scale(&self, factor: &F::Elem) -> Self {
        self.derive(self.provider.scale(&self.field, factor, self.storage.as_ref()))
    }

    /// `scale(-1)`
    pub fn negate(&self) -> Self {
        let minus_one = self.field.neg(&self.field.one());
        self.scale(&minus_one)
    }

    /// Additive identity of the same shape
    pub fn zero(&self) -> Self {
        let (rows, cols) = self.shape();
        let data = vec![self.field.zero(); rows * cols];
        let grid = Grid::from_flat(rows, cols, data)
            .expect("element count matches the matrix shape");
        self.derive(selector::auto_storage(&self.field, grid))
    }

    /// Multiplicative identity of the same shape
    ///
    /// Fails with `NonSquare` for a non-square matrix.
    pub fn one(&self) -> Result<Self> {
        let (rows, cols) = self.shape();
        if rows != cols {
            return Err(Error::non_square("one", rows, cols));
        }
        let (_, _, data) = algorithm::identity(&self.field, rows).into_parts();
        let grid = Grid::from_flat(rows, cols, data)?;
        Ok(self.derive(selector::auto_storage(&self.field, grid)))
    }

    /// Elements as rows
    pub fn to_rows(&self) -> Vec<Vec<F::Elem>> {
        let cols = self.cols();
        if cols == 0 {
            return vec![Vec::new(); self.rows()];
        }
        self.storage
            .to_row_major()
            .chunks(cols)
            .map(<[F::Elem]>::to_vec)
            .collect()
    }
}

impl<F: Field> MatrixView<F::Elem> for Matrix<F> {
    fn rows(&self) -> usize {
        self.storage.rows()
    }

    fn cols(&self) -> usize {
        self.storage.cols()
    }

    fn get(&self, row: usize, col: usize) -> F::Elem {
        self.storage.get(row, col)
    }
}

impl<F: Field> Operand<F::Elem> for Matrix<F> {
    fn matrix_shape(&self) -> Option<(usize, usize)> {
        Some(self.shape())
    }

    fn element(&self, row: usize, col: usize) -> F::Elem {
        self.storage.get(row, col)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Equal shape and entries equal under [`Field::eq`], whatever the layouts
impl<F: Field> PartialEq for Matrix<F> {
    fn eq(&self, other: &Self) -> bool {
        if self.field != other.field || self.shape() != other.shape() {
            return false;
        }
        let (rows, cols) = self.shape();
        (0..rows).all(|i| {
            (0..cols).all(|j| self.field.elem_eq(&self.get(i, j), &other.get(i, j)))
        })
    }
}

impl<F: Field> fmt::Debug for Matrix<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("shape", &self.shape())
            .field("layout", &self.layout())
            .field("field", &self.field)
            .field("provider", &self.provider.name())
            .field("rows", &self.to_rows())
            .finish()
    }
}
