//! Matrix storage layouts
//!
//! A storage holds the `rows x cols` elements of a matrix and nothing else: it
//! has no algebra. Structured layouts keep only their structural support and
//! answer reads outside of it with the zero they were built with.
//!
//! | Layout | Shape | Support |
//! |--------|-------|---------|
//! | [`DenseStorage`] | any | every entry |
//! | [`SparseStorage`] | any | non-zero entries (ordered map) |
//! | [`DiagonalStorage`] | square | `i == j` |
//! | [`TriangularStorage`] | square | `i <= j` (upper) or `i >= j` (lower) |
//! | [`TridiagonalStorage`] | square | `|i - j| <= 1` |
//! | [`SymmetricStorage`] | square | every entry, `(i, j)` aliases `(j, i)` |
//! | [`BandedStorage`] | any | `j - upper <= i <= j + lower` |
//! | [`DoubleStorage`] | any | every entry, primitive f64 (Heap or Direct) |

mod banded;
mod dense;
mod diagonal;
mod direct;
mod double;
mod sparse;
mod symmetric;
mod triangular;
mod tridiagonal;

pub use banded::BandedStorage;
pub use dense::DenseStorage;
pub use diagonal::DiagonalStorage;
pub use direct::DirectBuffer;
pub use double::{BufferMode, DoubleStorage, RawBuffer};
pub use sparse::SparseStorage;
pub use symmetric::SymmetricStorage;
pub use triangular::TriangularStorage;
pub use tridiagonal::TridiagonalStorage;

use crate::error::{Error, Result};
use std::any::Any;
use std::fmt;

/// Read access to a two-dimensional grid of elements
pub trait MatrixView<E> {
    /// Number of rows
    fn rows(&self) -> usize;

    /// Number of columns
    fn cols(&self) -> usize;

    /// Element at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if the index is outside `rows x cols`, like slice indexing.
    fn get(&self, row: usize, col: usize) -> E;

    /// Shape as `(rows, cols)`
    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Copy all elements in row-major order
    fn to_row_major(&self) -> Vec<E> {
        let (rows, cols) = self.shape();
        let mut out = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                out.push(self.get(i, j));
            }
        }
        out
    }
}

/// Storage layout tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Row-major array of every element
    Dense,
    /// Ordered map of non-zero elements
    Sparse,
    /// Main diagonal only
    Diagonal,
    /// Packed triangle
    Triangular {
        /// Upper (`i <= j`) or lower (`i >= j`) triangle
        upper: bool,
    },
    /// Sub-, main and super-diagonal
    Tridiagonal,
    /// Packed upper triangle mirrored across the diagonal
    Symmetric,
    /// Fixed number of sub- and super-diagonals
    Banded {
        /// Number of sub-diagonals
        lower: usize,
        /// Number of super-diagonals
        upper: usize,
    },
    /// Primitive f64 buffer
    Double(BufferMode),
}

impl Layout {
    /// Returns the layout name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Dense => "Dense",
            Layout::Sparse => "Sparse",
            Layout::Diagonal => "Diagonal",
            Layout::Triangular { .. } => "Triangular",
            Layout::Tridiagonal => "Tridiagonal",
            Layout::Symmetric => "Symmetric",
            Layout::Banded { .. } => "Banded",
            Layout::Double(BufferMode::Heap) => "Double(Heap)",
            Layout::Double(BufferMode::Direct) => "Double(Direct)",
        }
    }

    /// Returns true if the layout only accepts square shapes
    pub fn requires_square(&self) -> bool {
        matches!(
            self,
            Layout::Diagonal | Layout::Triangular { .. } | Layout::Tridiagonal | Layout::Symmetric
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete in-memory layout of a matrix's elements
pub trait Storage<E>: MatrixView<E> + fmt::Debug + Send + Sync {
    /// Layout tag of this storage
    fn layout(&self) -> Layout;

    /// Write `value` at `(row, col)`
    ///
    /// Structured layouts reject non-zero writes outside their support with
    /// [`Error::ShapeViolation`].
    fn set(&mut self, row: usize, col: usize, value: E) -> Result<()>;

    /// Number of element slots actually held in memory
    fn stored_len(&self) -> usize;

    /// Clone into a new boxed storage
    fn clone_box(&self) -> Box<dyn Storage<E>>;

    /// Downcast support for layout-specific fast paths
    fn as_any(&self) -> &dyn Any;

    /// Bounds-checked read
    fn try_get(&self, row: usize, col: usize) -> Result<E> {
        check_index(self.rows(), self.cols(), row, col)?;
        Ok(self.get(row, col))
    }
}

impl<E> Clone for Box<dyn Storage<E>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Validate `(row, col)` against a `rows x cols` shape
#[inline]
pub(crate) fn check_index(rows: usize, cols: usize, row: usize, col: usize) -> Result<()> {
    if row >= rows {
        return Err(Error::IndexOutOfBounds {
            index: row,
            size: rows,
        });
    }
    if col >= cols {
        return Err(Error::IndexOutOfBounds {
            index: col,
            size: cols,
        });
    }
    Ok(())
}

/// Panic with a uniform message for out-of-range reads
#[inline]
#[track_caller]
pub(crate) fn assert_index(rows: usize, cols: usize, row: usize, col: usize) {
    assert!(
        row < rows && col < cols,
        "index ({}, {}) out of bounds for {}x{} matrix",
        row,
        col,
        rows,
        cols
    );
}

/// Reject a non-square shape for a square-only layout
#[inline]
pub(crate) fn require_square(what: &'static str, rows: usize, cols: usize) -> Result<usize> {
    if rows != cols {
        return Err(Error::non_square(what, rows, cols));
    }
    Ok(rows)
}
