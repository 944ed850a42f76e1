//! Error types for matrixkit

use thiserror::Error;

/// Result type alias using matrixkit's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in matrixkit operations
///
/// Only malformed input is reported through the algebra path. A provider that
/// is not available is silently replaced by the next one in the registry; the
/// `BackendUnavailable` variant only shows up when a caller explicitly asks a
/// specific provider for its resources.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Operand shapes are incompatible for the operation
    #[error("Dimension mismatch in '{op}': {lhs:?} vs {rhs:?}")]
    DimensionMismatch {
        /// The operation name
        op: &'static str,
        /// Left-hand side shape as (rows, cols)
        lhs: (usize, usize),
        /// Right-hand side shape as (rows, cols)
        rhs: (usize, usize),
    },

    /// A square-only layout or operation was given non-square data
    #[error("{what} requires a square shape, got {rows}x{cols}")]
    NonSquare {
        /// The layout or operation requiring squareness
        what: &'static str,
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Write outside the supported region of a structured layout
    #[error("Cannot write ({row}, {col}) in {layout} storage: outside structural support")]
    ShapeViolation {
        /// The layout rejecting the write
        layout: &'static str,
        /// Row index of the write
        row: usize,
        /// Column index of the write
        col: usize,
    },

    /// Algebra between operand types with no generic fallback
    #[error("Unsupported operand combination for '{op}': {reason}")]
    UnsupportedCombination {
        /// The operation name
        op: &'static str,
        /// Why the operands cannot be combined
        reason: String,
    },

    /// Requested layout or conversion is not implemented
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Description of the unsupported feature
        feature: &'static str,
    },

    /// A provider's resources were demanded but the provider is not available
    #[error("Backend '{provider}' unavailable: {reason}")]
    BackendUnavailable {
        /// Provider name
        provider: &'static str,
        /// Why the backend is unavailable
        reason: String,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Matrix is singular (inverse, solve, division by zero)
    #[error("Matrix is singular")]
    Singular,

    /// Failure reported by a native runtime call
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(op: &'static str, lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        Self::DimensionMismatch { op, lhs, rhs }
    }

    /// Create a non-square shape error
    pub fn non_square(what: &'static str, rows: usize, cols: usize) -> Self {
        Self::NonSquare { what, rows, cols }
    }

    /// Create a shape violation error
    pub fn shape_violation(layout: &'static str, row: usize, col: usize) -> Self {
        Self::ShapeViolation { layout, row, col }
    }

    /// Create an unsupported combination error
    pub fn unsupported_combination(op: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedCombination {
            op,
            reason: reason.into(),
        }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
