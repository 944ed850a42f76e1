//! # matrixkit
//!
//! **Matrices and tensors over pluggable fields, with swappable compute providers.**
//!
//! matrixkit separates three concerns:
//!
//! - **Fields** define the element arithmetic: [`Reals`](field::Reals) (f64),
//!   [`PrimeField`](field::PrimeField) (integers mod p) and
//!   [`FloatField`](field::FloatField) for other float types.
//! - **Storage layouts** hold the elements: dense, sparse, diagonal,
//!   triangular, tridiagonal, symmetric, banded and a primitive f64 buffer
//!   that can live on the heap or in aligned native memory.
//! - **Providers** do the numeric work. Each field has a registry that binds
//!   the highest-priority available provider to every new matrix: a naive
//!   CPU implementation, SIMD kernels for f64, and optional native CPU/CUDA
//!   tensor backends loaded at runtime.
//!
//! ## Quick Start
//!
//! ```
//! use matrixkit::prelude::*;
//!
//! let a = Matrix::from_rows(Reals, &[[1.0, 2.0], [3.0, 4.0]])?;
//! let b = Matrix::identity(Reals, 2);
//! assert_eq!(a.multiply(&b)?, a);
//!
//! let x = RealMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
//! let y = x.multiply(&x)?;
//! assert_eq!(y.as_slice(), &[7.0, 10.0, 15.0, 22.0]);
//! # Ok::<(), matrixkit::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `simd` (default): AVX-512 / AVX2 / NEON f64 kernels, detected at runtime
//! - `rayon`: row-parallel matrix multiplication above a size threshold
//! - `native`: tensor providers backed by a dynamically loaded native library
//!
//! ## Configuration
//!
//! Runtime switches are read once from the environment, see
//! [`EngineConfig`](config::EngineConfig).

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod config;
pub mod error;
pub mod field;
pub mod matrix;
pub mod provider;
pub mod selector;
pub mod storage;
pub mod tensor;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{Error, Result};
    pub use crate::field::{Field, FloatField, PrimeField, Reals};
    pub use crate::matrix::{Matrix, Operand, RealMatrix, Vector};
    pub use crate::provider::{
        DeviceKind, ExecutionContext, LinearAlgebraProvider, Provider, TensorProvider,
    };
    pub use crate::selector::StorageHint;
    pub use crate::storage::{BufferMode, Layout, MatrixView, Storage};
    pub use crate::tensor::Tensor;
}
