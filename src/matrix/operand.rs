//! Right-hand operands of matrix algebra

use crate::error::{Error, Result};
use crate::field::Scalar;
use crate::storage::{MatrixView, assert_index};
use crate::tensor::Tensor;
use std::any::Any;

/// Anything that can stand on the right of a matrix operation
///
/// A facade receiving an operand of its own concrete type hands both storages
/// to its provider. Any other operand with two-dimensional element access goes
/// through the generic element-wise path. Operands without it are rejected
/// with [`Error::UnsupportedCombination`].
pub trait Operand<E>: Send + Sync {
    /// `(rows, cols)` if the operand has two-dimensional element access
    fn matrix_shape(&self) -> Option<(usize, usize)>;

    /// Element at `(row, col)`; only called inside `matrix_shape`
    fn element(&self, row: usize, col: usize) -> E;

    /// Downcast support for same-type dispatch
    fn as_any(&self) -> &dyn Any;
}

/// [`MatrixView`] over an operand that has two-dimensional access
pub(crate) struct OperandView<'a, E> {
    operand: &'a dyn Operand<E>,
    rows: usize,
    cols: usize,
}

impl<'a, E> OperandView<'a, E> {
    pub(crate) fn new(op: &'static str, operand: &'a dyn Operand<E>) -> Result<Self> {
        let (rows, cols) = operand.matrix_shape().ok_or_else(|| {
            Error::unsupported_combination(op, "operand has no two-dimensional element access")
        })?;
        Ok(Self {
            operand,
            rows,
            cols,
        })
    }
}

impl<E> MatrixView<E> for OperandView<'_, E> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, row: usize, col: usize) -> E {
        assert_index(self.rows, self.cols, row, col);
        self.operand.element(row, col)
    }
}

/// Rank-2 tensors act as matrices; other ranks have no matrix access
impl<E: Scalar> Operand<E> for Tensor<E> {
    fn matrix_shape(&self) -> Option<(usize, usize)> {
        match self.shape().as_slice() {
            &[rows, cols] => Some((rows, cols)),
            _ => None,
        }
    }

    fn element(&self, row: usize, col: usize) -> E {
        self.at_flat(row * self.shape()[1] + col)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
