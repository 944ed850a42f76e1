//! CPU-naive provider: the reference implementation for every field

use super::{
    DEFAULT_PRIORITY, DoubleKernels, LinearAlgebraProvider, Provider, ScalarKernels, TensorProvider,
    materialize,
};
use crate::algorithm;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::storage::{DenseStorage, MatrixView, SparseStorage, Storage};
use crate::tensor::{DenseTensor, Tensor};

/// Always-available reference provider
///
/// Runs the generic algorithms element by element through the field. Sparse
/// left operands of `multiply` only visit their stored entries. With the
/// `rayon` feature, dense products whose output has at least
/// `parallel_threshold` elements are split by rows across threads.
#[derive(Clone, Debug)]
pub struct CpuNaiveProvider {
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    parallel_threshold: usize,
}

impl CpuNaiveProvider {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::global())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            parallel_threshold: config.parallel_threshold,
        }
    }

    fn sparse_multiply<F: Field>(
        field: &F,
        a: &SparseStorage<F::Elem>,
        b: &dyn Storage<F::Elem>,
    ) -> DenseStorage<F::Elem> {
        let (m, n) = (a.rows(), b.cols());
        let b_data = b.to_row_major();
        let mut out = vec![field.zero(); m * n];
        for (i, p, a_ip) in a.iter() {
            let b_row = &b_data[p * n..(p + 1) * n];
            let out_row = &mut out[i * n..(i + 1) * n];
            for (o, b_pj) in out_row.iter_mut().zip(b_row) {
                *o = field.add(o, &field.mul(a_ip, b_pj));
            }
        }
        DenseStorage::from_parts(m, n, out)
    }
}

impl Default for CpuNaiveProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for CpuNaiveProvider {
    fn name(&self) -> &'static str {
        "cpu-naive"
    }

    fn priority(&self) -> u8 {
        DEFAULT_PRIORITY
    }

    fn supports_parallel_ops(&self) -> bool {
        cfg!(feature = "rayon")
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl<F: Field> LinearAlgebraProvider<F> for CpuNaiveProvider {
    fn multiply(
        &self,
        field: &F,
        a: &dyn Storage<F::Elem>,
        b: &dyn Storage<F::Elem>,
    ) -> Result<Box<dyn Storage<F::Elem>>> {
        if a.cols() != b.rows() {
            return Err(Error::dimension_mismatch("multiply", a.shape(), b.shape()));
        }

        if let Some(sparse) = a.as_any().downcast_ref::<SparseStorage<F::Elem>>() {
            return Ok(materialize(field, Self::sparse_multiply(field, sparse, b)));
        }

        #[cfg(feature = "rayon")]
        {
            let (m, k, n) = (a.rows(), a.cols(), b.cols());
            if m * n >= self.parallel_threshold {
                log::trace!("cpu-naive: row-parallel {}x{}x{} product", m, k, n);
                let out = algorithm::matmul::gemm_parallel(
                    field,
                    &a.to_row_major(),
                    &b.to_row_major(),
                    m,
                    k,
                    n,
                );
                return Ok(materialize(field, DenseStorage::from_parts(m, n, out)));
            }
        }

        Ok(materialize(field, algorithm::matmul(field, a, b)?))
    }

    fn double_kernels(&self) -> Option<&dyn DoubleKernels> {
        Some(&ScalarKernels)
    }
}

impl<F: Field> TensorProvider<F> for CpuNaiveProvider {
    fn zeros(&self, field: &F, shape: &[usize]) -> Result<Tensor<F::Elem>> {
        Ok(DenseTensor::filled(shape, field.zero())?.into())
    }

    fn ones(&self, field: &F, shape: &[usize]) -> Result<Tensor<F::Elem>> {
        Ok(DenseTensor::filled(shape, field.one())?.into())
    }

    fn create(&self, _field: &F, data: Vec<F::Elem>, shape: &[usize]) -> Result<Tensor<F::Elem>> {
        Ok(DenseTensor::from_vec(data, shape)?.into())
    }
}
