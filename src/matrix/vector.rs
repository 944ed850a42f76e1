//! Column vectors over a field

use crate::algorithm;
use crate::error::{Error, Result};
use crate::field::Field;

/// Dense vector of field elements
#[derive(Clone, Debug)]
pub struct Vector<F: Field> {
    data: Vec<F::Elem>,
    field: F,
}

impl<F: Field> Vector<F> {
    pub fn from_vec(field: F, data: Vec<F::Elem>) -> Self {
        Self { data, field }
    }

    /// Number of components
    #[inline]
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&F::Elem> {
        self.data.get(i)
    }

    #[inline]
    pub fn as_slice(&self) -> &[F::Elem] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<F::Elem> {
        self.data
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    fn check(&self, op: &'static str, other: &Self) -> Result<()> {
        if self.field != other.field {
            return Err(Error::unsupported_combination(
                op,
                "vectors over different fields",
            ));
        }
        if self.dimension() != other.dimension() {
            return Err(Error::dimension_mismatch(
                op,
                (self.dimension(), 1),
                (other.dimension(), 1),
            ));
        }
        Ok(())
    }

    fn zip(&self, other: &Self, f: impl Fn(&F::Elem, &F::Elem) -> F::Elem) -> Self {
        let data = self.data.iter().zip(&other.data).map(|(a, b)| f(a, b)).collect();
        Self::from_vec(self.field.clone(), data)
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check("add", other)?;
        Ok(self.zip(other, |a, b| self.field.add(a, b)))
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check("sub", other)?;
        Ok(self.zip(other, |a, b| self.field.sub(a, b)))
    }

    pub fn scale(&self, factor: &F::Elem) -> Self {
        let data = self.data.iter().map(|x| self.field.mul(factor, x)).collect();
        Self::from_vec(self.field.clone(), data)
    }

    pub fn negate(&self) -> Self {
        let data = self.data.iter().map(|x| self.field.neg(x)).collect();
        Self::from_vec(self.field.clone(), data)
    }

    /// Inner product
    pub fn dot(&self, other: &Self) -> Result<F::Elem> {
        self.check("dot", other)?;
        algorithm::dot(&self.field, &self.data, &other.data)
    }
}

impl<F: Field> PartialEq for Vector<F> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.dimension() == other.dimension()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| self.field.elem_eq(a, b))
    }
}
