//! Scalar fields: the capability object behind every matrix
//!
//! A [`Field`] supplies the identity elements and the arithmetic for a scalar
//! type. It is passed alongside every generic operation instead of being
//! discovered from the element type, so `zero()` and `one()` are always
//! statically available.
//!
//! Fields also decide two things the engine would otherwise have to probe for
//! at runtime:
//!
//! - which storage backs a dense matrix of their elements
//!   ([`Field::dense_storage`]), which lets [`Reals`] substitute the
//!   primitive-double storage
//! - which providers are registered for their element type
//!   ([`Field::linear_algebra_providers`], [`Field::tensor_providers`])

mod float;
mod prime;
mod real;

pub use float::{FloatField, Reals32};
pub use prime::PrimeField;
pub use real::Reals;

use crate::error::{Error, Result};
use crate::provider::{CpuNaiveProvider, LinearAlgebraProvider, TensorProvider};
use crate::storage::{DenseStorage, Storage};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

/// Bounds shared by every matrix element type
pub trait Scalar: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Debug + Send + Sync + 'static> Scalar for T {}

type ZeroTest<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// A field's zero together with the test for being zero
///
/// Sparse and structured layouts keep one to decide which entries stay
/// implicit. [`Zero::exact`] compares with `==`; [`Zero::of`] defers to
/// [`Field::is_zero`], so an unreduced `7` in Z/7Z counts as zero.
#[derive(Clone)]
pub struct Zero<E> {
    value: E,
    test: Option<ZeroTest<E>>,
}

impl<E: Scalar> Zero<E> {
    /// Zero decided by `==` against `value`
    pub fn exact(value: E) -> Self {
        Self { value, test: None }
    }

    /// Zero of `field`, decided by [`Field::is_zero`]
    pub fn of<F: Field<Elem = E>>(field: &F) -> Self {
        let f = field.clone();
        Self {
            value: field.zero(),
            test: Some(Arc::new(move |v: &E| f.is_zero(v))),
        }
    }

    /// The zero element itself
    #[inline]
    pub fn value(&self) -> &E {
        &self.value
    }

    /// Returns true if `v` counts as zero
    #[inline]
    pub fn matches(&self, v: &E) -> bool {
        match &self.test {
            Some(test) => test(v),
            None => *v == self.value,
        }
    }
}

impl<E: Debug> Debug for Zero<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Zero").field(&self.value).finish()
    }
}

// Predicates are not comparable; zeros compare by value
impl<E: PartialEq> PartialEq for Zero<E> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Algebraic field over the element type [`Field::Elem`]
///
/// Two field values of the same type that compare unequal (for example prime
/// fields with different moduli) describe different algebras; matrices over
/// them cannot be combined.
pub trait Field: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Element type of the field
    type Elem: Scalar;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Additive identity
    fn zero(&self) -> Self::Elem;

    /// Multiplicative identity
    fn one(&self) -> Self::Elem;

    /// `a + b`
    fn add(&self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    /// `a - b`
    fn sub(&self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem {
        self.add(a, &self.neg(b))
    }

    /// `a * b`
    fn mul(&self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    /// `-a`
    fn neg(&self, a: &Self::Elem) -> Self::Elem;

    /// Multiplicative inverse, `None` for zero
    fn inv(&self, a: &Self::Elem) -> Option<Self::Elem>;

    /// `a / b`
    ///
    /// Fails with [`Error::Singular`] when `b` has no inverse.
    fn div(&self, a: &Self::Elem, b: &Self::Elem) -> Result<Self::Elem> {
        let inverse = self.inv(b).ok_or(Error::Singular)?;
        Ok(self.mul(a, &inverse))
    }

    /// Equality of two elements
    fn elem_eq(&self, a: &Self::Elem, b: &Self::Elem) -> bool {
        a == b
    }

    /// Ordering of two elements, when the field is ordered
    fn cmp(&self, a: &Self::Elem, b: &Self::Elem) -> Option<Ordering>;

    /// Returns true if `a` is the additive identity
    fn is_zero(&self, a: &Self::Elem) -> bool {
        self.elem_eq(a, &self.zero())
    }

    /// Absolute value as f64, used for partial pivoting
    ///
    /// Fields without a meaningful magnitude return `None`; elimination then
    /// picks the first non-zero pivot instead of the largest.
    fn magnitude(&self, _a: &Self::Elem) -> Option<f64> {
        None
    }

    /// Build the dense storage used for `rows x cols` row-major data
    fn dense_storage(
        &self,
        rows: usize,
        cols: usize,
        data: Vec<Self::Elem>,
    ) -> Box<dyn Storage<Self::Elem>> {
        Box::new(DenseStorage::from_parts(rows, cols, data))
    }

    /// Linear algebra providers registered for this field
    fn linear_algebra_providers() -> Vec<Arc<dyn LinearAlgebraProvider<Self>>>
    where
        Self: Sized,
    {
        vec![Arc::new(CpuNaiveProvider::new())]
    }

    /// Tensor providers registered for this field
    fn tensor_providers() -> Vec<Arc<dyn TensorProvider<Self>>>
    where
        Self: Sized,
    {
        vec![Arc::new(CpuNaiveProvider::new())]
    }
}
