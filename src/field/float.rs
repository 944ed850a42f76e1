//! Generic floating-point fields over boxed element storage

use super::Field;
use num_traits::Float;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Field over any `num_traits::Float` type
///
/// Unlike [`super::Reals`], matrices over a `FloatField` use the generic
/// storages and only the CPU-naive provider.
#[derive(Debug, Default)]
pub struct FloatField<T> {
    _marker: PhantomData<T>,
}

/// Single-precision reals
pub type Reals32 = FloatField<f32>;

impl<T> FloatField<T> {
    /// Create the field
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for FloatField<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for FloatField<T> {}

impl<T> PartialEq for FloatField<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> Field for FloatField<T>
where
    T: Float + Debug + Send + Sync + 'static,
{
    type Elem = T;

    fn name(&self) -> &'static str {
        "FloatField"
    }

    fn zero(&self) -> T {
        T::zero()
    }

    fn one(&self) -> T {
        T::one()
    }

    fn add(&self, a: &T, b: &T) -> T {
        *a + *b
    }

    fn sub(&self, a: &T, b: &T) -> T {
        *a - *b
    }

    fn mul(&self, a: &T, b: &T) -> T {
        *a * *b
    }

    fn neg(&self, a: &T) -> T {
        -*a
    }

    fn inv(&self, a: &T) -> Option<T> {
        if a.is_zero() { None } else { Some(a.recip()) }
    }

    fn cmp(&self, a: &T, b: &T) -> Option<Ordering> {
        a.partial_cmp(b)
    }

    fn magnitude(&self, a: &T) -> Option<f64> {
        a.abs().to_f64()
    }
}
