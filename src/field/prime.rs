//! Prime fields Z/pZ with exact arithmetic

use super::Field;
use crate::error::{Error, Result};
use std::cmp::Ordering;

/// Integers modulo a prime `p`
///
/// Elements are `u64` values in `0..p`. Arithmetic is exact, which makes this
/// field useful for checking algorithms without floating-point tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrimeField {
    modulus: u64,
}

impl PrimeField {
    /// Create the field of integers modulo `modulus`
    ///
    /// Fails with `InvalidArgument` if `modulus` is not prime.
    pub fn new(modulus: u64) -> Result<Self> {
        if !is_prime(modulus) {
            return Err(Error::invalid_argument(
                "modulus",
                format!("{} is not prime", modulus),
            ));
        }
        Ok(Self { modulus })
    }

    /// The field's modulus
    #[inline]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Reduce an arbitrary integer into the field
    #[inline]
    pub fn element(&self, value: i64) -> u64 {
        (value as i128).rem_euclid(self.modulus as i128) as u64
    }
}

#[inline]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    acc
}

/// Deterministic Miller-Rabin; these witnesses cover every `u64`
fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for &a in &WITNESSES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

impl Field for PrimeField {
    type Elem = u64;

    fn name(&self) -> &'static str {
        "PrimeField"
    }

    fn zero(&self) -> u64 {
        0
    }

    fn one(&self) -> u64 {
        1 % self.modulus
    }

    fn add(&self, a: &u64, b: &u64) -> u64 {
        ((*a as u128 + *b as u128) % self.modulus as u128) as u64
    }

    fn mul(&self, a: &u64, b: &u64) -> u64 {
        mul_mod(*a, *b, self.modulus)
    }

    fn neg(&self, a: &u64) -> u64 {
        let a = a % self.modulus;
        if a == 0 { 0 } else { self.modulus - a }
    }

    fn inv(&self, a: &u64) -> Option<u64> {
        if a % self.modulus == 0 {
            return None;
        }
        // Fermat: a^(p-2) = a^-1 (mod p)
        Some(pow_mod(*a, self.modulus - 2, self.modulus))
    }

    fn elem_eq(&self, a: &u64, b: &u64) -> bool {
        a % self.modulus == b % self.modulus
    }

    fn cmp(&self, a: &u64, b: &u64) -> Option<Ordering> {
        Some((a % self.modulus).cmp(&(b % self.modulus)))
    }
}
