//! Modular arithmetic over [`BigNum`].

use core::mem;

use zeroize::Zeroizing;

use crate::bignum::{take_secret, BigNum};
use crate::errors::{Error, Result};

/// Generic trait to implement modular inverse
pub trait ModInverse<R: Sized>: Sized {
    /// Returns `x` with `self * x == 1 (mod m)`.
    ///
    /// Requires `0 < self < m`. Fails with [`Error::NoInverse`] when
    /// `gcd(self, m) != 1`.
    fn mod_inverse(self, m: R) -> Result<Self>;
}

impl<'a> ModInverse<&'a BigNum> for BigNum {
    fn mod_inverse(self, m: &'a BigNum) -> Result<BigNum> {
        self.mod_inv(m)
    }
}

impl ModInverse<BigNum> for BigNum {
    fn mod_inverse(self, m: BigNum) -> Result<BigNum> {
        self.mod_inv(&m)
    }
}

impl BigNum {
    /// Computes `self ^ exponent mod modulus` by square-and-multiply,
    /// scanning exponent bits from the least significant upward.
    ///
    /// Returns zero when `self` is zero or the modulus is zero or one, and one
    /// when the exponent is zero. The exponent's sign is ignored.
    /// Intermediate values are wiped, since the exponent may be secret.
    pub fn mod_exp(&self, exponent: &BigNum, modulus: &BigNum) -> BigNum {
        if self.is_zero() || modulus.is_zero() || modulus.is_one() {
            return BigNum::zero();
        }
        if exponent.is_zero() {
            return BigNum::one();
        }

        let bits = exponent.bits();
        let mut result = Zeroizing::new(BigNum::one());
        let mut acc = Zeroizing::new(self.modulo(modulus));
        for i in 0..bits {
            if exponent.bit(i) {
                let product = Zeroizing::new(&*result * &*acc);
                result.overwrite(product.modulo(modulus));
            }
            if i + 1 < bits {
                let square = Zeroizing::new(&*acc * &*acc);
                acc.overwrite(square.modulo(modulus));
            }
        }
        take_secret(result)
    }

    /// Modular inverse by the extended Euclidean algorithm.
    ///
    /// Requires `0 < self < modulus`; otherwise [`Error::InvalidParam`].
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum> {
        if self.is_zero() || self.is_negative() || modulus.is_negative() || self >= modulus {
            return Err(Error::InvalidParam);
        }

        let mut big = Zeroizing::new(modulus.clone());
        let mut little = Zeroizing::new(self.clone());
        let mut t0 = Zeroizing::new(BigNum::zero());
        let mut t = Zeroizing::new(BigNum::one());
        let (q, r) = big.div_mod(&little);
        let (mut q, mut r) = (Zeroizing::new(q), Zeroizing::new(r));

        while !r.is_zero() {
            let qt = Zeroizing::new(&*q * &*t);
            let diff = Zeroizing::new(&*t0 - &*qt);
            let next = Zeroizing::new(diff.modulo(modulus));
            t0 = mem::replace(&mut t, next);
            big = mem::replace(&mut little, r);
            let (next_q, next_r) = big.div_mod(&little);
            q = Zeroizing::new(next_q);
            r = Zeroizing::new(next_r);
        }

        if !little.is_one() {
            return Err(Error::NoInverse);
        }
        Ok(take_secret(t))
    }

    /// Greatest common divisor of the absolute values.
    ///
    /// Both inputs must be non-zero.
    pub fn gcd(&self, other: &BigNum) -> Result<BigNum> {
        if self.is_zero() || other.is_zero() {
            return Err(Error::InvalidParam);
        }

        let a = self.abs();
        let b = other.abs();
        let (mut larger, mut smaller) = if a >= b { (a, b) } else { (b, a) };
        while !smaller.is_zero() {
            let r = larger.modulo(&smaller);
            larger = mem::replace(&mut smaller, r);
        }
        Ok(larger)
    }
}
