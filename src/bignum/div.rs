//! Binary long division.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::{Div, DivAssign, Rem, RemAssign};
use zeroize::{Zeroize, Zeroizing};

use super::arith::{forward_binop, sub_assign_words};
use super::{cmp_words, shl_words, shr1_words, BigNum, Word, WORD_BITS};

fn bit_len(a: &[Word]) -> u32 {
    a.last()
        .map_or(0, |top| (a.len() as u32 - 1) * WORD_BITS + (WORD_BITS - top.leading_zeros()))
}

/// Unsigned quotient and remainder of two magnitudes, `b` non-zero.
///
/// The divisor is aligned with the dividend's highest bit, then walked back
/// one bit at a time, subtracting wherever it fits.
pub(crate) fn div_rem_words(a: &[Word], b: &[Word]) -> (Vec<Word>, Vec<Word>) {
    debug_assert!(!b.is_empty());
    if cmp_words(a, b) == Ordering::Less {
        return (Vec::new(), a.to_vec());
    }

    let shift = bit_len(a) - bit_len(b);
    let mut divisor = Zeroizing::new(shl_words(b, shift));
    let mut rem = a.to_vec();
    let mut quot = vec![0; (shift / WORD_BITS) as usize + 1];

    for i in (0..=shift).rev() {
        if cmp_words(&rem, &divisor) != Ordering::Less {
            sub_assign_words(&mut rem, &divisor);
            quot[(i / WORD_BITS) as usize] |= 1 << (i % WORD_BITS);
        }
        shr1_words(&mut divisor);
    }

    (quot, rem)
}

impl BigNum {
    /// Floor division returning `(quotient, remainder)`.
    ///
    /// The quotient rounds toward negative infinity and the remainder takes
    /// the sign of `rhs`, so `self == q * rhs + r` with `|r| < |rhs|`.
    /// Dividing zero, or dividing by zero, yields zero for both.
    pub fn div_mod(&self, rhs: &BigNum) -> (BigNum, BigNum) {
        if self.is_zero() || rhs.is_zero() {
            return (BigNum::zero(), BigNum::zero());
        }

        let (q, r) = div_rem_words(&self.mag, &rhs.mag);
        let signs_differ = self.negative != rhs.negative;
        let mut q = BigNum::from_words(q, signs_differ);
        let mut r = BigNum::from_words(r, self.negative);

        if signs_differ && !r.is_zero() {
            q -= BigNum::one();
            r += rhs;
        }
        (q, r)
    }

    /// Floor quotient of `self / rhs`; zero when either side is zero.
    pub fn div(&self, rhs: &BigNum) -> BigNum {
        let (q, mut r) = self.div_mod(rhs);
        r.zeroize();
        q
    }

    /// Remainder of [`BigNum::div_mod`]; zero when either side is zero.
    pub fn modulo(&self, rhs: &BigNum) -> BigNum {
        let (mut q, r) = self.div_mod(rhs);
        q.zeroize();
        r
    }
}

forward_binop!(Div, div, DivAssign, div_assign, BigNum::div);
forward_binop!(Rem, rem, RemAssign, rem_assign, BigNum::modulo);
