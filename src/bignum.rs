//! Arbitrary-precision sign-magnitude integers.
//!
//! [`BigNum`] stores its magnitude as a vector of 64-bit words, least
//! significant word first, plus a sign flag. Every operation returns a value
//! in canonical form: no most-significant zero words, and zero is never
//! negative.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::{fmt, mem};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Error, Result};

mod arith;
mod div;
mod encoding;

pub(crate) type Word = u64;
pub(crate) type DoubleWord = u128;

/// Bits per magnitude word.
pub const WORD_BITS: u32 = Word::BITS;

/// Largest bit length a [`BigNum`] may be grown to explicitly.
pub const MAX_BITS: u32 = (1 << 31) - 64;

/// A signed integer of arbitrary size.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BigNum {
    mag: Vec<Word>,
    negative: bool,
}

impl BigNum {
    /// Returns zero.
    pub const fn zero() -> Self {
        BigNum {
            mag: Vec::new(),
            negative: false,
        }
    }

    /// Returns one.
    pub fn one() -> Self {
        BigNum::from_words(vec![1], false)
    }

    /// Builds a canonical number from raw words and a sign.
    pub(crate) fn from_words(mag: Vec<Word>, negative: bool) -> Self {
        let mut n = BigNum { mag, negative };
        n.normalize();
        n
    }

    pub(crate) fn words(&self) -> &[Word] {
        &self.mag
    }

    /// Restores canonical form after the magnitude was edited in place.
    fn normalize(&mut self) {
        trim(&mut self.mag);
        if self.mag.is_empty() {
            self.negative = false;
        }
    }

    /// Creates a number from a small signed value.
    pub fn from_i32(v: i32) -> Self {
        BigNum::from(i64::from(v))
    }

    /// Returns the low 31 bits of the magnitude with the sign applied.
    ///
    /// Values that do not fit are truncated silently; use
    /// [`BigNum::try_to_i32`] to detect that case.
    pub fn to_i32(&self) -> i32 {
        let low = (self.mag.first().copied().unwrap_or(0) & 0x7FFF_FFFF) as i32;
        if self.negative {
            -low
        } else {
            low
        }
    }

    /// Converts to `i32`, failing with [`Error::Truncated`] if the value does
    /// not fit in 31 bits plus sign.
    pub fn try_to_i32(&self) -> Result<i32> {
        if self.bits() > 31 {
            return Err(Error::Truncated);
        }
        Ok(self.to_i32())
    }

    /// Returns `true` if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mag.is_empty()
    }

    /// Returns `true` if the value is one.
    #[inline]
    pub fn is_one(&self) -> bool {
        !self.negative && self.mag.len() == 1 && self.mag[0] == 1
    }

    /// Returns `true` if the value is odd.
    #[inline]
    pub fn is_odd(&self) -> bool {
        self.mag.first().map_or(false, |w| w & 1 == 1)
    }

    /// Returns `true` if the value is even; zero is even.
    #[inline]
    pub fn is_even(&self) -> bool {
        !self.is_odd()
    }

    /// Returns `true` if the value is strictly below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> BigNum {
        BigNum {
            mag: self.mag.clone(),
            negative: false,
        }
    }

    /// Number of significant bits in the magnitude, 0 for zero.
    pub fn bits(&self) -> u32 {
        match self.mag.last() {
            None => 0,
            Some(top) => {
                (self.mag.len() as u32 - 1) * WORD_BITS + (WORD_BITS - top.leading_zeros())
            }
        }
    }

    /// Returns the magnitude bit at `pos`.
    pub fn bit(&self, pos: u32) -> bool {
        let word = (pos / WORD_BITS) as usize;
        self.mag
            .get(word)
            .map_or(false, |w| (w >> (pos % WORD_BITS)) & 1 == 1)
    }

    /// Sets or clears the magnitude bit at `pos`, growing storage as needed.
    pub fn set_bit(&mut self, pos: u32, value: bool) -> Result<()> {
        if pos >= MAX_BITS {
            return Err(Error::Allocation);
        }
        let word = (pos / WORD_BITS) as usize;
        let mask = 1 << (pos % WORD_BITS);
        if value {
            if word >= self.mag.len() {
                self.mag
                    .try_reserve(word + 1 - self.mag.len())
                    .map_err(|_| Error::Allocation)?;
                self.mag.resize(word + 1, 0);
            }
            self.mag[word] |= mask;
        } else if word < self.mag.len() {
            self.mag[word] &= !mask;
            self.normalize();
        }
        Ok(())
    }

    /// Shifts the magnitude left by `n` bits, keeping the sign.
    pub fn shift_left(&self, n: u32) -> BigNum {
        BigNum::from_words(shl_words(&self.mag, n), self.negative)
    }

    /// Shifts the magnitude right by a single bit in place.
    pub fn shift_right_one(&mut self) {
        shr1_words(&mut self.mag);
        self.normalize();
    }

    /// Remainder of the magnitude modulo a small divisor.
    pub(crate) fn rem_u32(&self, divisor: u32) -> u32 {
        let d = DoubleWord::from(divisor);
        self.mag
            .iter()
            .rev()
            .fold(0, |r, &w| ((r << WORD_BITS) | DoubleWord::from(w)) % d) as u32
    }
}

/// Drops most-significant zero words.
pub(crate) fn trim(mag: &mut Vec<Word>) {
    while let Some(&0) = mag.last() {
        mag.pop();
    }
}

/// Unsigned magnitude comparison of canonical word slices.
pub(crate) fn cmp_words(a: &[Word], b: &[Word]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

pub(crate) fn shl_words(a: &[Word], n: u32) -> Vec<Word> {
    if a.is_empty() {
        return Vec::new();
    }
    let words = (n / WORD_BITS) as usize;
    let bits = n % WORD_BITS;
    let mut out = vec![0; words];
    out.reserve(a.len() + 1);
    if bits == 0 {
        out.extend_from_slice(a);
    } else {
        let mut carry = 0;
        for &w in a {
            out.push((w << bits) | carry);
            carry = w >> (WORD_BITS - bits);
        }
        out.push(carry);
    }
    trim(&mut out);
    out
}

pub(crate) fn shr1_words(a: &mut Vec<Word>) {
    let mut carry = 0;
    for w in a.iter_mut().rev() {
        let next = *w << (WORD_BITS - 1);
        *w = (*w >> 1) | carry;
        carry = next;
    }
    trim(a);
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => cmp_words(&self.mag, &other.mag),
            (true, true) => cmp_words(&other.mag, &self.mag),
        }
    }
}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for BigNum {
    fn from(v: i64) -> Self {
        BigNum::from_words(vec![v.unsigned_abs()], v < 0)
    }
}

impl From<i32> for BigNum {
    fn from(v: i32) -> Self {
        BigNum::from_i32(v)
    }
}

impl From<u64> for BigNum {
    fn from(v: u64) -> Self {
        BigNum::from_words(vec![v], false)
    }
}

impl From<u32> for BigNum {
    fn from(v: u32) -> Self {
        BigNum::from(u64::from(v))
    }
}

impl Zeroize for BigNum {
    fn zeroize(&mut self) {
        self.mag.zeroize();
        self.negative = false;
    }
}

impl BigNum {
    /// Wipes the current value before replacing it with `value`.
    pub(crate) fn overwrite(&mut self, value: BigNum) {
        self.zeroize();
        *self = value;
    }
}

/// Moves a secret out of its wrapper, leaving zero behind.
pub(crate) fn take_secret(mut value: Zeroizing<BigNum>) -> BigNum {
    mem::take(&mut *value)
}

impl fmt::Debug for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigNum({:#x})", self)
    }
}
