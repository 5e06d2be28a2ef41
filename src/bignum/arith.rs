//! Addition, subtraction and multiplication.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Shl, Sub, SubAssign};

use super::{cmp_words, trim, BigNum, DoubleWord, Word, WORD_BITS};

/// Unsigned `a + b`.
pub(crate) fn add_words(a: &[Word], b: &[Word]) -> Vec<Word> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = false;
    for (i, &x) in long.iter().enumerate() {
        let y = short.get(i).copied().unwrap_or(0);
        let (s, c1) = x.overflowing_add(y);
        let (s, c2) = s.overflowing_add(Word::from(carry));
        out.push(s);
        carry = c1 || c2;
    }
    if carry {
        out.push(1);
    }
    out
}

/// Unsigned `a - b`; requires `a >= b`.
pub(crate) fn sub_words(a: &[Word], b: &[Word]) -> Vec<Word> {
    let mut out = a.to_vec();
    sub_assign_words(&mut out, b);
    out
}

/// Unsigned `a -= b` in place; requires `a >= b`.
pub(crate) fn sub_assign_words(a: &mut Vec<Word>, b: &[Word]) {
    debug_assert!(cmp_words(a, b) != Ordering::Less);
    let mut borrow = false;
    for (i, x) in a.iter_mut().enumerate() {
        let y = b.get(i).copied().unwrap_or(0);
        if i >= b.len() && !borrow {
            break;
        }
        let (d, b1) = x.overflowing_sub(y);
        let (d, b2) = d.overflowing_sub(Word::from(borrow));
        *x = d;
        borrow = b1 || b2;
    }
    trim(a);
}

/// Schoolbook product of two magnitudes.
pub(crate) fn mul_words(a: &[Word], b: &[Word]) -> Vec<Word> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        let mut carry: DoubleWord = 0;
        for (j, &y) in b.iter().enumerate() {
            let t = DoubleWord::from(x) * DoubleWord::from(y)
                + DoubleWord::from(out[i + j])
                + carry;
            out[i + j] = t as Word;
            carry = t >> WORD_BITS;
        }
        out[i + b.len()] = carry as Word;
    }
    trim(&mut out);
    out
}

/// Sign-magnitude addition of `(a_neg, a)` and `(b_neg, b)`.
fn signed_add(a_neg: bool, a: &[Word], b_neg: bool, b: &[Word]) -> BigNum {
    if a_neg == b_neg {
        return BigNum::from_words(add_words(a, b), a_neg);
    }
    match cmp_words(a, b) {
        Ordering::Greater => BigNum::from_words(sub_words(a, b), a_neg),
        Ordering::Less => BigNum::from_words(sub_words(b, a), b_neg),
        Ordering::Equal => BigNum::zero(),
    }
}

impl BigNum {
    /// Returns `self + other`.
    pub fn add(&self, other: &BigNum) -> BigNum {
        signed_add(self.negative, &self.mag, other.negative, &other.mag)
    }

    /// Returns `self - other`.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        signed_add(self.negative, &self.mag, !other.negative, &other.mag)
    }

    /// Returns `self * other`.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        BigNum::from_words(
            mul_words(&self.mag, &other.mag),
            self.negative != other.negative,
        )
    }
}

/// Implements a binary operator and its assigning form for every owned and
/// borrowed combination, forwarding to an inherent `&BigNum` method.
macro_rules! forward_binop {
    ($imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident, $func:path) => {
        impl<'a, 'b> $imp<&'b BigNum> for &'a BigNum {
            type Output = BigNum;

            #[inline]
            fn $method(self, rhs: &BigNum) -> BigNum {
                $func(self, rhs)
            }
        }

        impl<'a> $imp<&'a BigNum> for BigNum {
            type Output = BigNum;

            #[inline]
            fn $method(self, rhs: &BigNum) -> BigNum {
                $func(&self, rhs)
            }
        }

        impl<'a> $imp<BigNum> for &'a BigNum {
            type Output = BigNum;

            #[inline]
            fn $method(self, rhs: BigNum) -> BigNum {
                $func(self, &rhs)
            }
        }

        impl $imp<BigNum> for BigNum {
            type Output = BigNum;

            #[inline]
            fn $method(self, rhs: BigNum) -> BigNum {
                $func(&self, &rhs)
            }
        }

        impl<'a> $assign_imp<&'a BigNum> for BigNum {
            #[inline]
            fn $assign_method(&mut self, rhs: &BigNum) {
                let value = $func(&*self, rhs);
                self.overwrite(value);
            }
        }

        impl $assign_imp<BigNum> for BigNum {
            #[inline]
            fn $assign_method(&mut self, rhs: BigNum) {
                let value = $func(&*self, &rhs);
                self.overwrite(value);
            }
        }
    };
}

pub(crate) use forward_binop;

forward_binop!(Add, add, AddAssign, add_assign, BigNum::add);
forward_binop!(Sub, sub, SubAssign, sub_assign, BigNum::sub);
forward_binop!(Mul, mul, MulAssign, mul_assign, BigNum::mul);

impl Neg for BigNum {
    type Output = BigNum;

    fn neg(mut self) -> BigNum {
        if !self.is_zero() {
            self.negative = !self.negative;
        }
        self
    }
}

impl<'a> Neg for &'a BigNum {
    type Output = BigNum;

    fn neg(self) -> BigNum {
        -self.clone()
    }
}

impl Shl<u32> for BigNum {
    type Output = BigNum;

    fn shl(self, rhs: u32) -> BigNum {
        self.shift_left(rhs)
    }
}

impl<'a> Shl<u32> for &'a BigNum {
    type Output = BigNum;

    fn shl(self, rhs: u32) -> BigNum {
        self.shift_left(rhs)
    }
}
