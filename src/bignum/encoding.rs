//! Big-endian byte and radix string conversions.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use super::{trim, BigNum, DoubleWord, Word, MAX_BITS, WORD_BITS};
use crate::errors::{Error, Result};

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
const WORD_BYTES: usize = (WORD_BITS / 8) as usize;

impl BigNum {
    /// Interprets the whole slice as an unsigned big-endian magnitude.
    pub fn from_bytes_be(bytes: &[u8]) -> BigNum {
        let mut mag = Vec::with_capacity(bytes.len().div_ceil(WORD_BYTES));
        for chunk in bytes.rchunks(WORD_BYTES) {
            let mut buf = [0u8; WORD_BYTES];
            buf[WORD_BYTES - chunk.len()..].copy_from_slice(chunk);
            mag.push(Word::from_be_bytes(buf));
        }
        BigNum::from_words(mag, false)
    }

    /// Reads `bits` bits (a multiple of 8) of big-endian bytes from the start
    /// of `bytes` as an unsigned value.
    pub fn load(bytes: &[u8], bits: u32) -> Result<BigNum> {
        if bits % 8 != 0 {
            return Err(Error::InvalidParam);
        }
        if bits > MAX_BITS {
            return Err(Error::Allocation);
        }
        let len = (bits / 8) as usize;
        let src = bytes.get(..len).ok_or(Error::InvalidParam)?;
        Ok(BigNum::from_bytes_be(src))
    }

    /// Minimal big-endian encoding of the magnitude; empty for zero.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let len = (self.bits() as usize).div_ceil(8);
        let mut out = vec![0u8; len];
        self.write_magnitude(&mut out);
        out
    }

    /// Writes the magnitude big-endian into `out`, right-aligned and
    /// zero-filled on the left. Fails with [`Error::Format`] when it does not
    /// fit.
    pub fn write_be(&self, out: &mut [u8]) -> Result<()> {
        if (self.bits() as usize).div_ceil(8) > out.len() {
            return Err(Error::Format);
        }
        out.fill(0);
        self.write_magnitude(out);
        Ok(())
    }

    fn write_magnitude(&self, out: &mut [u8]) {
        let mut dst = out.iter_mut().rev();
        'words: for w in &self.mag {
            for byte in w.to_le_bytes() {
                match dst.next() {
                    Some(d) => *d = byte,
                    None => break 'words,
                }
            }
        }
    }

    /// Big-endian bytes of the magnitude, at least `min_bits / 8` long.
    ///
    /// Fails with [`Error::Format`] if the value is wider than `max_bits`.
    /// Both widths must be multiples of 8.
    pub fn save(&self, max_bits: u32, min_bits: u32) -> Result<Vec<u8>> {
        if max_bits % 8 != 0 || min_bits % 8 != 0 || min_bits > max_bits {
            return Err(Error::InvalidParam);
        }
        if self.bits() > max_bits {
            return Err(Error::Format);
        }
        let len = (self.bits() as usize)
            .div_ceil(8)
            .max((min_bits / 8) as usize);
        let mut out = vec![0u8; len];
        self.write_magnitude(&mut out);
        Ok(out)
    }

    /// Little-endian bytes of the word storage.
    pub(crate) fn to_le_word_bytes(&self) -> Vec<u8> {
        self.mag.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    /// Formats the value in `radix` (2 to 16) with uppercase digits.
    pub fn to_str_radix(&self, radix: u32) -> Result<String> {
        if !(2..=16).contains(&radix) {
            return Err(Error::InvalidParam);
        }
        let mut s = String::new();
        if self.negative {
            s.push('-');
        }
        s.push_str(&self.magnitude_digits(radix));
        Ok(s)
    }

    /// Digits of the magnitude, most significant first.
    fn magnitude_digits(&self, radix: u32) -> String {
        if self.is_zero() {
            return String::from("0");
        }
        let mut mag = self.mag.clone();
        let mut digits = Vec::new();
        while !mag.is_empty() {
            let r = div_rem_small(&mut mag, radix);
            digits.push(DIGITS[r as usize]);
        }
        digits.iter().rev().map(|&d| char::from(d)).collect()
    }

    /// Parses an optionally `-`-prefixed number in `radix` (2 to 16).
    pub fn parse_bytes(buf: &[u8], radix: u32) -> Option<BigNum> {
        if !(2..=16).contains(&radix) {
            return None;
        }
        let (negative, digits) = match buf.split_first() {
            Some((b'-', rest)) => (true, rest),
            _ => (false, buf),
        };
        if digits.is_empty() {
            return None;
        }
        let mut mag: Vec<Word> = Vec::new();
        for &c in digits {
            let d = char::from(c).to_digit(radix)?;
            mul_add_small(&mut mag, radix, d);
        }
        Some(BigNum::from_words(mag, negative))
    }
}

/// `mag = mag / d`, returning the remainder.
fn div_rem_small(mag: &mut Vec<Word>, d: u32) -> u32 {
    let d = DoubleWord::from(d);
    let mut r: DoubleWord = 0;
    for w in mag.iter_mut().rev() {
        let cur = (r << WORD_BITS) | DoubleWord::from(*w);
        *w = (cur / d) as Word;
        r = cur % d;
    }
    trim(mag);
    r as u32
}

/// `mag = mag * m + a`.
fn mul_add_small(mag: &mut Vec<Word>, m: u32, a: u32) {
    let mut carry = DoubleWord::from(a);
    for w in mag.iter_mut() {
        let t = DoubleWord::from(*w) * DoubleWord::from(m) + carry;
        *w = t as Word;
        carry = t >> WORD_BITS;
    }
    if carry != 0 {
        mag.push(carry as Word);
    }
}

impl FromStr for BigNum {
    type Err = Error;

    fn from_str(s: &str) -> Result<BigNum> {
        BigNum::parse_bytes(s.as_bytes(), 10).ok_or(Error::InvalidParam)
    }
}

impl fmt::Display for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(!self.negative, "", &self.magnitude_digits(10))
    }
}

impl fmt::UpperHex for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(!self.negative, "0x", &self.magnitude_digits(16))
    }
}

impl fmt::LowerHex for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.magnitude_digits(16).to_ascii_lowercase();
        f.pad_integral(!self.negative, "0x", &digits)
    }
}

impl fmt::Binary for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(!self.negative, "0b", &self.magnitude_digits(2))
    }
}
