//! Construction and parsing of the padded signature payload.
//!
//! The payload is `bits/8 - 1` bytes, read as a `bits - 8` bit number so it
//! always stays below the modulus:
//!
//! ```text
//! filler (bits/8 - 43) | timestamp secs (8, BE) | sig type (1) | shared (1) | hash (32)
//! ```
//!
//! The filler comes from a [`Prng`] salted with the timestamp and the hash,
//! so the same inputs always produce the same payload.

use alloc::vec::Vec;

use zeroize::Zeroizing;

use crate::bignum::BigNum;
use crate::errors::{Error, Result};
use crate::hash::{Hash32, HASH_SIZE};
use crate::prng::Prng;
use crate::time::Timestamp;

/// Bytes after the filler: timestamp, type, shared flag and hash.
pub(crate) const PAYLOAD_LEN: usize = 8 + 1 + 1 + HASH_SIZE;

/// Fields recovered from a payload, not yet range checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Payload {
    pub(crate) timestamp: Timestamp,
    pub(crate) sig_type: u8,
    pub(crate) shared: u8,
    pub(crate) hash: Hash32,
}

#[inline]
fn message_len(bits: u32) -> Result<usize> {
    let len = (bits / 8) as usize;
    if bits % 8 != 0 || len < PAYLOAD_LEN + 1 {
        return Err(Error::InvalidParam);
    }
    Ok(len - 1)
}

/// Builds the payload for a `bits`-bit key.
pub(crate) fn build_message(bits: u32, payload: &Payload) -> Result<BigNum> {
    let len = message_len(bits)?;
    let pad = len - PAYLOAD_LEN;

    let mut buf = Zeroizing::new(vec![0u8; len]);
    let mut prng = Prng::new();
    prng.absorb(&payload.timestamp.salt_bytes());
    prng.absorb(payload.hash.as_bytes());
    prng.fill(&mut buf[..pad]);

    let fields = &mut buf[pad..];
    fields[..8].copy_from_slice(&payload.timestamp.secs().to_be_bytes());
    fields[8] = payload.sig_type;
    fields[9] = payload.shared;
    fields[10..].copy_from_slice(payload.hash.as_bytes());

    BigNum::load(&buf, bits - 8)
}

/// Splits a recovered payload back into its fields.
///
/// Fails with [`Error::Format`] when `m` is wider than `bits - 8` bits.
pub(crate) fn parse_message(m: &BigNum, bits: u32) -> Result<Payload> {
    let len = message_len(bits)?;
    let buf: Zeroizing<Vec<u8>> = Zeroizing::new(m.save(bits - 8, bits - 8)?);

    let fields = &buf[len - PAYLOAD_LEN..];
    let mut secs = [0u8; 8];
    secs.copy_from_slice(&fields[..8]);
    let mut hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(&fields[10..]);

    Ok(Payload {
        timestamp: Timestamp::from_secs(i64::from_be_bytes(secs)),
        sig_type: fields[8],
        shared: fields[9],
        hash: Hash32::new(hash),
    })
}
