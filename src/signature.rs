//! Signatures and their serialized form.
//!
//! Layout, big-endian:
//!
//! ```text
//! type (2) | version (2) | bits (4) | create (8) | id (8) | timestamp (8) |
//! sig type (1) | shared (1) | sig (bits/8)
//! ```
//!
//! The `create`, `id` and `timestamp` header fields are copied in the clear
//! and are not covered by the RSA operation. Anything security relevant
//! must come from [`decode`](crate::decode), which recovers the timestamp,
//! type, shared flag and hash from inside the signed payload.

use alloc::vec::Vec;

use crate::bignum::BigNum;
use crate::errors::{Error, Result};
use crate::internals::{be_i64, be_u16, be_u32, be_u64};
use crate::key::{PacketType, MIN_KEY_BITS};
use crate::time::Timestamp;

/// Size of the fixed signature header.
pub const SIGNATURE_HEADER_SIZE: usize = 34;

/// What a signature asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SigType {
    /// A message encrypted to the key owner; made with a public key.
    Message = 0x00,
    /// A plain signature.
    Sign = 0x05,
    /// Signer knows the key owner.
    Known = 0x06,
    /// Weak identity check of the key owner.
    Weak = 0x09,
    /// Strong identity check of the key owner.
    Strong = 0x0A,
    /// Timestamping service signature.
    Timestamp = 0x0F,
    /// Key revocation.
    Revoke = 0xFF,
}

impl SigType {
    /// Every signature type, [`SigType::Message`] first.
    pub const ALL: [SigType; 7] = [
        SigType::Message,
        SigType::Sign,
        SigType::Known,
        SigType::Weak,
        SigType::Strong,
        SigType::Timestamp,
        SigType::Revoke,
    ];

    /// Whether producing this type takes a private key.
    pub fn needs_private_key(self) -> bool {
        self != SigType::Message
    }
}

impl TryFrom<u8> for SigType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        SigType::ALL
            .into_iter()
            .find(|t| *t as u8 == value)
            .ok_or(Error::Format)
    }
}

/// Whether a signature is meant for every holder of the public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Shared {
    /// Only meaningful to the signer.
    No = 0x33,
    /// Verifiable by anyone with the public key.
    Yes = 0xCC,
}

impl TryFrom<u8> for Shared {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x33 => Ok(Shared::No),
            0xCC => Ok(Shared::Yes),
            _ => Err(Error::Format),
        }
    }
}

/// A signature produced by [`encode`](crate::encode_with_clock).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub(crate) version: u16,
    pub(crate) bits: u32,
    pub(crate) create: Timestamp,
    pub(crate) id: u64,
    pub(crate) timestamp: Timestamp,
    pub(crate) sig_type: SigType,
    pub(crate) shared: Shared,
    pub(crate) sig: BigNum,
}

impl Signature {
    /// Format version.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Size of the signing key's modulus.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Signing key's creation time, unauthenticated.
    pub fn create(&self) -> Timestamp {
        self.create
    }

    /// Signing key's id, unauthenticated.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Signing time as stated in the header, unauthenticated.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Signature type as stated in the header, unauthenticated.
    pub fn sig_type(&self) -> SigType {
        self.sig_type
    }

    /// Shared flag as stated in the header, unauthenticated.
    pub fn shared(&self) -> Shared {
        self.shared
    }

    /// The raw RSA value.
    pub fn sig(&self) -> &BigNum {
        &self.sig
    }

    /// Length of [`Signature::to_bytes`] output.
    pub fn encoded_len(&self) -> usize {
        SIGNATURE_HEADER_SIZE + (self.bits / 8) as usize
    }

    /// Serializes the signature.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.encoded_len()];
        out[0..2].copy_from_slice(&(PacketType::Signature as u16).to_be_bytes());
        out[2..4].copy_from_slice(&self.version.to_be_bytes());
        out[4..8].copy_from_slice(&self.bits.to_be_bytes());
        out[8..16].copy_from_slice(&self.create.secs().to_be_bytes());
        out[16..24].copy_from_slice(&self.id.to_be_bytes());
        out[24..32].copy_from_slice(&self.timestamp.secs().to_be_bytes());
        out[32] = self.sig_type as u8;
        out[33] = self.shared as u8;
        self.sig.write_be(&mut out[SIGNATURE_HEADER_SIZE..])?;
        Ok(out)
    }

    /// Parses a signature from the start of `buf` and returns it with the
    /// number of bytes consumed.
    ///
    /// A buffer shorter than the header, or than the size the header
    /// declares, gives [`Error::InvalidParam`]. Bad header fields give
    /// [`Error::Format`].
    pub fn from_bytes(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < SIGNATURE_HEADER_SIZE {
            return Err(Error::InvalidParam);
        }
        if PacketType::try_from(be_u16(&buf[0..2]))? != PacketType::Signature {
            return Err(Error::Format);
        }
        let version = be_u16(&buf[2..4]);
        let bits = be_u32(&buf[4..8]);
        if version > 1 || bits < MIN_KEY_BITS || bits % 8 != 0 {
            return Err(Error::Format);
        }
        let sig_type = SigType::try_from(buf[32])?;
        let shared = Shared::try_from(buf[33])?;

        let total = SIGNATURE_HEADER_SIZE + (bits / 8) as usize;
        if buf.len() < total {
            return Err(Error::InvalidParam);
        }

        let sig = Signature {
            version,
            bits,
            create: Timestamp::from_secs(be_i64(&buf[8..16])),
            id: be_u64(&buf[16..24]),
            timestamp: Timestamp::from_secs(be_i64(&buf[24..32])),
            sig_type,
            shared,
            sig: BigNum::load(&buf[SIGNATURE_HEADER_SIZE..total], bits)?,
        };
        Ok((sig, total))
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Signature::from_bytes(bytes).map(|(sig, _)| sig)
    }
}
