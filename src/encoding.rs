//! Serialized key formats.
//!
//! Every key starts with a header, big-endian:
//!
//! ```text
//! type (2) | version (2) | bits (4) | create (8) | id (8) | expire (8) | alias (32, or 16 for version 0)
//! ```
//!
//! A public key follows it with `n` in `bits/8` bytes. A private key follows
//! it with `n`, then the secret block `d | p | q | dmp1 | dmq1 | iqmp`
//! encrypted with AES-256-ECB under the passphrase hash, then a 16-byte IV
//! and the big-endian CRC-32 of the plaintext secret block. `d` takes
//! `bits/8` bytes and every other secret `bits/16`.

use alloc::vec::Vec;
use core::ops::Range;

use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use crate::bignum::{take_secret, BigNum};
use crate::errors::{Error, Result};
use crate::hash::Hash32;
use crate::internals::{be_i64, be_u16, be_u32, be_u64};
use crate::key::{
    alias_size, Key, KeyHeader, PacketType, PrivateKey, PublicKey, ALIAS_SIZE, KEY_VERSION,
    LEGACY_ALIAS_SIZE, MIN_KEY_BITS,
};
use crate::time::Timestamp;
use crate::transform::{Aes256Ecb, Crc32, Direction, Transform};

/// Header size of version 1 keys.
pub const HEADER_SIZE: usize = 32 + ALIAS_SIZE;

/// Header size of version 0 keys.
pub const LEGACY_HEADER_SIZE: usize = 32 + LEGACY_ALIAS_SIZE;

/// Size of the IV stored with a private key.
pub const IV_SIZE: usize = 16;

const CRC_SIZE: usize = 4;

/// Secret block slots in units of `bits/16` bytes: `d` takes two.
const SECRET_SLOTS: usize = 7;

/// `bits/16`, the size unit of the key body.
fn unit(bits: u32) -> usize {
    (bits / 16) as usize
}

impl KeyHeader {
    /// Serialized header size for this version.
    pub fn encoded_len(&self) -> usize {
        32 + alias_size(self.version)
    }

    fn write(&self, tag: PacketType, out: &mut [u8]) {
        out[0..2].copy_from_slice(&(tag as u16).to_be_bytes());
        out[2..4].copy_from_slice(&self.version.to_be_bytes());
        out[4..8].copy_from_slice(&self.bits.to_be_bytes());
        out[8..16].copy_from_slice(&self.create.secs().to_be_bytes());
        out[16..24].copy_from_slice(&self.id.to_be_bytes());
        out[24..32].copy_from_slice(&self.expire.secs().to_be_bytes());
        let alias = alias_size(self.version);
        out[32..32 + alias].copy_from_slice(&self.alias[..alias]);
    }

    fn read(buf: &[u8]) -> Result<(PacketType, KeyHeader)> {
        if buf.len() < 8 {
            return Err(Error::Format);
        }
        let tag = PacketType::try_from(be_u16(&buf[0..2]))?;
        let version = be_u16(&buf[2..4]);
        let bits = be_u32(&buf[4..8]);
        if tag == PacketType::Signature || version > KEY_VERSION {
            return Err(Error::Format);
        }
        if bits < MIN_KEY_BITS || bits % 16 != 0 {
            return Err(Error::Format);
        }

        let alias_len = alias_size(version);
        let head = buf.get(..32 + alias_len).ok_or(Error::Format)?;
        let mut alias = [0u8; ALIAS_SIZE];
        alias[..alias_len].copy_from_slice(&head[32..]);

        let header = KeyHeader {
            version,
            bits,
            id: be_u64(&head[16..24]),
            create: Timestamp::from_secs(be_i64(&head[8..16])),
            expire: Timestamp::from_secs(be_i64(&head[24..32])),
            alias,
        };
        Ok((tag, header))
    }
}

impl PublicKey {
    /// Length of [`PublicKey::to_bytes`] output.
    pub fn encoded_len(&self) -> usize {
        self.header.encoded_len() + 2 * unit(self.header.bits)
    }

    /// Serializes the public key.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let head = self.header.encoded_len();
        let mut out = vec![0u8; self.encoded_len()];
        self.header.write(PacketType::Public, &mut out[..head]);
        self.n.write_be(&mut out[head..])?;
        Ok(out)
    }

    /// Parses a public key from the start of `buf` and returns it with the
    /// number of bytes consumed.
    pub fn from_bytes(buf: &[u8]) -> Result<(Self, usize)> {
        let (tag, header) = KeyHeader::read(buf)?;
        if tag != PacketType::Public {
            return Err(Error::Format);
        }
        let head = header.encoded_len();
        let total = head + 2 * unit(header.bits);
        let body = buf.get(head..total).ok_or(Error::Format)?;
        let n = BigNum::load(body, header.bits)?;
        Ok((PublicKey { header, n }, total))
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        PublicKey::from_bytes(bytes).map(|(key, _)| key)
    }
}

/// Byte ranges of the secret block, in storage order.
fn secret_ranges(bits: u32) -> [Range<usize>; 6] {
    let u = unit(bits);
    [0..2 * u, 2 * u..3 * u, 3 * u..4 * u, 4 * u..5 * u, 5 * u..6 * u, 6 * u..7 * u]
}

impl PrivateKey {
    /// Length of [`PrivateKey::to_bytes`] output.
    pub fn encoded_len(&self) -> usize {
        self.header.encoded_len() + (2 + SECRET_SLOTS) * unit(self.header.bits) + IV_SIZE + CRC_SIZE
    }

    /// Serializes the key, encrypting the secrets under `pass_hash`.
    ///
    /// `iv` is stored as given. The secret block is a whole number of AES
    /// blocks only when `bits` is a multiple of 256; other sizes fail with
    /// [`Error::InvalidParam`].
    pub fn to_bytes(&self, pass_hash: &Hash32, iv: &[u8; IV_SIZE]) -> Result<Vec<u8>> {
        let bits = self.header.bits;
        let head = self.header.encoded_len();
        let n_end = head + 2 * unit(bits);
        let block_end = n_end + SECRET_SLOTS * unit(bits);

        let mut out = vec![0u8; self.encoded_len()];
        self.header.write(PacketType::Private, &mut out[..head]);
        self.n.write_be(&mut out[head..n_end])?;

        let mut block = Zeroizing::new(vec![0u8; SECRET_SLOTS * unit(bits)]);
        let fields = [&self.d, &self.p, &self.q, &self.dmp1, &self.dmq1, &self.iqmp];
        for (field, range) in fields.into_iter().zip(secret_ranges(bits)) {
            field.write_be(&mut block[range])?;
        }

        let mut crc = Crc32::new();
        crc.update(&block)?;
        let crc = crc.finish()?;

        let mut aes = Aes256Ecb::new(pass_hash, Direction::Encrypt);
        aes.update(&block)?;
        let cipher = aes.finish()?;

        out[n_end..block_end].copy_from_slice(&cipher);
        out[block_end..block_end + IV_SIZE].copy_from_slice(iv);
        out[block_end + IV_SIZE..].copy_from_slice(&crc.to_be_bytes());
        Ok(out)
    }

    /// Parses and decrypts a private key from the start of `buf`, returning
    /// it with the number of bytes consumed.
    ///
    /// A checksum mismatch after decryption gives
    /// [`Error::WrongPassphrase`]; anything structurally wrong gives
    /// [`Error::Format`].
    pub fn from_bytes(buf: &[u8], pass_hash: &Hash32) -> Result<(Self, usize)> {
        let (tag, header) = KeyHeader::read(buf)?;
        if tag != PacketType::Private {
            return Err(Error::Format);
        }
        let bits = header.bits;
        let head = header.encoded_len();
        let n_end = head + 2 * unit(bits);
        let block_end = n_end + SECRET_SLOTS * unit(bits);
        let total = block_end + IV_SIZE + CRC_SIZE;
        if buf.len() < total {
            return Err(Error::Format);
        }

        let n = BigNum::load(&buf[head..n_end], bits)?;

        let mut aes = Aes256Ecb::new(pass_hash, Direction::Decrypt);
        aes.update(&buf[n_end..block_end])?;
        let plain = aes.finish().map_err(|_| Error::Format)?;

        let mut crc = Crc32::new();
        crc.update(&plain)?;
        let crc = crc.finish()?.to_be_bytes();
        if !bool::from(crc[..].ct_eq(&buf[block_end + IV_SIZE..total])) {
            debug!(bits, id = header.id, "private key checksum mismatch");
            return Err(Error::WrongPassphrase);
        }

        let [d, p, q, dmp1, dmq1, iqmp] =
            secret_ranges(bits).map(|range| load_secret(&plain[range]));
        let (d, p, q) = (d?, p?, q?);
        let (dmp1, dmq1, iqmp) = (dmp1?, dmq1?, iqmp?);
        let key = PrivateKey {
            header,
            n,
            d: take_secret(d),
            p: take_secret(p),
            q: take_secret(q),
            dmp1: take_secret(dmp1),
            dmq1: take_secret(dmq1),
            iqmp: take_secret(iqmp),
        };
        Ok((key, total))
    }
}

fn load_secret(bytes: &[u8]) -> Result<Zeroizing<BigNum>> {
    BigNum::load(bytes, (bytes.len() * 8) as u32).map(Zeroizing::new)
}

impl Key {
    /// Parses a public or private key from the start of `buf`, choosing by
    /// the type tag, and returns it with the number of bytes consumed.
    ///
    /// Private keys need `pass_hash`; without it they fail with
    /// [`Error::InvalidParam`].
    pub fn from_bytes(buf: &[u8], pass_hash: Option<&Hash32>) -> Result<(Self, usize)> {
        let (tag, _) = KeyHeader::read(buf)?;
        match (tag, pass_hash) {
            (PacketType::Public, _) => {
                PublicKey::from_bytes(buf).map(|(key, used)| (Key::Public(key), used))
            }
            (PacketType::Private, Some(pass_hash)) => PrivateKey::from_bytes(buf, pass_hash)
                .map(|(key, used)| (Key::Private(key), used)),
            (PacketType::Private, None) => Err(Error::InvalidParam),
            (PacketType::Signature, _) => Err(Error::Format),
        }
    }

    /// Length of the serialized key.
    pub fn encoded_len(&self) -> usize {
        match self {
            Key::Public(key) => key.encoded_len(),
            Key::Private(key) => key.encoded_len(),
        }
    }
}
