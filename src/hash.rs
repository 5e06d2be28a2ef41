//! Fixed-size message digests.

use core::fmt;

use digest::Digest;
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Size in bytes of a [`Hash32`].
pub const HASH_SIZE: usize = 32;

/// A digest of up to 256 bits, left-aligned and zero-filled.
///
/// Equality is evaluated in constant time.
#[derive(Clone, Copy, Default)]
pub struct Hash32([u8; HASH_SIZE]);

impl Hash32 {
    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash32(bytes)
    }

    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Hashes `data` with `D`. Digests shorter than 32 bytes are stored at
    /// the front, longer ones are truncated.
    pub fn digest<D: Digest>(data: impl AsRef<[u8]>) -> Self {
        let out = D::digest(data);
        let mut bytes = [0u8; HASH_SIZE];
        let len = out.len().min(HASH_SIZE);
        bytes[..len].copy_from_slice(&out[..len]);
        Hash32(bytes)
    }

    /// SHA-256 of `data`.
    pub fn sha256(data: impl AsRef<[u8]>) -> Self {
        Hash32::digest::<Sha256>(data)
    }
}

/// Derives the private-key encryption key from a passphrase: its SHA-256.
pub fn passphrase_hash(passphrase: impl AsRef<[u8]>) -> Hash32 {
    Hash32::sha256(passphrase)
}

impl ConstantTimeEq for Hash32 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl PartialEq for Hash32 {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Hash32 {}

impl From<[u8; HASH_SIZE]> for Hash32 {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash32(bytes)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Zeroize for Hash32 {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::LowerHex for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({:x})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use md5::Md5;

    #[test]
    fn sha256_abc() {
        assert_eq!(
            Hash32::sha256(b"abc").as_bytes(),
            &hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn short_digest_is_left_aligned() {
        let h = Hash32::digest::<Md5>(b"");
        assert_eq!(&h.as_bytes()[..16], &hex!("d41d8cd98f00b204e9800998ecf8427e"));
        assert_eq!(&h.as_bytes()[16..], &[0u8; 16]);
    }

    #[test]
    fn equality() {
        assert_eq!(passphrase_hash("correct horse"), Hash32::sha256("correct horse"));
        assert_ne!(passphrase_hash("correct horse"), passphrase_hash("battery staple"));
        assert_eq!(
            format!("{:?}", Hash32::new([0xAB; 32])),
            format!("Hash32({})", "ab".repeat(32))
        );
    }
}
