//! Public and private key types.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::bignum::BigNum;
use crate::errors::{Error, Result};
use crate::time::Timestamp;
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// Public exponent of version 1 keys.
pub const PUBLIC_EXPONENT: u32 = 65537;

/// Public exponent of version 0 keys.
pub const LEGACY_PUBLIC_EXPONENT: u32 = 17;

/// Format version written for new keys and signatures.
pub const KEY_VERSION: u16 = 1;

/// Smallest modulus size accepted anywhere.
pub const MIN_KEY_BITS: u32 = 512;

/// Stored alias size; the alias itself holds at most `ALIAS_SIZE - 1` bytes.
pub const ALIAS_SIZE: usize = 32;

/// Alias size of version 0 keys.
pub const LEGACY_ALIAS_SIZE: usize = 16;

/// Type tag leading every serialized key or signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PacketType {
    /// Public key.
    Public = 0x0005,
    /// Passphrase-protected private key.
    Private = 0x000A,
    /// Signature.
    Signature = 0x0050,
}

impl TryFrom<u16> for PacketType {
    type Error = Error;

    fn try_from(tag: u16) -> Result<Self> {
        match tag {
            0x0005 => Ok(PacketType::Public),
            0x000A => Ok(PacketType::Private),
            0x0050 => Ok(PacketType::Signature),
            _ => Err(Error::Format),
        }
    }
}

/// Stored alias size for a format version.
pub(crate) fn alias_size(version: u16) -> usize {
    if version == 0 {
        LEGACY_ALIAS_SIZE
    } else {
        ALIAS_SIZE
    }
}

/// Metadata shared by public and private keys.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyHeader {
    pub(crate) version: u16,
    pub(crate) bits: u32,
    pub(crate) id: u64,
    pub(crate) create: Timestamp,
    pub(crate) expire: Timestamp,
    pub(crate) alias: [u8; ALIAS_SIZE],
}

impl KeyHeader {
    /// Builds a header. Times keep whole seconds only.
    ///
    /// Fails with [`Error::InvalidParam`] if `version` is newer than
    /// [`KEY_VERSION`], or `alias` does not fit the version's alias field
    /// with a terminating NUL (at most 31 bytes, 15 for version 0).
    pub fn new(
        version: u16,
        bits: u32,
        id: u64,
        create: Timestamp,
        expire: Timestamp,
        alias: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let alias = alias.as_ref();
        if version > KEY_VERSION || alias.len() >= alias_size(version) {
            return Err(Error::InvalidParam);
        }
        let mut stored = [0u8; ALIAS_SIZE];
        stored[..alias.len()].copy_from_slice(alias);
        Ok(KeyHeader {
            version,
            bits,
            id,
            create: create.trunc(),
            expire: expire.trunc(),
            alias: stored,
        })
    }

    /// Format version.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Key identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Start of the validity window.
    pub fn create(&self) -> Timestamp {
        self.create
    }

    /// End of the validity window.
    pub fn expire(&self) -> Timestamp {
        self.expire
    }

    /// Alias bytes up to the first NUL.
    pub fn alias_bytes(&self) -> &[u8] {
        let end = self.alias.iter().position(|&b| b == 0).unwrap_or(ALIAS_SIZE);
        &self.alias[..end]
    }

    /// Alias as text, if it is UTF-8.
    pub fn alias(&self) -> Option<&str> {
        core::str::from_utf8(self.alias_bytes()).ok()
    }

    /// Whether `at` falls inside `[create, expire]`, compared in whole
    /// seconds.
    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        self.create.secs() <= at.secs() && at.secs() <= self.expire.secs()
    }

    /// Public exponent implied by the version.
    pub fn public_exponent(&self) -> u32 {
        if self.version == 0 {
            LEGACY_PUBLIC_EXPONENT
        } else {
            PUBLIC_EXPONENT
        }
    }
}

impl fmt::Debug for KeyHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHeader")
            .field("version", &self.version)
            .field("bits", &self.bits)
            .field("id", &format_args!("{:#018x}", self.id))
            .field("create", &self.create)
            .field("expire", &self.expire)
            .field("alias", &self.alias().unwrap_or("<binary>"))
            .finish()
    }
}

/// Represents the public part of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    pub(crate) header: KeyHeader,
    pub(crate) n: BigNum,
}

impl PublicKey {
    /// Builds a public key from its header and modulus.
    pub fn from_components(header: KeyHeader, n: BigNum) -> Result<Self> {
        check_modulus(&header, &n)?;
        Ok(PublicKey { header, n })
    }
}

/// Represents a whole key, public and private parts.
///
/// Secret fields are wiped when the key is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub(crate) header: KeyHeader,
    pub(crate) n: BigNum,
    pub(crate) d: BigNum,
    pub(crate) p: BigNum,
    pub(crate) q: BigNum,
    pub(crate) dmp1: BigNum,
    pub(crate) dmq1: BigNum,
    pub(crate) iqmp: BigNum,
}

impl PrivateKey {
    /// Builds a private key from its parts and runs [`PrivateKey::validate`].
    #[allow(clippy::too_many_arguments)]
    pub fn from_components(
        header: KeyHeader,
        n: BigNum,
        d: BigNum,
        p: BigNum,
        q: BigNum,
        dmp1: BigNum,
        dmq1: BigNum,
        iqmp: BigNum,
    ) -> Result<Self> {
        let key = PrivateKey {
            header,
            n,
            d,
            p,
            q,
            dmp1,
            dmq1,
            iqmp,
        };
        key.validate()?;
        Ok(key)
    }

    /// Returns the public half of this key.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey {
            header: self.header.clone(),
            n: self.n.clone(),
        }
    }

    /// Checks the arithmetic relations between the parts: `n = p * q`,
    /// `p > q`, `d * e == 1` modulo `p - 1` and `q - 1`, and for version 1
    /// keys the CRT values.
    ///
    /// Version 0 keys carry unreliable CRT values, so those are not checked.
    pub fn validate(&self) -> Result<()> {
        check_modulus(&self.header, &self.n)?;
        if self.q.is_zero() || self.p <= self.q || self.n != &self.p * &self.q {
            return Err(Error::InvalidParam);
        }

        let e = BigNum::from(self.header.public_exponent());
        let one = BigNum::one();
        for prime in [&self.p, &self.q] {
            let pm1 = prime - &one;
            if !(&e * &self.d).modulo(&pm1).is_one() {
                return Err(Error::InvalidParam);
            }
        }

        if self.header.version != 0 {
            let pm1 = &self.p - &one;
            let qm1 = &self.q - &one;
            if self.dmp1 != self.d.modulo(&pm1)
                || self.dmq1 != self.d.modulo(&qm1)
                || !(&self.iqmp * &self.q).modulo(&self.p).is_one()
            {
                return Err(Error::InvalidParam);
            }
        }
        Ok(())
    }
}

fn check_modulus(header: &KeyHeader, n: &BigNum) -> Result<()> {
    if header.bits < MIN_KEY_BITS || n.is_negative() || n.is_even() || n.bits() > header.bits {
        return Err(Error::InvalidParam);
    }
    Ok(())
}

impl From<&PrivateKey> for PublicKey {
    fn from(private_key: &PrivateKey) -> Self {
        private_key.to_public_key()
    }
}

impl From<PrivateKey> for PublicKey {
    fn from(private_key: PrivateKey) -> Self {
        private_key.to_public_key()
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dmp1.zeroize();
        self.dmq1.zeroize();
        self.iqmp.zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("header", &self.header)
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

impl PublicKeyParts for PublicKey {
    fn header(&self) -> &KeyHeader {
        &self.header
    }

    fn n(&self) -> &BigNum {
        &self.n
    }
}

impl PublicKeyParts for PrivateKey {
    fn header(&self) -> &KeyHeader {
        &self.header
    }

    fn n(&self) -> &BigNum {
        &self.n
    }
}

impl PrivateKeyParts for PrivateKey {
    fn d(&self) -> &BigNum {
        &self.d
    }

    fn p(&self) -> &BigNum {
        &self.p
    }

    fn q(&self) -> &BigNum {
        &self.q
    }

    fn dmp1(&self) -> &BigNum {
        &self.dmp1
    }

    fn dmq1(&self) -> &BigNum {
        &self.dmq1
    }

    fn iqmp(&self) -> &BigNum {
        &self.iqmp
    }
}

/// A key of either kind, as produced by [`Key::from_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A public key.
    Public(PublicKey),
    /// A private key.
    Private(PrivateKey),
}

impl Key {
    /// Whether this is a private key.
    pub fn is_private(&self) -> bool {
        matches!(self, Key::Private(_))
    }

    /// The public half.
    pub fn to_public_key(&self) -> PublicKey {
        match self {
            Key::Public(k) => k.clone(),
            Key::Private(k) => k.to_public_key(),
        }
    }

    /// Borrows the key.
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        self.into()
    }
}

impl PublicKeyParts for Key {
    fn header(&self) -> &KeyHeader {
        match self {
            Key::Public(k) => &k.header,
            Key::Private(k) => &k.header,
        }
    }

    fn n(&self) -> &BigNum {
        match self {
            Key::Public(k) => &k.n,
            Key::Private(k) => &k.n,
        }
    }
}

impl From<PublicKey> for Key {
    fn from(key: PublicKey) -> Self {
        Key::Public(key)
    }
}

impl From<PrivateKey> for Key {
    fn from(key: PrivateKey) -> Self {
        Key::Private(key)
    }
}

/// A borrowed key of either kind, accepted by the signature codec.
#[derive(Debug, Clone, Copy)]
pub enum KeyRef<'a> {
    /// A public key.
    Public(&'a PublicKey),
    /// A private key.
    Private(&'a PrivateKey),
}

impl<'a> KeyRef<'a> {
    pub(crate) fn header(&self) -> &'a KeyHeader {
        match *self {
            KeyRef::Public(k) => &k.header,
            KeyRef::Private(k) => &k.header,
        }
    }
}

impl<'a> From<&'a PublicKey> for KeyRef<'a> {
    fn from(key: &'a PublicKey) -> Self {
        KeyRef::Public(key)
    }
}

impl<'a> From<&'a PrivateKey> for KeyRef<'a> {
    fn from(key: &'a PrivateKey) -> Self {
        KeyRef::Private(key)
    }
}

impl<'a> From<&'a Key> for KeyRef<'a> {
    fn from(key: &'a Key) -> Self {
        match key {
            Key::Public(k) => KeyRef::Public(k),
            Key::Private(k) => KeyRef::Private(k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_key(version: u16) -> PrivateKey {
        // p = 61, q = 53, n = 3233; both exponents are 17 mod phi
        let header = KeyHeader::new(
            version,
            MIN_KEY_BITS,
            7,
            Timestamp::from_secs(10),
            Timestamp::from_secs(20),
            "toy",
        )
        .unwrap();
        let p = BigNum::from(61u32);
        let q = BigNum::from(53u32);
        let n = &p * &q;
        let e = BigNum::from(header.public_exponent());
        let phi = BigNum::from(60u32 * 52);
        let d = e.modulo(&phi).mod_inv(&phi).unwrap();
        let dmp1 = d.modulo(&BigNum::from(60u32));
        let dmq1 = d.modulo(&BigNum::from(52u32));
        let iqmp = q.mod_inv(&p).unwrap();
        PrivateKey::from_components(header, n, d, p, q, dmp1, dmq1, iqmp).unwrap()
    }

    #[test]
    fn packet_type_tags() {
        assert_eq!(PacketType::try_from(0x0005), Ok(PacketType::Public));
        assert_eq!(PacketType::try_from(0x000A), Ok(PacketType::Private));
        assert_eq!(PacketType::try_from(0x0050), Ok(PacketType::Signature));
        assert_eq!(PacketType::try_from(0x0006), Err(Error::Format));
        assert_eq!(PacketType::Private as u16, 0x000A);
    }

    #[test]
    fn header_alias_and_window() {
        let header = KeyHeader::new(
            1,
            1024,
            1,
            Timestamp::from_parts(100, 1 << 63),
            Timestamp::from_secs(200),
            "test",
        )
        .unwrap();
        assert_eq!(header.alias(), Some("test"));
        assert_eq!(header.alias_bytes(), b"test");
        assert_eq!(header.create(), Timestamp::from_secs(100));
        assert!(header.is_valid_at(Timestamp::from_parts(100, 5)));
        assert!(header.is_valid_at(Timestamp::from_parts(200, 5)));
        assert!(!header.is_valid_at(Timestamp::from_secs(99)));
        assert!(!header.is_valid_at(Timestamp::from_secs(201)));

        let long = [b'a'; ALIAS_SIZE];
        assert_eq!(
            KeyHeader::new(1, 1024, 1, Timestamp::default(), Timestamp::default(), long)
                .unwrap_err(),
            Error::InvalidParam
        );
        assert!(KeyHeader::new(
            1,
            1024,
            1,
            Timestamp::default(),
            Timestamp::default(),
            &long[1..]
        )
        .is_ok());
    }

    #[test]
    fn header_limits_follow_version() {
        let t = Timestamp::default();
        assert_eq!(
            KeyHeader::new(2, 1024, 1, t, t, "").unwrap_err(),
            Error::InvalidParam
        );
        assert_eq!(
            KeyHeader::new(0, 1024, 1, t, t, "twenty-byte-alias!!!").unwrap_err(),
            Error::InvalidParam
        );
        assert_eq!(
            KeyHeader::new(0, 1024, 1, t, t, [b'x'; LEGACY_ALIAS_SIZE]).unwrap_err(),
            Error::InvalidParam
        );
        let header = KeyHeader::new(0, 1024, 1, t, t, [b'x'; LEGACY_ALIAS_SIZE - 1]).unwrap();
        assert_eq!(header.alias_bytes().len(), LEGACY_ALIAS_SIZE - 1);
    }

    #[test]
    fn version_gates_exponent() {
        assert_eq!(toy_key(0).e(), LEGACY_PUBLIC_EXPONENT);
        assert_eq!(toy_key(1).e(), PUBLIC_EXPONENT);
    }

    #[test]
    fn public_from_private() {
        let private_key = toy_key(1);
        let public_key = PublicKey::from(&private_key);
        assert_eq!(public_key.n(), private_key.n());
        assert_eq!(public_key.header(), private_key.header());
        assert_eq!(Key::from(private_key).to_public_key(), public_key);
    }

    #[test]
    fn validate_catches_bad_parts() {
        let key = toy_key(1);
        assert!(key.validate().is_ok());

        let mut broken = key.clone();
        broken.iqmp = BigNum::from(2u32);
        assert_eq!(broken.validate(), Err(Error::InvalidParam));

        // version 0 tolerates a wrong iqmp
        let mut legacy = toy_key(0);
        legacy.iqmp = BigNum::from(2u32);
        assert!(legacy.validate().is_ok());

        let mut swapped = key.clone();
        core::mem::swap(&mut swapped.p, &mut swapped.q);
        assert_eq!(swapped.validate(), Err(Error::InvalidParam));
    }

    #[test]
    fn zeroize_clears_secrets() {
        let mut key = toy_key(1);
        key.zeroize();
        assert!(key.d().is_zero());
        assert!(key.p().is_zero());
        assert!(key.iqmp().is_zero());
        assert!(!key.n().is_zero());
    }

    #[test]
    fn debug_hides_secrets() {
        let s = format!("{:?}", toy_key(1));
        assert!(s.contains("alias: \"toy\""));
        assert!(!s.contains("dmp1"));
    }
}
