//! Traits related to the key components

use crate::bignum::BigNum;
use crate::key::KeyHeader;
use crate::time::Timestamp;

/// Components of a public key.
pub trait PublicKeyParts {
    /// Returns the key's metadata.
    fn header(&self) -> &KeyHeader;

    /// Returns the modulus of the key.
    fn n(&self) -> &BigNum;

    /// Returns the public exponent, which depends on the format version.
    fn e(&self) -> u32 {
        self.header().public_exponent()
    }

    /// Returns the modulus size in bits as recorded in the header.
    fn bits(&self) -> u32 {
        self.header().bits()
    }

    /// Returns the modulus size in bytes. Raw signatures made with or for
    /// this key have the same size.
    fn size(&self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Returns the key identifier.
    fn id(&self) -> u64 {
        self.header().id()
    }

    /// Returns the creation time.
    fn create(&self) -> Timestamp {
        self.header().create()
    }

    /// Returns the expiration time.
    fn expire(&self) -> Timestamp {
        self.header().expire()
    }

    /// Returns the format version.
    fn version(&self) -> u16 {
        self.header().version()
    }
}

/// Components of a private key.
pub trait PrivateKeyParts: PublicKeyParts {
    /// Returns the private exponent of the key.
    fn d(&self) -> &BigNum;

    /// Returns the larger prime factor.
    fn p(&self) -> &BigNum;

    /// Returns the smaller prime factor.
    fn q(&self) -> &BigNum;

    /// Returns the precomputed value `d mod (p-1)`.
    fn dmp1(&self) -> &BigNum;

    /// Returns the precomputed value `d mod (q-1)`.
    fn dmq1(&self) -> &BigNum;

    /// Returns the precomputed value `q^-1 mod p`.
    fn iqmp(&self) -> &BigNum;
}
