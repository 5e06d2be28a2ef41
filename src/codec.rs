//! Signature encoding and decoding.
//!
//! [`encode_with_clock`] pads a 32-byte hash with its timestamp, signature
//! type and shared flag, then applies the key: the private operation for
//! every signing type, or the public operation for [`SigType::Message`].
//! [`decode`] undoes it with the other half of the pair.
//!
//! Decoding proves only that the payload is well formed. Callers must
//! compare the recovered hash against their own, or use [`verify`].

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::algorithms::pad::{build_message, parse_message, Payload};
use crate::algorithms::rsa::{rsa_private, rsa_public};
use crate::errors::{Error, Result};
use crate::hash::Hash32;
use crate::key::{KeyHeader, KeyRef, KEY_VERSION, MIN_KEY_BITS};
use crate::signature::{Shared, SigType, Signature};
use crate::time::{Clock, Timestamp};

/// Fields recovered from inside a signature by [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The signed hash.
    pub hash: Hash32,
    /// Signing time in whole seconds.
    pub timestamp: Timestamp,
    /// Signature type.
    pub sig_type: SigType,
    /// Shared flag.
    pub shared: Shared,
}

/// Signs `hash` with the system clock as the notion of "now".
///
/// See [`encode_with_clock`].
#[cfg(feature = "std")]
pub fn encode<'a>(
    hash: &Hash32,
    timestamp: Timestamp,
    sig_type: SigType,
    shared: Shared,
    key: impl Into<KeyRef<'a>>,
) -> Result<Signature> {
    encode_with_clock(hash, timestamp, sig_type, shared, key, &crate::time::SystemClock)
}

/// Signs `hash`, or for [`SigType::Message`] encrypts it to a public key.
///
/// # Errors
///
/// - [`Error::InvalidParam`] for keys under 512 bits.
/// - [`Error::KeyTypeMismatch`] when a public key is asked for anything but
///   `Message`, or a private key for `Message`.
/// - [`Error::Expired`] when `clock.now()` or `timestamp` falls outside the
///   key's validity window.
pub fn encode_with_clock<'a, C>(
    hash: &Hash32,
    timestamp: Timestamp,
    sig_type: SigType,
    shared: Shared,
    key: impl Into<KeyRef<'a>>,
    clock: &C,
) -> Result<Signature>
where
    C: Clock + ?Sized,
{
    let key = key.into();
    let header = key.header();
    if header.bits() < MIN_KEY_BITS {
        return Err(Error::InvalidParam);
    }
    let private = matches!(key, KeyRef::Private(_));
    if private != sig_type.needs_private_key() {
        return Err(Error::KeyTypeMismatch);
    }
    if !header.is_valid_at(clock.now()) || !header.is_valid_at(timestamp) {
        debug!(id = header.id(), "refusing to sign outside the key's validity window");
        return Err(Error::Expired);
    }

    let payload = Payload {
        timestamp,
        sig_type: sig_type as u8,
        shared: shared as u8,
        hash: *hash,
    };
    let m = build_message(header.bits(), &payload)?;
    let sig = match key {
        KeyRef::Public(k) => rsa_public(k, &m)?,
        KeyRef::Private(k) => rsa_private(k, &m)?,
    };

    Ok(Signature {
        version: KEY_VERSION,
        bits: header.bits(),
        create: header.create(),
        id: header.id(),
        timestamp: timestamp.trunc(),
        sig_type,
        shared,
        sig,
    })
}

/// Recovers the payload of `sig` with the opposite half of the signing key.
///
/// A public key opens signatures of every type except
/// [`SigType::Message`]; a private key opens only `Message`. The hash is
/// returned as found: comparing it with the expected content is up to the
/// caller. The signature's own `create`, `id` and `timestamp` header fields
/// are not authenticated and are never returned from here.
///
/// # Errors
///
/// - [`Error::InvalidParam`] for keys under 512 bits.
/// - [`Error::KeyTypeMismatch`] for the wrong half of the pair.
/// - [`Error::Format`] when the signature header does not name this key,
///   or the recovered payload is malformed or dated outside the key's
///   validity window.
pub fn decode<'a>(sig: &Signature, key: impl Into<KeyRef<'a>>) -> Result<Decoded> {
    let key = key.into();
    let header = key.header();
    if header.bits() < MIN_KEY_BITS {
        return Err(Error::InvalidParam);
    }
    let private = matches!(key, KeyRef::Private(_));
    if private == sig.sig_type.needs_private_key() {
        return Err(Error::KeyTypeMismatch);
    }
    if !names_key(sig, header) {
        debug!(sig_id = sig.id, key_id = header.id(), "signature made by another key");
        return Err(Error::Format);
    }

    let m = match key {
        KeyRef::Public(k) => rsa_public(k, &sig.sig),
        KeyRef::Private(k) => rsa_private(k, &sig.sig),
    }
    .map_err(|_| Error::Format)?;
    let payload = parse_message(&m, header.bits()).map_err(|_| Error::Format)?;

    if !header.is_valid_at(payload.timestamp) {
        return Err(Error::Format);
    }
    Ok(Decoded {
        hash: payload.hash,
        timestamp: payload.timestamp,
        sig_type: SigType::try_from(payload.sig_type)?,
        shared: Shared::try_from(payload.shared)?,
    })
}

fn names_key(sig: &Signature, header: &KeyHeader) -> bool {
    sig.id == header.id() && sig.create.secs() == header.create().secs() && sig.bits == header.bits()
}

/// Decodes `sig` and checks, in constant time, that it carries `expected`.
///
/// Returns the decoded fields on success and [`Error::Verification`] when
/// the hashes differ.
pub fn verify<'a>(sig: &Signature, key: impl Into<KeyRef<'a>>, expected: &Hash32) -> Result<Decoded> {
    let decoded = decode(sig, key)?;
    if !bool::from(decoded.hash.ct_eq(expected)) {
        return Err(Error::Verification);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::generate::{generate, KeyGenParams};
    use crate::key::{PrivateKey, PublicKey};
    use crate::progress::NoProgress;
    use crate::time::FixedClock;
    use std::sync::OnceLock;

    fn pair() -> &'static (PublicKey, PrivateKey) {
        static PAIR: OnceLock<(PublicKey, PrivateKey)> = OnceLock::new();
        PAIR.get_or_init(|| {
            let params = KeyGenParams::new(
                512,
                9,
                "codec",
                Timestamp::from_secs(100),
                Timestamp::from_secs(200),
            )
            .unwrap();
            let seed: Vec<u8> = (0u8..64).map(|i| i.wrapping_mul(37) ^ 0xA5).collect();
            generate(&params, &seed, &mut NoProgress).unwrap()
        })
    }

    #[test]
    fn key_type_rules() {
        let (public_key, private_key) = pair();
        let clock = FixedClock(Timestamp::from_secs(150));
        let hash = Hash32::sha256(b"x");
        let ts = Timestamp::from_secs(150);

        for t in SigType::ALL {
            let with_public =
                encode_with_clock(&hash, ts, t, Shared::Yes, public_key, &clock).map(|_| ());
            let with_private =
                encode_with_clock(&hash, ts, t, Shared::Yes, private_key, &clock).map(|_| ());
            if t == SigType::Message {
                assert_eq!(with_public, Ok(()));
                assert_eq!(with_private, Err(Error::KeyTypeMismatch));
            } else {
                assert_eq!(with_public, Err(Error::KeyTypeMismatch));
                assert_eq!(with_private, Ok(()));
            }
        }
    }

    #[test]
    fn expiry_rules() {
        let (_, key) = pair();
        let hash = Hash32::sha256(b"x");
        let sign = |now: i64, ts: i64| {
            encode_with_clock(
                &hash,
                Timestamp::from_secs(ts),
                SigType::Sign,
                Shared::No,
                key,
                &FixedClock(Timestamp::from_secs(now)),
            )
            .map(|_| ())
        };
        assert_eq!(sign(99, 150), Err(Error::Expired));
        assert_eq!(sign(201, 150), Err(Error::Expired));
        assert_eq!(sign(150, 99), Err(Error::Expired));
        assert_eq!(sign(150, 201), Err(Error::Expired));
        // fractions inside the boundary seconds are accepted
        assert_eq!(
            encode_with_clock(
                &hash,
                Timestamp::from_parts(200, u64::MAX),
                SigType::Sign,
                Shared::No,
                key,
                &FixedClock(Timestamp::from_parts(100, 1)),
            )
            .map(|_| ()),
            Ok(())
        );
    }

    #[test]
    fn header_mismatch_is_format() {
        let (public_key, private_key) = pair();
        let clock = FixedClock(Timestamp::from_secs(150));
        let hash = Hash32::sha256(b"x");
        let sig = encode_with_clock(
            &hash,
            Timestamp::from_secs(150),
            SigType::Sign,
            Shared::No,
            private_key,
            &clock,
        )
        .unwrap();
        assert_eq!(sig.version(), KEY_VERSION);
        assert_eq!(sig.id(), 9);
        assert_eq!(sig.create(), Timestamp::from_secs(100));

        let mut other = sig.clone();
        other.id = 10;
        assert_eq!(decode(&other, public_key), Err(Error::Format));
        let mut other = sig.clone();
        other.create = Timestamp::from_secs(101);
        assert_eq!(decode(&other, public_key), Err(Error::Format));
        let mut other = sig.clone();
        other.bits = 1024;
        assert_eq!(decode(&other, public_key), Err(Error::Format));

        assert_eq!(decode(&sig, private_key), Err(Error::KeyTypeMismatch));
    }

    #[test]
    fn verify_compares_hash() {
        let (public_key, private_key) = pair();
        let clock = FixedClock(Timestamp::from_secs(150));
        let hash = Hash32::sha256(b"x");
        let sig = encode_with_clock(
            &hash,
            Timestamp::from_secs(150),
            SigType::Revoke,
            Shared::Yes,
            private_key,
            &clock,
        )
        .unwrap();
        assert_eq!(
            verify(&sig, public_key, &Hash32::sha256(b"y")),
            Err(Error::Verification)
        );
        assert!(verify(&sig, public_key, &hash).is_ok());
    }
}
