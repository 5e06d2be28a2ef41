#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs)]

//! Arbitrary-precision integers and the Cosm RSA key and signature formats.
//!
//! The crate provides:
//!
//! - [`BigNum`], a sign-magnitude integer with the usual arithmetic,
//!   modular exponentiation and inversion, and big-endian byte encoding;
//! - Rabin-Miller testing ([`is_probably_prime`]) and a deterministic,
//!   seed-driven prime search ([`generate_prime`]);
//! - key pair generation ([`generate`]) and the public and
//!   passphrase-encrypted private key formats;
//! - the signature codec: [`encode`] / [`encode_with_clock`], [`decode`] and
//!   [`verify`].
//!
//! All randomness comes from the caller. Key generation consumes a seed
//! buffer, and signature padding is derived from the signed hash and its
//! timestamp, so identical inputs always give identical output.
//!
//! # Usage
//!
//! ```
//! use cosm_rsa::{
//!     decode, encode_with_clock, generate, FixedClock, Hash32, KeyGenParams, NoProgress,
//!     Shared, SigType, Timestamp,
//! };
//!
//! let create = Timestamp::from_secs(1_000);
//! let expire = create.checked_add_days(365).unwrap();
//! let params = KeyGenParams::new(512, 0x1, "example", create, expire)?;
//!
//! // use a real source of randomness here
//! let seed: Vec<u8> = (0u8..64).map(|i| i.wrapping_mul(151) ^ 0x5C).collect();
//! let (public_key, private_key) = generate(&params, &seed, &mut NoProgress)?;
//!
//! // Sign
//! let now = FixedClock(Timestamp::from_secs(2_000));
//! let hash = Hash32::sha256(b"hello world");
//! let sig = encode_with_clock(&hash, now.0, SigType::Sign, Shared::Yes, &private_key, &now)?;
//!
//! // Verify
//! let decoded = decode(&sig, &public_key)?;
//! assert_eq!(decoded.hash, hash);
//! assert_eq!(decoded.sig_type, SigType::Sign);
//! # Ok::<(), cosm_rsa::Error>(())
//! ```
//!
//! ## Key storage
//!
//! ```
//! use cosm_rsa::{generate, passphrase_hash, Key, KeyGenParams, NoProgress, Timestamp};
//!
//! let params = KeyGenParams::new(
//!     512,
//!     7,
//!     "stored",
//!     Timestamp::from_secs(0),
//!     Timestamp::from_secs(86_400),
//! )?;
//! let seed: Vec<u8> = (0u8..64).collect();
//! let (public_key, private_key) = generate(&params, &seed, &mut NoProgress)?;
//!
//! let pass = passphrase_hash("correct horse battery staple");
//! let public_bytes = public_key.to_bytes()?;
//! let private_bytes = private_key.to_bytes(&pass, &[0u8; 16])?;
//!
//! let (key, _) = Key::from_bytes(&public_bytes, None)?;
//! assert_eq!(key, Key::Public(public_key));
//! let (key, _) = Key::from_bytes(&private_bytes, Some(&pass))?;
//! assert_eq!(key, Key::Private(private_key));
//! # Ok::<(), cosm_rsa::Error>(())
//! ```
//!
//! # Authentication
//!
//! [`decode`] only unwraps a signature: it checks that the payload is well
//! formed and dated inside the key's validity window, and returns the hash
//! it carries. Comparing that hash against the expected content is the
//! caller's job ([`verify`] does both). The `create`, `id` and `timestamp`
//! fields in a [`Signature`]'s header are copied in the clear and are not
//! covered by the signature; only the fields returned by [`decode`] are.

#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub use rand_core;
pub use sha2;

mod algorithms;
mod bignum;
mod codec;
mod encoding;
pub mod errors;
mod hash;
mod internals;
mod key;
mod math;
mod prime;
mod prime_rand;
mod prng;
mod progress;
mod signature;
mod time;
pub mod traits;
pub mod transform;

pub use crate::{
    algorithms::generate::{generate, KeyGenParams},
    bignum::{BigNum, MAX_BITS, WORD_BITS},
    codec::{decode, encode_with_clock, verify, Decoded},
    encoding::{HEADER_SIZE, IV_SIZE, LEGACY_HEADER_SIZE},
    errors::{Error, Result},
    hash::{passphrase_hash, Hash32, HASH_SIZE},
    key::{
        Key, KeyHeader, KeyRef, PacketType, PrivateKey, PublicKey, ALIAS_SIZE, KEY_VERSION,
        LEGACY_ALIAS_SIZE, LEGACY_PUBLIC_EXPONENT, MIN_KEY_BITS, PUBLIC_EXPONENT,
    },
    math::ModInverse,
    prime::{is_probably_prime, rounds_for_bits, MIN_EXPLICIT_ROUNDS},
    prime_rand::{generate_prime, MAX_STEP, MIN_PRIME_BITS},
    prng::Prng,
    progress::{NoProgress, Progress, ProgressEvent},
    signature::{Shared, SigType, Signature, SIGNATURE_HEADER_SIZE},
    time::{Clock, FixedClock, Timestamp, SECS_PER_DAY, UNIX_EPOCH_OFFSET},
};

#[cfg(feature = "std")]
pub use crate::{codec::encode, time::SystemClock};

#[cfg(feature = "hazmat")]
pub mod hazmat;
