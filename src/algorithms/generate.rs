//! Generate the components of a key pair from seed material.

use core::mem;
use core::ops::ControlFlow;

use tracing::debug;
use zeroize::Zeroizing;

use crate::algorithms::rsa::{private_crt, private_direct, rsa_public};
use crate::bignum::{take_secret, BigNum};
use crate::errors::{Error, Result};
use crate::key::{KeyHeader, PrivateKey, PublicKey, KEY_VERSION, MIN_KEY_BITS, PUBLIC_EXPONENT};
use crate::prime_rand::generate_prime;
use crate::progress::{Progress, ProgressEvent};
use crate::time::Timestamp;

/// Width of the value pushed through a fresh key as a self-test.
const SELF_TEST_BITS: u32 = 504;

/// Validated parameters for [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenParams {
    header: KeyHeader,
}

impl KeyGenParams {
    /// Checks and collects the key metadata.
    ///
    /// `bits` must be a power of two of at least 512, `alias` at most 31
    /// bytes and `expire` not before `create`. Times keep whole seconds.
    pub fn new(
        bits: u32,
        id: u64,
        alias: impl AsRef<[u8]>,
        create: Timestamp,
        expire: Timestamp,
    ) -> Result<Self> {
        if bits < MIN_KEY_BITS || !bits.is_power_of_two() {
            return Err(Error::InvalidParam);
        }
        if expire.secs() < create.secs() {
            return Err(Error::InvalidParam);
        }
        let header = KeyHeader::new(KEY_VERSION, bits, id, create, expire, alias)?;
        Ok(KeyGenParams { header })
    }

    /// Requested modulus size.
    pub fn bits(&self) -> u32 {
        self.header.bits()
    }

    /// Number of seed bytes [`generate`] needs.
    pub fn seed_len(&self) -> usize {
        (self.header.bits() / 8) as usize
    }

    /// The header the generated keys will carry.
    pub fn header(&self) -> &KeyHeader {
        &self.header
    }
}

/// Generates a key pair deterministically from `seed`.
///
/// The first `bits/16` bytes of `seed` seed the search for one prime and the
/// next `bits/16` bytes the other, so `seed` must hold at least
/// [`KeyGenParams::seed_len`] bytes of good random material. The larger prime
/// becomes `p`. Before returning, a 504-bit value taken from the seed is
/// run through the public operation and back through both private paths.
///
/// # Errors
///
/// - [`Error::InvalidParam`] for a short seed.
/// - [`Error::DuplicatePrimes`] when both halves of the seed lead to the same
///   prime; retry with fresh material.
/// - [`Error::PrimeSearchExhausted`] or [`Error::NoInverse`], also
///   retryable.
/// - [`Error::Format`] if the self-test fails.
/// - [`Error::Cancelled`] if `progress` breaks.
pub fn generate<P>(
    params: &KeyGenParams,
    seed: &[u8],
    progress: &mut P,
) -> Result<(PublicKey, PrivateKey)>
where
    P: Progress + ?Sized,
{
    let bits = params.bits();
    if seed.len() < params.seed_len() {
        return Err(Error::InvalidParam);
    }
    let half = bits / 2;
    let split = (bits / 16) as usize;

    let mut p = Zeroizing::new(generate_prime(half, &seed[..split], progress)?);
    let mut q = Zeroizing::new(generate_prime(half, &seed[split..], progress)?);
    if *p < *q {
        mem::swap(&mut p, &mut q);
    }
    if *p == *q {
        debug!(bits, "both primes are equal");
        return Err(Error::DuplicatePrimes);
    }

    let n = &*p * &*q;
    let iqmp = Zeroizing::new(q.mod_inv(&p)?);

    // p - 1 and q - 1, both primes being odd
    p.set_bit(0, false)?;
    q.set_bit(0, false)?;
    let phi = Zeroizing::new(&*p * &*q);
    let d = Zeroizing::new(BigNum::from(PUBLIC_EXPONENT).mod_inv(&phi)?);
    let dmp1 = Zeroizing::new(d.modulo(&p));
    let dmq1 = Zeroizing::new(d.modulo(&q));
    p.set_bit(0, true)?;
    q.set_bit(0, true)?;

    let private_key = PrivateKey {
        header: params.header.clone(),
        n,
        d: take_secret(d),
        p: take_secret(p),
        q: take_secret(q),
        dmp1: take_secret(dmp1),
        dmq1: take_secret(dmq1),
        iqmp: take_secret(iqmp),
    };

    self_test(&private_key, seed, progress)?;
    debug!(bits, id = params.header.id(), "key pair generated");

    Ok((private_key.to_public_key(), private_key))
}

fn self_test<P>(key: &PrivateKey, seed: &[u8], progress: &mut P) -> Result<()>
where
    P: Progress + ?Sized,
{
    if let ControlFlow::Break(()) = progress.report(ProgressEvent::SelfTestBegin) {
        return Err(Error::Cancelled);
    }

    let x = Zeroizing::new(BigNum::load(seed, SELF_TEST_BITS)?);
    let c = rsa_public(key, &x)?;
    let direct = Zeroizing::new(private_direct(key, &c));
    let crt = Zeroizing::new(private_crt(key, &c));
    if *direct != *x || *crt != *x {
        debug!(bits = key.header.bits(), "key self-test failed");
        return Err(Error::Format);
    }

    // the key is complete by now, so a late break changes nothing
    #[allow(unused_must_use)]
    progress.report(ProgressEvent::SelfTestEnd);
    Ok(())
}
