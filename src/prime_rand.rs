//! Deterministic prime search from caller-supplied seed bytes.

use core::ops::ControlFlow;

use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::bignum::BigNum;
use crate::errors::{Error, Result};
use crate::prime::rabin_miller;
use crate::progress::{Progress, ProgressEvent};

/// Smallest prime size [`generate_prime`] accepts.
pub const MIN_PRIME_BITS: u32 = 256;

/// Largest forward offset walked from the seed before giving up.
pub const MAX_STEP: u32 = 0x7FFF_0000;

/// Sieve moduli: the public exponent 65537 followed by the odd primes below
/// 2000.
///
/// The first entry is checked against `candidate - 1`, so that every prime
/// found is coprime to the public exponent after subtracting one.
pub(crate) const SMALL_PRIMES: [u32; 303] = [
    65537, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37,
    41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151,
    157, 163, 167, 173, 179, 181, 191, 193, 197, 199, 211, 223,
    227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281,
    283, 293, 307, 311, 313, 317, 331, 337, 347, 349, 353, 359,
    367, 373, 379, 383, 389, 397, 401, 409, 419, 421, 431, 433,
    439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503,
    509, 521, 523, 541, 547, 557, 563, 569, 571, 577, 587, 593,
    599, 601, 607, 613, 617, 619, 631, 641, 643, 647, 653, 659,
    661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743,
    751, 757, 761, 769, 773, 787, 797, 809, 811, 821, 823, 827,
    829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911,
    919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
    1009, 1013, 1019, 1021, 1031, 1033, 1039, 1049, 1051, 1061, 1063, 1069,
    1087, 1091, 1093, 1097, 1103, 1109, 1117, 1123, 1129, 1151, 1153, 1163,
    1171, 1181, 1187, 1193, 1201, 1213, 1217, 1223, 1229, 1231, 1237, 1249,
    1259, 1277, 1279, 1283, 1289, 1291, 1297, 1301, 1303, 1307, 1319, 1321,
    1327, 1361, 1367, 1373, 1381, 1399, 1409, 1423, 1427, 1429, 1433, 1439,
    1447, 1451, 1453, 1459, 1471, 1481, 1483, 1487, 1489, 1493, 1499, 1511,
    1523, 1531, 1543, 1549, 1553, 1559, 1567, 1571, 1579, 1583, 1597, 1601,
    1607, 1609, 1613, 1619, 1621, 1627, 1637, 1657, 1663, 1667, 1669, 1693,
    1697, 1699, 1709, 1721, 1723, 1733, 1741, 1747, 1753, 1759, 1777, 1783,
    1787, 1789, 1801, 1811, 1823, 1831, 1847, 1861, 1867, 1871, 1873, 1877,
    1879, 1889, 1901, 1907, 1913, 1931, 1933, 1949, 1951, 1973, 1979, 1987,
    1993, 1997, 1999,
];

/// Finds the first probable prime of exactly `bits` bits at or after the
/// number held in the first `bits / 8` bytes of `seed`.
///
/// The seed is read big-endian with its top and bottom bits forced on. The
/// search walks forward in steps of two, skipping candidates with a factor
/// in [`SMALL_PRIMES`] or with `candidate - 1` divisible by 65537, and runs
/// [`is_probably_prime`](crate::is_probably_prime) with the table-selected
/// round count on the rest. The result depends only on `seed`; the quality
/// of that material is the caller's concern.
///
/// # Errors
///
/// - [`Error::InvalidParam`] if `bits` is below [`MIN_PRIME_BITS`] or not a
///   multiple of 8, or `seed` is shorter than `bits / 8` bytes.
/// - [`Error::PrimeSearchExhausted`] if the walk passes [`MAX_STEP`] or runs
///   past `bits` bits.
/// - [`Error::Cancelled`] if `progress` breaks.
///
/// # Example
///
/// ```
/// use cosm_rsa::{generate_prime, NoProgress};
///
/// let seed = [0x5Au8; 32];
/// let p = generate_prime(256, &seed, &mut NoProgress).unwrap();
/// assert_eq!(p.bits(), 256);
/// assert!(p.is_odd());
/// ```
pub fn generate_prime<P>(bits: u32, seed: &[u8], progress: &mut P) -> Result<BigNum>
where
    P: Progress + ?Sized,
{
    let len = (bits / 8) as usize;
    if bits < MIN_PRIME_BITS || bits % 8 != 0 || seed.len() < len {
        return Err(Error::InvalidParam);
    }

    let mut p = BigNum::load(&seed[..len], bits)?;
    p.set_bit(bits - 1, true)?;
    p.set_bit(0, true)?;

    let mut residues = Zeroizing::new([0u32; SMALL_PRIMES.len()]);
    for (r, &sp) in residues.iter_mut().zip(SMALL_PRIMES.iter()) {
        *r = p.rem_u32(sp);
    }
    // track candidate - 1 against the public exponent
    residues[0] = (residues[0] + SMALL_PRIMES[0] - 1) % SMALL_PRIMES[0];

    let mut add: u32 = 0;
    let mut base: u32 = 0;
    loop {
        if let ControlFlow::Break(()) = progress.report(ProgressEvent::Sieve { step: add / 2 }) {
            return Err(Error::Cancelled);
        }

        while !sieve_passes(&residues[..], add) {
            add += 2;
            if add > MAX_STEP {
                debug!(bits, "prime search passed the step bound");
                return Err(Error::PrimeSearchExhausted);
            }
        }

        p += BigNum::from(add - base);
        base = add;
        add += 2;

        if p.bits() != bits {
            debug!(bits, "prime search overflowed the requested size");
            return Err(Error::PrimeSearchExhausted);
        }

        trace!(bits, step = base / 2, "testing sieved candidate");
        if rabin_miller(&p, 0, progress)? {
            debug!(bits, step = base / 2, "prime found");
            // a break here comes after the work is done
            #[allow(unused_must_use)]
            progress.report(ProgressEvent::PrimeFound);
            return Ok(p);
        }
    }
}

/// Whether `candidate + add` escapes every sieve modulus.
fn sieve_passes(residues: &[u32], add: u32) -> bool {
    residues
        .iter()
        .zip(SMALL_PRIMES.iter())
        .all(|(&r, &sp)| (r + add) % sp != 0)
}
