//! Raw RSA operations over [`BigNum`].

use zeroize::Zeroizing;

use crate::bignum::BigNum;
use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// ⚠️ Raw RSA public operation: `m ^ e mod n`. No padding is performed.
///
/// `e` follows the key version (65537, or 17 for version 0 keys).
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_public<K: PublicKeyParts + ?Sized>(key: &K, m: &BigNum) -> Result<BigNum> {
    check_input(key, m)?;
    Ok(m.mod_exp(&BigNum::from(key.e()), key.n()))
}

/// ⚠️ Raw RSA private operation. No padding is performed.
///
/// Version 0 keys exponentiate with `d` directly, since their stored CRT
/// values cannot be trusted. Later versions use the CRT parameters.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_private<K: PrivateKeyParts + ?Sized>(key: &K, c: &BigNum) -> Result<BigNum> {
    check_input(key, c)?;
    if key.version() == 0 {
        Ok(private_direct(key, c))
    } else {
        Ok(private_crt(key, c))
    }
}

/// Inputs must lie in `[0, n)` for a non-trivial modulus.
fn check_input<K: PublicKeyParts + ?Sized>(key: &K, m: &BigNum) -> Result<()> {
    let n = key.n();
    if n.is_zero() || n.is_one() || n.is_negative() {
        return Err(Error::InvalidParam);
    }
    if m.is_negative() || m >= n {
        return Err(Error::Format);
    }
    Ok(())
}

/// `c ^ d mod n`.
pub(crate) fn private_direct<K: PrivateKeyParts + ?Sized>(key: &K, c: &BigNum) -> BigNum {
    c.mod_exp(key.d(), key.n())
}

/// Garner recombination over `p` and `q`.
pub(crate) fn private_crt<K: PrivateKeyParts + ?Sized>(key: &K, c: &BigNum) -> BigNum {
    let p = key.p();
    let q = key.q();

    let cp = Zeroizing::new(c.modulo(p));
    let cq = Zeroizing::new(c.modulo(q));
    let mut m1 = Zeroizing::new(cp.mod_exp(key.dmp1(), p));
    let m2 = Zeroizing::new(cq.mod_exp(key.dmq1(), q));

    *m1 -= &*m2;
    while m1.is_negative() {
        *m1 += p;
    }
    let hq = Zeroizing::new(&*m1 * key.iqmp());
    let h = Zeroizing::new(hq.modulo(p));
    let hq = Zeroizing::new(&*h * q);

    &*hq + &*m2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyHeader, PrivateKey, PublicKey, MIN_KEY_BITS};
    use crate::time::Timestamp;

    // p = 61, q = 53: the textbook key, stretched to a legal header size.
    fn toy_key(version: u16) -> PrivateKey {
        let header = KeyHeader::new(
            version,
            MIN_KEY_BITS,
            1,
            Timestamp::from_secs(0),
            Timestamp::from_secs(1),
            "",
        )
        .unwrap();
        PrivateKey::from_components(
            header,
            BigNum::from(3233u32),
            BigNum::from(2753u32),
            BigNum::from(61u32),
            BigNum::from(53u32),
            BigNum::from(53u32),
            BigNum::from(49u32),
            BigNum::from(38u32),
        )
        .unwrap()
    }

    #[test]
    fn textbook_vector() {
        // 65537 == 17 mod phi(3233), so both versions share d
        for version in [0, 1] {
            let key = toy_key(version);
            let m = BigNum::from(65u32);
            let c = rsa_public(&key, &m).unwrap();
            assert_eq!(c, BigNum::from(2790u32));
            assert_eq!(rsa_private(&key, &c).unwrap(), m);
        }
    }

    #[test]
    fn crt_matches_direct() {
        let key = toy_key(1);
        for v in [0u32, 1, 2, 100, 1234, 3232] {
            let c = BigNum::from(v);
            assert_eq!(private_crt(&key, &c), private_direct(&key, &c), "{v}");
        }
    }

    #[test]
    fn legacy_ignores_crt_values() {
        let mut key = toy_key(0);
        key.iqmp = BigNum::from(2u32);
        let m = BigNum::from(42u32);
        let c = rsa_public(&key, &m).unwrap();
        assert_eq!(rsa_private(&key, &c).unwrap(), m);
    }

    #[test]
    fn out_of_range_input() {
        let key = toy_key(1);
        let public_key = PublicKey::from(&key);
        assert_eq!(rsa_public(&public_key, &BigNum::from(3233u32)), Err(Error::Format));
        assert_eq!(rsa_private(&key, &BigNum::from(-1)), Err(Error::Format));
    }
}
