//! Rabin-Miller probabilistic primality testing.

use core::ops::ControlFlow;

use tracing::trace;
use zeroize::Zeroizing;

use crate::bignum::BigNum;
use crate::errors::{Error, Result};
use crate::prng::Prng;
use crate::progress::{Progress, ProgressEvent};

/// Requests below this many rounds use [`rounds_for_bits`].
pub const MIN_EXPLICIT_ROUNDS: u32 = 5;

/// Number of Rabin-Miller rounds for a candidate of `bits` bits.
///
/// Smaller numbers get more rounds.
pub fn rounds_for_bits(bits: u32) -> u32 {
    match bits {
        512.. => 5,
        450..=511 => 6,
        400..=449 => 7,
        350..=399 => 8,
        300..=349 => 9,
        250..=299 => 12,
        200..=249 => 15,
        150..=199 => 18,
        _ => 27,
    }
}

/// Reports whether `p` is probably prime.
///
/// Even, negative and values below 3 are rejected outright. A `rounds`
/// value below [`MIN_EXPLICIT_ROUNDS`] (including 0) selects the round count
/// from [`rounds_for_bits`]. The witnesses come from a [`Prng`] salted with
/// `p` itself, so the answer for a given `p` never changes.
///
/// `progress` sees [`ProgressEvent::RabinMiller`] before every round; if it
/// breaks, testing stops and `false` is returned.
pub fn is_probably_prime<P>(p: &BigNum, rounds: u32, progress: &mut P) -> bool
where
    P: Progress + ?Sized,
{
    rabin_miller(p, rounds, progress).unwrap_or(false)
}

/// [`is_probably_prime`] that tells cancellation apart from "composite".
pub(crate) fn rabin_miller<P>(p: &BigNum, rounds: u32, progress: &mut P) -> Result<bool>
where
    P: Progress + ?Sized,
{
    if p.is_negative() || p.is_even() || p.is_one() {
        return Ok(false);
    }

    let bits = p.bits();
    let rounds = if rounds < MIN_EXPLICIT_ROUNDS {
        rounds_for_bits(bits)
    } else {
        rounds
    };

    // p - 1 = 2^b * m with m odd
    let mut p1 = p.clone();
    p1.set_bit(0, false)?;
    let mut m = p1.clone();
    let mut b = 0u32;
    while m.is_even() {
        m.shift_right_one();
        b += 1;
    }

    let mut prng = Prng::with_salt(&Zeroizing::new(p.to_le_word_bytes()));
    let mut witness = Zeroizing::new(vec![0u8; bits.div_ceil(8) as usize]);

    for round in 0..rounds {
        if let ControlFlow::Break(()) = progress.report(ProgressEvent::RabinMiller { round }) {
            return Err(Error::Cancelled);
        }

        prng.fill(&mut witness);
        clamp_witness(&mut witness, bits);
        let a = Zeroizing::new(BigNum::from_bytes_be(&witness));

        let mut z = a.mod_exp(&m, p);
        if z.is_one() {
            continue;
        }

        let mut j = 0;
        while j < b {
            if j > 0 {
                z = (&z * &z).modulo(p);
            }
            if z == p1 {
                break;
            }
            j += 1;
        }
        if j == b {
            trace!(bits, round, "rabin-miller witness found");
            return Ok(false);
        }
    }

    Ok(true)
}

/// Forces a witness of `bits` bits below `2^(bits-1)` with bit `bits-2` set.
fn clamp_witness(bytes: &mut [u8], bits: u32) {
    let total = bytes.len() as u32 * 8;
    for pos in bits - 1..total {
        let (i, mask) = bit_position(bytes.len(), pos);
        bytes[i] &= !mask;
    }
    if bits >= 2 {
        let (i, mask) = bit_position(bytes.len(), bits - 2);
        bytes[i] |= mask;
    }
}

fn bit_position(len: usize, pos: u32) -> (usize, u8) {
    (len - 1 - (pos / 8) as usize, 1 << (pos % 8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    const PRIMES: &[&str] = &[
        "2305843009213693951",
        "618970019642690137449562111",
        "162259276829213363391578010288127",
        "170141183460469231731687303715884105727",
        "203956878356401977405765866929034577280193993314348263094772646453283062722701277632936616063144088173312372882677123879538709400158306567338328279154499698366071906766440037074217117805690872792848149112022286332144876183376326512083574821647933992961249917319836219304274280243803104015000563790123",
        // ECC primes: https://tools.ietf.org/html/draft-ladd-safecurves-02
        "3618502788666131106986593281521497120414687020801267626233049500247285301239",
        "57896044618658097711785492504343953926634992332820282019728792003956564819949",
        "9850501549098619803069760025035903451269934817616361666987073351061430442874302652853566563721228910201656997576599",
        "42307582002575910332922579714097346549017899709713998034217522897561970639123926132812109468141778230245837569601494931472367",
        "6864797660130609714981900799081393217269435300143305409394463459185543183397656052122559640661454554977296311391480858037121987999716643812574028291115057151",
    ];

    const COMPOSITES: &[&str] = &[
        "21284175091214687912771199898307297748211672914763848041968395774954376176754",
        "6084766654921918907427900243509372380954290099172559290432744450051395395951",
        "84594350493221918389213352992032324280367711247940675652888030554255915464401",
        "82793403787388584738507275144194252681",
        // Arnault, "Rabin-Miller Primality Test: Composite Numbers Which Pass It"
        "1195068768795265792518361315725116351898245581",
        // Carmichael numbers
        "561",
        "1105",
        "1729",
        "2465",
        "8911",
        "3825123056546413051",
    ];

    /// The first 50 primes above 2^30.
    const PRIMES_ABOVE_2_30: [u64; 50] = [
        1073741827, 1073741831, 1073741833, 1073741839, 1073741843, 1073741857, 1073741891,
        1073741909, 1073741939, 1073741953, 1073741969, 1073741971, 1073741987, 1073741993,
        1073742037, 1073742053, 1073742073, 1073742077, 1073742091, 1073742113, 1073742169,
        1073742203, 1073742209, 1073742223, 1073742233, 1073742259, 1073742277, 1073742289,
        1073742343, 1073742353, 1073742361, 1073742391, 1073742403, 1073742463, 1073742493,
        1073742517, 1073742583, 1073742623, 1073742653, 1073742667, 1073742671, 1073742673,
        1073742707, 1073742713, 1073742721, 1073742731, 1073742767, 1073742773, 1073742811,
        1073742851,
    ];

    fn parse(s: &str) -> BigNum {
        s.parse().unwrap()
    }

    #[test]
    fn round_table() {
        assert_eq!(rounds_for_bits(2048), 5);
        assert_eq!(rounds_for_bits(512), 5);
        assert_eq!(rounds_for_bits(511), 6);
        assert_eq!(rounds_for_bits(450), 6);
        assert_eq!(rounds_for_bits(449), 7);
        assert_eq!(rounds_for_bits(350), 8);
        assert_eq!(rounds_for_bits(300), 9);
        assert_eq!(rounds_for_bits(299), 12);
        assert_eq!(rounds_for_bits(200), 15);
        assert_eq!(rounds_for_bits(150), 18);
        assert_eq!(rounds_for_bits(149), 27);
        assert_eq!(rounds_for_bits(0), 27);
    }

    #[test]
    fn known_primes() {
        for s in PRIMES {
            assert!(is_probably_prime(&parse(s), 0, &mut NoProgress), "{s}");
        }
    }

    #[test]
    fn known_composites() {
        for s in COMPOSITES {
            assert!(!is_probably_prime(&parse(s), 0, &mut NoProgress), "{s}");
        }
    }

    #[test]
    fn primes_above_2_30() {
        for &p in &PRIMES_ABOVE_2_30 {
            assert!(is_probably_prime(&BigNum::from(p), 0, &mut NoProgress), "{p}");
        }
    }

    #[test]
    fn products_of_primes_above_2_30() {
        let mut tested = 0;
        'outer: for (i, &a) in PRIMES_ABOVE_2_30.iter().enumerate() {
            for &b in &PRIMES_ABOVE_2_30[i..] {
                if tested == 1000 {
                    break 'outer;
                }
                let n = BigNum::from(a) * BigNum::from(b);
                assert!(!is_probably_prime(&n, 0, &mut NoProgress), "{a} * {b}");
                tested += 1;
            }
        }
        assert_eq!(tested, 1000);
    }

    #[test]
    fn trivial_inputs() {
        for v in [-7i64, -1, 0, 1, 2, 4, 100] {
            assert!(!is_probably_prime(&BigNum::from(v), 0, &mut NoProgress), "{v}");
        }
        for v in [3i64, 5, 7, 11, 13, 65537] {
            assert!(is_probably_prime(&BigNum::from(v), 0, &mut NoProgress), "{v}");
        }
    }

    #[test]
    fn explicit_round_count_and_progress() {
        let p = parse("2305843009213693951");
        let mut rounds = Vec::new();
        let mut observer = |e: ProgressEvent| {
            if let ProgressEvent::RabinMiller { round } = e {
                rounds.push(round);
            }
            ControlFlow::Continue(())
        };
        assert!(is_probably_prime(&p, 7, &mut observer));
        assert_eq!(rounds, (0..7).collect::<Vec<_>>());

        rounds.clear();
        let mut observer = |e: ProgressEvent| {
            if let ProgressEvent::RabinMiller { round } = e {
                rounds.push(round);
            }
            ControlFlow::Continue(())
        };
        assert!(is_probably_prime(&p, 0, &mut observer));
        assert_eq!(rounds.len(), 27);
    }

    #[test]
    fn cancellation() {
        let p = parse("2305843009213693951");
        let mut stop = |_: ProgressEvent| ControlFlow::Break(());
        assert_eq!(rabin_miller(&p, 0, &mut stop), Err(Error::Cancelled));
        assert!(!is_probably_prime(&p, 0, &mut stop));
    }

    #[test]
    fn witness_clamping() {
        let mut w = [0xFFu8; 2];
        clamp_witness(&mut w, 16);
        assert_eq!(w, [0x7F, 0xFF]);

        let mut w = [0x00u8; 2];
        clamp_witness(&mut w, 16);
        assert_eq!(w, [0x40, 0x00]);

        let mut w = [0xFFu8; 2];
        clamp_witness(&mut w, 9);
        assert_eq!(w, [0x00, 0xFF]);

        let mut w = [0x00u8; 1];
        clamp_witness(&mut w, 2);
        assert_eq!(w, [0x01]);
    }
}
