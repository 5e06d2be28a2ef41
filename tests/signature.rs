//! End-to-end signing and verification with a 1024-bit key pair.

use std::sync::OnceLock;

use cosm_rsa::{
    decode, encode_with_clock, generate, verify, Error, FixedClock, Hash32, KeyGenParams,
    NoProgress, PrivateKey, PublicKey, Shared, SigType, Signature, Timestamp,
};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

const CREATE: Timestamp = Timestamp::from_secs(800_000_000);

fn params(id: u64) -> KeyGenParams {
    let expire = CREATE.checked_add_days(365).unwrap();
    KeyGenParams::new(1024, id, "test", CREATE, expire).unwrap()
}

fn keygen(id: u64, seed: u64) -> (PublicKey, PrivateKey) {
    let params = params(id);
    let mut bytes = vec![0u8; params.seed_len()];
    ChaCha8Rng::seed_from_u64(seed).fill_bytes(&mut bytes);
    generate(&params, &bytes, &mut NoProgress).unwrap()
}

fn pair() -> &'static (PublicKey, PrivateKey) {
    static PAIR: OnceLock<(PublicKey, PrivateKey)> = OnceLock::new();
    PAIR.get_or_init(|| keygen(0x1, 1))
}

fn now() -> FixedClock {
    FixedClock(CREATE.checked_add_secs(3_600).unwrap())
}

#[test]
fn every_signing_type_round_trips() {
    let (public_key, private_key) = pair();
    let clock = now();
    let hash = Hash32::sha256(b"The quick brown fox");

    for sig_type in SigType::ALL.into_iter().filter(|t| t.needs_private_key()) {
        for shared in [Shared::No, Shared::Yes] {
            let sig = encode_with_clock(&hash, clock.0, sig_type, shared, private_key, &clock)
                .unwrap();
            assert_eq!(sig.bits(), 1024);
            assert_eq!(sig.id(), 0x1);

            let decoded = decode(&sig, public_key).unwrap();
            assert_eq!(decoded.hash, hash);
            assert_eq!(decoded.timestamp, clock.0);
            assert_eq!(decoded.sig_type, sig_type);
            assert_eq!(decoded.shared, shared);
        }
    }
}

#[test]
fn messages_go_to_the_private_key() {
    let (public_key, private_key) = pair();
    let clock = now();
    let hash = Hash32::sha256(b"for your eyes only");

    let sig =
        encode_with_clock(&hash, clock.0, SigType::Message, Shared::No, public_key, &clock).unwrap();
    let decoded = decode(&sig, private_key).unwrap();
    assert_eq!(decoded.hash, hash);
    assert_eq!(decoded.sig_type, SigType::Message);
    assert_eq!(decode(&sig, public_key), Err(Error::KeyTypeMismatch));
}

#[test]
fn signing_is_deterministic() {
    let (_, private_key) = pair();
    let clock = now();
    let hash = Hash32::sha256(b"same input");
    let sign = || {
        encode_with_clock(&hash, clock.0, SigType::Sign, Shared::Yes, private_key, &clock).unwrap()
    };
    assert_eq!(sign(), sign());
}

#[test]
fn other_key_rejects_signature() {
    let (_, private_key) = pair();
    let (other_public, _) = keygen(0x2, 2);
    let clock = now();
    let hash = Hash32::sha256(b"signed by key 1");
    let sig =
        encode_with_clock(&hash, clock.0, SigType::Sign, Shared::Yes, private_key, &clock).unwrap();
    assert_eq!(decode(&sig, &other_public), Err(Error::Format));
}

#[test]
fn signature_survives_serialization() {
    let (public_key, private_key) = pair();
    let clock = now();
    let hash = Hash32::sha256(b"on the wire");
    let sig = encode_with_clock(&hash, clock.0, SigType::Timestamp, Shared::Yes, private_key, &clock)
        .unwrap();

    let bytes = sig.to_bytes().unwrap();
    assert_eq!(bytes.len(), sig.encoded_len());
    let (back, used) = Signature::from_bytes(&bytes).unwrap();
    assert_eq!(used, bytes.len());
    assert_eq!(back, sig);
    assert_eq!(verify(&back, public_key, &hash).map(|d| d.sig_type), Ok(SigType::Timestamp));
}

#[test]
fn tampering_is_detected() {
    let (public_key, private_key) = pair();
    let clock = now();
    let hash = Hash32::sha256(b"do not touch");
    let sig =
        encode_with_clock(&hash, clock.0, SigType::Strong, Shared::No, private_key, &clock).unwrap();

    let mut bytes = sig.to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let tampered = Signature::try_from(&bytes[..]).unwrap();
    match verify(&tampered, public_key, &hash) {
        Err(Error::Format) | Err(Error::Verification) => {}
        other => panic!("tampered signature accepted: {other:?}"),
    }

    assert_eq!(
        verify(&sig, public_key, &Hash32::sha256(b"something else")),
        Err(Error::Verification)
    );
}

#[test]
fn expired_key_does_not_sign() {
    let (_, private_key) = pair();
    let late = FixedClock(CREATE.checked_add_days(366).unwrap());
    let hash = Hash32::sha256(b"too late");
    assert_eq!(
        encode_with_clock(&hash, late.0, SigType::Sign, Shared::No, private_key, &late),
        Err(Error::Expired)
    );
}
