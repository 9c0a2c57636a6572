//! Integration tests for seed, key and identity derivation

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{crypto, Sha256Xof, OTHER_SEED, SEED};
use proptest::prelude::*;
use qubic_protocol::config::{EMPTY_ADDRESS, QUTIL_ADDRESS, QX_ADDRESS};
use qubic_protocol::crypto::keys::{self, identity, identity_to_bytes, verify_identity};
use qubic_protocol::error::ProtocolError;
use qubic_protocol::types::PublicKey;

#[test]
fn test_identity_shape() {
    let keys = crypto().key_pair(SEED, 0).unwrap();
    let id = keys.identity();
    assert_eq!(id.len(), 60);
    assert!(id.bytes().all(|b| b.is_ascii_uppercase()));
    assert!(verify_identity(&Sha256Xof, id).unwrap());
}

#[test]
fn test_seed_derivation_is_deterministic() {
    let crypto = crypto();
    let first = crypto.key_pair(SEED, 0).unwrap();
    let second = crypto.key_pair(SEED, 0).unwrap();
    assert_eq!(first.identity(), second.identity());
    assert_eq!(first.public_key(), second.public_key());
    assert_eq!(
        first.private_key().as_bytes(),
        second.private_key().as_bytes()
    );

    let other = crypto.key_pair(OTHER_SEED, 0).unwrap();
    assert_ne!(first.identity(), other.identity());
}

#[test]
fn test_indices_produce_distinct_keys() {
    let crypto = crypto();
    let mut identities: Vec<String> = (0..64)
        .map(|index| crypto.key_pair(SEED, index).unwrap().identity().to_string())
        .collect();
    identities.sort();
    identities.dedup();
    assert_eq!(identities.len(), 64);
}

#[test]
fn test_invalid_seeds_rejected() {
    let crypto = crypto();
    for seed in [
        "",
        &SEED[..54],
        format!("{SEED}a").as_str(),
        SEED.to_uppercase().as_str(),
        format!("{}1", &SEED[..54]).as_str(),
    ] {
        assert!(matches!(
            crypto.key_pair(seed, 0),
            Err(ProtocolError::InvalidSeed(_))
        ));
    }
}

#[test]
fn test_checksum_detects_single_letter_change() {
    let id = crypto().key_pair(SEED, 0).unwrap().identity().to_string();
    let mut bytes = id.into_bytes();
    bytes[59] = if bytes[59] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();
    assert!(!verify_identity(&Sha256Xof, &tampered).unwrap());
}

#[test]
fn test_malformed_identities() {
    let id = crypto().key_pair(SEED, 0).unwrap().identity().to_string();
    for bad in [
        &id[..59],
        id.to_lowercase().as_str(),
        format!("{}1", &id[..59]).as_str(),
    ] {
        assert!(matches!(
            verify_identity(&Sha256Xof, bad),
            Err(ProtocolError::InvalidFormat(_))
        ));
        assert!(identity_to_bytes(bad).is_err());
    }
}

#[test]
fn test_well_known_addresses() {
    assert_eq!(identity_to_bytes(EMPTY_ADDRESS).unwrap(), [0u8; 32]);
    assert_eq!(PublicKey::from_identity(QX_ADDRESS).unwrap(), PublicKey::contract(1));
    assert_eq!(
        PublicKey::from_identity(QUTIL_ADDRESS).unwrap(),
        PublicKey::contract(4)
    );
}

#[test]
fn test_lowercase_identity_matches_uppercase() {
    let public_key = *crypto().key_pair(SEED, 0).unwrap().public_key();
    let upper = identity(&Sha256Xof, public_key.as_bytes(), false);
    let lower = identity(&Sha256Xof, public_key.as_bytes(), true);
    assert_eq!(upper.to_lowercase(), lower);
    assert_eq!(
        keys::human_readable_bytes(&Sha256Xof, public_key.as_bytes()),
        lower
    );
}

proptest! {
    #[test]
    fn prop_identity_decodes_to_key(key in any::<[u8; 32]>()) {
        let id = identity(&Sha256Xof, &key, false);
        prop_assert_eq!(id.len(), 60);
        prop_assert_eq!(identity_to_bytes(&id).unwrap(), key);
        prop_assert!(verify_identity(&Sha256Xof, &id).unwrap());
    }

    #[test]
    fn prop_checksum_catches_any_letter_change(
        key in any::<[u8; 32]>(),
        position in 56usize..60,
        letter in b'A'..=b'Z',
    ) {
        let id = identity(&Sha256Xof, &key, false);
        let mut bytes = id.clone().into_bytes();
        prop_assume!(bytes[position] != letter);
        bytes[position] = letter;
        let tampered = String::from_utf8(bytes).unwrap();
        prop_assert!(!verify_identity(&Sha256Xof, &tampered).unwrap());
    }

    #[test]
    fn prop_seeds_validate_by_charset(seed in "[a-z]{55}") {
        prop_assert!(keys::seed_to_bytes(&seed).is_ok());
    }
}
