//! Seed, key and identity derivation.
//!
//! ```text
//! seed (55 × a-z) ──odometer(index)──► preimage ──hash──► private key (32)
//! private key ──signer──► public key (32) ──base-26──► identity (56 + 4 checksum letters)
//! ```
//!
//! These are pure functions over the injected [`Hasher`] and [`Signer`]
//! capabilities; [`Crypto`](super::Crypto) bundles them for convenience.

use super::{Hasher, Signer};
use crate::config::{
    CHECKSUM_LENGTH, IDENTITY_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SEED_LENGTH,
};
use crate::error::{constants, ProtocolError, Result};
use crate::types::public_key::PublicKey;
use std::borrow::Cow;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of letters in the seed and identity alphabets.
const ALPHABET_LEN: u8 = 26;

/// Letters encoding one 8-byte group of the public key.
const LETTERS_PER_GROUP: usize = 14;

/// Letters encoding the 18-bit checksum.
const CHECKSUM_LETTERS: usize = 4;

const CHECKSUM_MASK: u32 = 0x3FFFF;

/// A 32-byte private key. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; PRIVATE_KEY_LENGTH]);

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; PRIVATE_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Public key with its 3-byte checksum appended. Only used transiently;
/// package bodies carry the bare 32-byte key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksummedPublicKey([u8; PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH]);

impl ChecksummedPublicKey {
    pub fn public_key(&self) -> PublicKey {
        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key.copy_from_slice(&self.0[..PUBLIC_KEY_LENGTH]);
        PublicKey::new(key)
    }

    pub fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
        let mut checksum = [0u8; CHECKSUM_LENGTH];
        checksum.copy_from_slice(&self.0[PUBLIC_KEY_LENGTH..]);
        checksum
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH] {
        &self.0
    }
}

/// Map a 55-letter lowercase seed to letter indices (0–25).
///
/// Errors name the offending length or position only.
pub fn seed_to_bytes(seed: &str) -> Result<[u8; SEED_LENGTH]> {
    let bytes = seed.as_bytes();
    if bytes.len() != SEED_LENGTH {
        return Err(ProtocolError::InvalidSeed(Cow::Owned(format!(
            "expected {SEED_LENGTH} characters, got {}",
            seed.chars().count()
        ))));
    }

    let mut out = [0u8; SEED_LENGTH];
    for (position, (slot, byte)) in out.iter_mut().zip(bytes).enumerate() {
        if !byte.is_ascii_lowercase() {
            return Err(ProtocolError::InvalidSeed(Cow::Owned(format!(
                "character at position {position} is outside a-z"
            ))));
        }
        *slot = byte - b'a';
    }
    Ok(out)
}

/// Advance the preimage odometer by one step.
///
/// A digit that exceeds 26 (not 25) wraps to 1 and carries. Deployed
/// identities depend on this exact threshold.
fn advance_preimage(preimage: &mut [u8]) {
    for digit in preimage.iter_mut() {
        *digit += 1;
        if *digit > ALPHABET_LEN {
            *digit = 1;
        } else {
            break;
        }
    }
}

/// Derive the private key at `index` for `seed`. Index 0 is the canonical key.
pub fn private_key<H: Hasher + ?Sized>(hasher: &H, seed: &str, index: u32) -> Result<PrivateKey> {
    let mut preimage = seed_to_bytes(seed)?;
    for _ in 0..index {
        advance_preimage(&mut preimage);
    }

    let mut key = [0u8; PRIVATE_KEY_LENGTH];
    hasher.hash_into(&preimage, &mut key);
    preimage.zeroize();

    let private_key = PrivateKey(key);
    key.zeroize();
    Ok(private_key)
}

/// First 3 bytes of `hash(public_key, 32)`.
pub fn checksum<H: Hasher + ?Sized>(
    hasher: &H,
    public_key: &[u8; PUBLIC_KEY_LENGTH],
) -> [u8; CHECKSUM_LENGTH] {
    let digest = hasher.digest(public_key);
    [digest[0], digest[1], digest[2]]
}

/// Derive the checksummed public key for a private key.
pub fn public_key<H, S>(signer: &S, hasher: &H, private_key: &PrivateKey) -> ChecksummedPublicKey
where
    H: Hasher + ?Sized,
    S: Signer + ?Sized,
{
    let key = signer.derive_public_key(private_key.as_bytes());
    let mut out = [0u8; PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH];
    out[..PUBLIC_KEY_LENGTH].copy_from_slice(&key);
    out[PUBLIC_KEY_LENGTH..].copy_from_slice(&checksum(hasher, &key));
    ChecksummedPublicKey(out)
}

/// Encode a public key as a 60-letter identity.
pub fn identity<H: Hasher + ?Sized>(
    hasher: &H,
    public_key: &[u8; PUBLIC_KEY_LENGTH],
    lowercase: bool,
) -> String {
    let base = if lowercase { b'a' } else { b'A' };
    let mut id = String::with_capacity(IDENTITY_LENGTH);

    for chunk in public_key.chunks_exact(8) {
        let mut group = [0u8; 8];
        group.copy_from_slice(chunk);
        let mut value = u64::from_le_bytes(group);
        for _ in 0..LETTERS_PER_GROUP {
            id.push(char::from(base + (value % u64::from(ALPHABET_LEN)) as u8));
            value /= u64::from(ALPHABET_LEN);
        }
    }

    let [b0, b1, b2] = checksum(hasher, public_key);
    let mut value =
        ((u32::from(b2) << 16) | (u32::from(b1) << 8) | u32::from(b0)) & CHECKSUM_MASK;
    for _ in 0..CHECKSUM_LETTERS {
        id.push(char::from(base + (value % u32::from(ALPHABET_LEN)) as u8));
        value /= u32::from(ALPHABET_LEN);
    }

    id
}

/// Lowercase identity form of arbitrary 32 bytes, used for transaction ids.
pub fn human_readable_bytes<H: Hasher + ?Sized>(hasher: &H, bytes: &[u8; 32]) -> String {
    identity(hasher, bytes, true)
}

fn ensure_identity_format(identity: &str) -> Result<()> {
    let bytes = identity.as_bytes();
    if bytes.len() != IDENTITY_LENGTH || !bytes.iter().all(u8::is_ascii_uppercase) {
        return Err(ProtocolError::InvalidFormat(Cow::Borrowed(
            constants::ERR_IDENTITY_FORMAT,
        )));
    }
    Ok(())
}

/// Decode the 56-letter key portion of an identity back to public key bytes.
///
/// The checksum letters are not decoded; [`verify_identity`] recomputes them.
pub fn identity_to_bytes(identity: &str) -> Result<[u8; PUBLIC_KEY_LENGTH]> {
    ensure_identity_format(identity)?;
    let letters = identity.as_bytes();

    let mut out = [0u8; PUBLIC_KEY_LENGTH];
    for (group, slot) in out.chunks_exact_mut(8).enumerate() {
        let start = group * LETTERS_PER_GROUP;
        let value = letters[start..start + LETTERS_PER_GROUP]
            .iter()
            .rev()
            .fold(0u64, |acc, letter| {
                acc.wrapping_mul(u64::from(ALPHABET_LEN))
                    .wrapping_add(u64::from(letter - b'A'))
            });
        slot.copy_from_slice(&value.to_le_bytes());
    }
    Ok(out)
}

/// Check that an identity is self-consistent: decoding it and encoding the
/// result again must reproduce the same 60 letters, checksum included.
pub fn verify_identity<H: Hasher + ?Sized>(hasher: &H, identity_str: &str) -> Result<bool> {
    let key = identity_to_bytes(identity_str)?;
    Ok(identity(hasher, &key, false) == identity_str)
}
