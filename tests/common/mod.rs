//! Shared test capabilities: a SHA-256 based extendable-output hasher and an
//! Ed25519 signer that can verify.

#![allow(dead_code)]

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use qubic_protocol::crypto::{Crypto, Hasher, Signer};
use sha2::{Digest, Sha256};

/// SHA-256 in counter mode: block `i` is `sha256(input || i_le)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Xof;

impl Hasher for Sha256Xof {
    fn hash_into(&self, input: &[u8], output: &mut [u8]) {
        for (counter, block) in output.chunks_mut(32).enumerate() {
            let mut hasher = Sha256::new();
            hasher.update(input);
            hasher.update((counter as u32).to_le_bytes());
            let digest = hasher.finalize();
            block.copy_from_slice(&digest[..block.len()]);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519;

impl Signer for Ed25519 {
    fn derive_public_key(&self, private_key: &[u8; 32]) -> [u8; 32] {
        SigningKey::from_bytes(private_key).verifying_key().to_bytes()
    }

    fn sign(&self, private_key: &[u8; 32], _public_key: &[u8; 32], digest: &[u8; 32]) -> [u8; 64] {
        SigningKey::from_bytes(private_key).sign(digest).to_bytes()
    }

    fn verify(&self, public_key: &[u8; 32], digest: &[u8; 32], signature: &[u8; 64]) -> Option<bool> {
        let key = VerifyingKey::from_bytes(public_key).ok()?;
        let signature = ed25519_dalek::Signature::from_bytes(signature);
        Some(key.verify(digest, &signature).is_ok())
    }
}

pub type TestCrypto = Crypto<Sha256Xof, Ed25519>;

pub fn crypto() -> TestCrypto {
    Crypto::new(Sha256Xof, Ed25519)
}

pub const SEED: &str = "jvhbyzjinlyutyuhsweuxiwootqoevjqwqmdhjeohrytxjxidpbcfyg";
pub const OTHER_SEED: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
