//! # Cryptographic Capabilities
//!
//! The engine never implements its hash function or signature scheme. Both
//! are injected through two small traits:
//!
//! - [`Hasher`]: an extendable-output hash; `hash_into` fills the whole output
//!   slice from the input.
//! - [`Signer`]: derives public keys and signs 32-byte digests.
//!
//! [`Crypto`] bundles one of each and exposes the key derivation pipeline in
//! [`keys`] as methods.
//!
//! ## Example Usage
//! ```rust
//! use qubic_protocol::crypto::{Crypto, Hasher, Signer};
//!
//! struct Copy;
//! impl Hasher for Copy {
//!     fn hash_into(&self, input: &[u8], output: &mut [u8]) {
//!         output.fill(0);
//!         let n = input.len().min(output.len());
//!         output[..n].copy_from_slice(&input[..n]);
//!     }
//! }
//!
//! struct Mirror;
//! impl Signer for Mirror {
//!     fn derive_public_key(&self, private_key: &[u8; 32]) -> [u8; 32] {
//!         *private_key
//!     }
//!     fn sign(&self, _: &[u8; 32], _: &[u8; 32], digest: &[u8; 32]) -> [u8; 64] {
//!         let mut signature = [0u8; 64];
//!         signature[..32].copy_from_slice(digest);
//!         signature
//!     }
//! }
//!
//! let crypto = Crypto::new(Copy, Mirror);
//! let seed = "a".repeat(55);
//! let keys = crypto.key_pair(&seed, 0).unwrap();
//! assert_eq!(keys.identity().len(), 60);
//! ```

pub mod keys;

use crate::config::{DIGEST_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::error::Result;
use crate::types::public_key::PublicKey;
use crate::types::signature::Signature;
use keys::PrivateKey;
use std::fmt;
use std::sync::Arc;

/// Extendable-output hash function.
pub trait Hasher: Send + Sync {
    /// Hash `input`, writing exactly `output.len()` bytes.
    fn hash_into(&self, input: &[u8], output: &mut [u8]);

    /// Hash `input` to `output_len` bytes.
    fn hash(&self, input: &[u8], output_len: usize) -> Vec<u8> {
        let mut out = vec![0u8; output_len];
        self.hash_into(input, &mut out);
        out
    }

    /// 32-byte digest, the size used for signing and checksums.
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LENGTH] {
        let mut out = [0u8; DIGEST_LENGTH];
        self.hash_into(input, &mut out);
        out
    }
}

/// Signature scheme over 32-byte digests.
pub trait Signer: Send + Sync {
    fn derive_public_key(&self, private_key: &[u8; PRIVATE_KEY_LENGTH]) -> [u8; PUBLIC_KEY_LENGTH];

    fn sign(
        &self,
        private_key: &[u8; PRIVATE_KEY_LENGTH],
        public_key: &[u8; PUBLIC_KEY_LENGTH],
        digest: &[u8; DIGEST_LENGTH],
    ) -> [u8; SIGNATURE_LENGTH];

    /// Verify a signature. `None` when the scheme offers no verification.
    fn verify(
        &self,
        _public_key: &[u8; PUBLIC_KEY_LENGTH],
        _digest: &[u8; DIGEST_LENGTH],
        _signature: &[u8; SIGNATURE_LENGTH],
    ) -> Option<bool> {
        None
    }
}

impl<T: Hasher + ?Sized> Hasher for &T {
    fn hash_into(&self, input: &[u8], output: &mut [u8]) {
        (**self).hash_into(input, output)
    }
}

impl<T: Hasher + ?Sized> Hasher for Arc<T> {
    fn hash_into(&self, input: &[u8], output: &mut [u8]) {
        (**self).hash_into(input, output)
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    fn derive_public_key(&self, private_key: &[u8; PRIVATE_KEY_LENGTH]) -> [u8; PUBLIC_KEY_LENGTH] {
        (**self).derive_public_key(private_key)
    }

    fn sign(
        &self,
        private_key: &[u8; PRIVATE_KEY_LENGTH],
        public_key: &[u8; PUBLIC_KEY_LENGTH],
        digest: &[u8; DIGEST_LENGTH],
    ) -> [u8; SIGNATURE_LENGTH] {
        (**self).sign(private_key, public_key, digest)
    }

    fn verify(
        &self,
        public_key: &[u8; PUBLIC_KEY_LENGTH],
        digest: &[u8; DIGEST_LENGTH],
        signature: &[u8; SIGNATURE_LENGTH],
    ) -> Option<bool> {
        (**self).verify(public_key, digest, signature)
    }
}

impl<T: Signer + ?Sized> Signer for Arc<T> {
    fn derive_public_key(&self, private_key: &[u8; PRIVATE_KEY_LENGTH]) -> [u8; PUBLIC_KEY_LENGTH] {
        (**self).derive_public_key(private_key)
    }

    fn sign(
        &self,
        private_key: &[u8; PRIVATE_KEY_LENGTH],
        public_key: &[u8; PUBLIC_KEY_LENGTH],
        digest: &[u8; DIGEST_LENGTH],
    ) -> [u8; SIGNATURE_LENGTH] {
        (**self).sign(private_key, public_key, digest)
    }

    fn verify(
        &self,
        public_key: &[u8; PUBLIC_KEY_LENGTH],
        digest: &[u8; DIGEST_LENGTH],
        signature: &[u8; SIGNATURE_LENGTH],
    ) -> Option<bool> {
        (**self).verify(public_key, digest, signature)
    }
}

/// Keys derived from a seed: private key, public key and identity.
#[derive(Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
    identity: String,
}

impl KeyPair {
    /// Shorthand for [`Crypto::key_pair`].
    pub fn derive<H: Hasher, S: Signer>(crypto: &Crypto<H, S>, seed: &str, index: u32) -> Result<Self> {
        crypto.key_pair(seed, index)
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &self.private_key)
            .field("identity", &self.identity)
            .finish()
    }
}

/// A hasher and signer pair.
#[derive(Debug, Clone, Default)]
pub struct Crypto<H, S> {
    hasher: H,
    signer: S,
}

impl<H: Hasher, S: Signer> Crypto<H, S> {
    pub fn new(hasher: H, signer: S) -> Self {
        Self { hasher, signer }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn private_key(&self, seed: &str, index: u32) -> Result<PrivateKey> {
        keys::private_key(&self.hasher, seed, index)
    }

    pub fn public_key(&self, private_key: &PrivateKey) -> PublicKey {
        keys::public_key(&self.signer, &self.hasher, private_key).public_key()
    }

    /// Derive the full key set at `index` for `seed`.
    pub fn key_pair(&self, seed: &str, index: u32) -> Result<KeyPair> {
        let private_key = self.private_key(seed, index)?;
        let public_key = self.public_key(&private_key);
        let identity = keys::identity(&self.hasher, public_key.as_bytes(), false);
        Ok(KeyPair {
            private_key,
            public_key,
            identity,
        })
    }

    pub fn identity(&self, public_key: &PublicKey, lowercase: bool) -> String {
        keys::identity(&self.hasher, public_key.as_bytes(), lowercase)
    }

    pub fn verify_identity(&self, identity: &str) -> Result<bool> {
        keys::verify_identity(&self.hasher, identity)
    }

    pub fn digest(&self, data: &[u8]) -> [u8; DIGEST_LENGTH] {
        self.hasher.digest(data)
    }

    /// Hash `data` and sign the digest with `keys`.
    pub fn sign(&self, keys: &KeyPair, data: &[u8]) -> Signature {
        let digest = self.hasher.digest(data);
        Signature::new(self.signer.sign(
            keys.private_key.as_bytes(),
            keys.public_key.as_bytes(),
            &digest,
        ))
    }

    /// Verify a signature over `data`. `None` if the signer cannot verify.
    pub fn verify(&self, public_key: &PublicKey, data: &[u8], signature: &Signature) -> Option<bool> {
        let digest = self.hasher.digest(data);
        self.signer
            .verify(public_key.as_bytes(), &digest, signature.as_bytes())
    }
}
