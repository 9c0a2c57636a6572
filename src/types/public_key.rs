//! Bare 32-byte public key as carried in package bodies.

use crate::config::PUBLIC_KEY_LENGTH;
use crate::core::wire::{read_array, WireDecode, WireEncode};
use crate::crypto::keys;
use crate::crypto::Hasher;
use crate::error::Result;
use bytes::{BufMut, BytesMut};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// The all-zero key, encoded as the empty address.
    pub const EMPTY: PublicKey = PublicKey([0u8; PUBLIC_KEY_LENGTH]);

    pub const fn new(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Decode the key portion of a 60-letter identity.
    ///
    /// Only the format is checked here; use
    /// [`verify_identity`](crate::crypto::keys::verify_identity) to validate
    /// the checksum.
    pub fn from_identity(identity: &str) -> Result<Self> {
        keys::identity_to_bytes(identity).map(Self)
    }

    /// Build a key with `index` in the first byte and zeros elsewhere, the
    /// addressing scheme used for contracts.
    pub fn contract(index: u8) -> Self {
        let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
        bytes[0] = index;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; PUBLIC_KEY_LENGTH]
    }

    pub fn identity<H: Hasher + ?Sized>(&self, hasher: &H) -> String {
        keys::identity(hasher, &self.0, false)
    }
}

impl From<[u8; PUBLIC_KEY_LENGTH]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl WireEncode for PublicKey {
    fn wire_size(&self) -> usize {
        PUBLIC_KEY_LENGTH
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }
}

impl WireDecode for PublicKey {
    const NAME: &'static str = "PublicKey";
    const WIRE_SIZE: usize = PUBLIC_KEY_LENGTH;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self(read_array(buf))
    }
}
