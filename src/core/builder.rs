//! # Package Builder
//!
//! Assembles outbound byte buffers field by field and signs them.
//!
//! Signing derives the index-0 key pair for a seed, hashes the unsigned
//! bytes to a 32-byte digest, signs the digest and appends the 64-byte
//! signature. [`PackageBuilder::sign_and_digest`] additionally returns the
//! digest of the signed bytes, which is what transaction ids are made of.

use crate::config::DIGEST_LENGTH;
use crate::core::header::RequestResponseHeader;
use crate::core::wire::WireEncode;
use crate::crypto::{Crypto, Hasher, KeyPair, Signer};
use crate::error::Result;
use crate::protocol::package_type::PackageType;
use crate::types::entity::EntityRequest;
use crate::types::public_key::PublicKey;
use crate::types::signature::Signature;
use crate::types::transaction::Transaction;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

/// Byte buffer assembled in protocol field order.
#[derive(Debug, Default, Clone)]
pub struct PackageBuilder {
    buf: BytesMut,
}

/// A signed buffer with its signature and the digest of the signed bytes.
#[derive(Debug, Clone)]
pub struct SignedPackage {
    pub data: Bytes,
    pub digest: [u8; DIGEST_LENGTH],
    pub signature: Signature,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a wire entity.
    pub fn add<T: WireEncode + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.encode_to(&mut self.buf);
        self
    }

    pub fn add_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    pub fn add_u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    pub fn add_u16(&mut self, value: u16) -> &mut Self {
        self.buf.put_u16_le(value);
        self
    }

    pub fn add_i16(&mut self, value: i16) -> &mut Self {
        self.buf.put_i16_le(value);
        self
    }

    pub fn add_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32_le(value);
        self
    }

    pub fn add_i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32_le(value);
        self
    }

    pub fn add_u64(&mut self, value: u64) -> &mut Self {
        self.buf.put_u64_le(value);
        self
    }

    pub fn add_i64(&mut self, value: i64) -> &mut Self {
        self.buf.put_i64_le(value);
        self
    }

    /// Append `count` zero bytes.
    pub fn pad(&mut self, count: usize) -> &mut Self {
        self.buf.put_bytes(0, count);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Sign with the index-0 keys of `seed` and return the signed bytes.
    pub fn sign<H: Hasher, S: Signer>(self, crypto: &Crypto<H, S>, seed: &str) -> Result<Bytes> {
        Ok(self.sign_and_digest(crypto, seed)?.data)
    }

    /// Sign with the index-0 keys of `seed`, also returning the digest of
    /// the signed bytes.
    pub fn sign_and_digest<H: Hasher, S: Signer>(
        self,
        crypto: &Crypto<H, S>,
        seed: &str,
    ) -> Result<SignedPackage> {
        let keys = crypto.key_pair(seed, 0)?;
        Ok(self.sign_with(crypto, &keys))
    }

    /// Sign with already derived keys.
    pub fn sign_with<H: Hasher, S: Signer>(
        mut self,
        crypto: &Crypto<H, S>,
        keys: &KeyPair,
    ) -> SignedPackage {
        let signature = crypto.sign(keys, &self.buf);
        self.add(&signature);
        let data = self.buf.freeze();
        let digest = crypto.digest(&data);
        trace!(size = data.len(), "Signed package");
        SignedPackage {
            data,
            digest,
            signature,
        }
    }
}

/// Header + payload package with a random dejaVu.
pub fn request_package<P: WireEncode + ?Sized>(
    package_type: PackageType,
    payload: &P,
) -> Result<Bytes> {
    let mut header = RequestResponseHeader::new(package_type, payload.wire_size())?;
    header.randomize_dejavu();
    let mut builder = PackageBuilder::with_capacity(header.size());
    builder.add(&header).add(payload);
    Ok(builder.into_bytes())
}

/// Header-only `RequestCurrentTickInfo` package.
pub fn tick_info_request() -> Result<Bytes> {
    request_package(PackageType::RequestCurrentTickInfo, &[0u8; 0][..])
}

/// `RequestEntity` package asking for the balance of `public_key`.
pub fn entity_request(public_key: &PublicKey) -> Result<Bytes> {
    request_package(
        PackageType::RequestEntity,
        &EntityRequest {
            public_key: *public_key,
        },
    )
}

/// `BroadcastTransaction` package for a built transaction. Broadcasts carry
/// a zero dejaVu so peers relay them.
pub fn broadcast_transaction(transaction: &Transaction) -> Result<Bytes> {
    let data = transaction.package_data()?;
    let header = RequestResponseHeader::new(PackageType::BroadcastTransaction, data.len())?;
    let mut builder = PackageBuilder::with_capacity(header.size());
    builder.add(&header).add_raw(data);
    Ok(builder.into_bytes())
}
