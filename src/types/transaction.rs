//! # Transactions
//!
//! ```text
//! source (32) | destination (32) | amount i64 | tick u32
//! input type u16 | input size u16 | payload (input size) | signature (64)
//! ```
//!
//! A [`Transaction`] is unbuilt until [`Transaction::build`] signs it.
//! Building is one-shot: the signed bytes, digest and id are fixed from then
//! on. Every `with_*` modifier consumes the transaction and returns an
//! unbuilt copy, so changing a field always requires signing again.

use super::payload::DynamicPayload;
use super::public_key::PublicKey;
use super::signature::Signature;
use crate::config::{
    DIGEST_LENGTH, MAX_TRANSACTION_SIZE, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, TRANSACTION_BASE_SIZE,
};
use crate::core::builder::PackageBuilder;
use crate::core::wire::{ensure_size, read_array, WireDecode, WireEncode};
use crate::crypto::{keys, Crypto, Hasher, Signer};
use crate::error::{constants, ProtocolError, Result};
use bytes::{Buf, Bytes};
use tracing::{debug, warn};

/// Offset of the inline input-size field.
const INPUT_SIZE_OFFSET: usize = PUBLIC_KEY_LENGTH * 2 + 8 + 4 + 2;

#[derive(Debug, Clone)]
struct BuiltTransaction {
    data: Bytes,
    digest: [u8; DIGEST_LENGTH],
    signature: Signature,
    id: String,
}

#[derive(Debug, Clone, Default)]
pub struct Transaction {
    source: PublicKey,
    destination: PublicKey,
    amount: i64,
    tick: u32,
    input_type: u16,
    payload: DynamicPayload,
    built: Option<BuiltTransaction>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain transfer of `amount` to `destination`, scheduled for `tick`.
    pub fn transfer(destination: PublicKey, amount: i64, tick: u32) -> Self {
        Self::new()
            .with_destination(destination)
            .with_amount(amount)
            .with_tick(tick)
    }

    /// Set the source key. Left empty, [`build`](Self::build) fills it with
    /// the signing key; otherwise it must match the signing key.
    pub fn with_source(mut self, source: PublicKey) -> Self {
        self.source = source;
        self.built = None;
        self
    }

    pub fn with_destination(mut self, destination: PublicKey) -> Self {
        self.destination = destination;
        self.built = None;
        self
    }

    pub fn with_destination_identity(self, identity: &str) -> Result<Self> {
        Ok(self.with_destination(PublicKey::from_identity(identity)?))
    }

    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self.built = None;
        self
    }

    pub fn with_tick(mut self, tick: u32) -> Self {
        self.tick = tick;
        self.built = None;
        self
    }

    pub fn with_input_type(mut self, input_type: u16) -> Self {
        self.input_type = input_type;
        self.built = None;
        self
    }

    /// Replace the payload. The input size follows the payload length.
    pub fn with_payload(mut self, payload: DynamicPayload) -> Self {
        self.payload = payload;
        self.built = None;
        self
    }

    /// Replace the payload with the encoding of `input`.
    pub fn with_input<T: WireEncode + ?Sized>(self, input: &T) -> Result<Self> {
        Ok(self.with_payload(DynamicPayload::from_encoded(input)?))
    }

    pub fn source(&self) -> &PublicKey {
        &self.source
    }

    pub fn destination(&self) -> &PublicKey {
        &self.destination
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn input_type(&self) -> u16 {
        self.input_type
    }

    /// Saturates at `u16::MAX`; [`build`](Self::build) rejects anything
    /// above `MAX_TRANSACTION_SIZE`.
    pub fn input_size(&self) -> u16 {
        u16::try_from(self.payload.len()).unwrap_or(u16::MAX)
    }

    pub fn payload(&self) -> &DynamicPayload {
        &self.payload
    }

    /// Size of the signed transaction.
    pub fn package_size(&self) -> usize {
        TRANSACTION_BASE_SIZE + self.payload.len()
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Sign the transaction with the index-0 keys of `seed`.
    ///
    /// Fails with `AlreadyBuilt` on a built transaction.
    pub fn build<H: Hasher, S: Signer>(
        &mut self,
        crypto: &Crypto<H, S>,
        seed: &str,
    ) -> Result<Bytes> {
        if self.built.is_some() {
            return Err(ProtocolError::AlreadyBuilt);
        }

        if self.payload.len() > MAX_TRANSACTION_SIZE {
            return Err(ProtocolError::capacity(
                "transaction payload",
                MAX_TRANSACTION_SIZE,
                self.payload.len(),
            ));
        }

        let keys = crypto.key_pair(seed, 0)?;
        if self.source.is_empty() {
            self.source = *keys.public_key();
        } else if self.source != *keys.public_key() {
            warn!(source = ?self.source, "Source key does not belong to the signing seed");
            return Err(ProtocolError::InvalidFormat(
                constants::ERR_SOURCE_MISMATCH.into(),
            ));
        }

        let mut builder = PackageBuilder::with_capacity(self.package_size());
        builder
            .add(&self.source)
            .add(&self.destination)
            .add_i64(self.amount)
            .add_u32(self.tick)
            .add_u16(self.input_type)
            .add_u16(self.input_size())
            .add(&self.payload);
        let signed = builder.sign_with(crypto, &keys);

        let id = keys::human_readable_bytes(crypto.hasher(), &signed.digest);
        debug!(
            id = %id,
            size = signed.data.len(),
            tick = self.tick,
            input_type = self.input_type,
            "Transaction built"
        );

        let data = signed.data.clone();
        self.built = Some(BuiltTransaction {
            data: signed.data,
            digest: signed.digest,
            signature: signed.signature,
            id,
        });
        Ok(data)
    }

    fn built(&self) -> Result<&BuiltTransaction> {
        self.built.as_ref().ok_or(ProtocolError::NotBuilt)
    }

    /// Lowercase identity form of the signed transaction's digest.
    pub fn id(&self) -> Result<&str> {
        Ok(&self.built()?.id)
    }

    pub fn digest(&self) -> Result<&[u8; DIGEST_LENGTH]> {
        Ok(&self.built()?.digest)
    }

    pub fn signature(&self) -> Result<&Signature> {
        Ok(&self.built()?.signature)
    }

    /// Signed wire bytes.
    pub fn package_data(&self) -> Result<&Bytes> {
        Ok(&self.built()?.data)
    }
}

/// A signed transaction parsed from wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionView {
    pub source: PublicKey,
    pub destination: PublicKey,
    pub amount: i64,
    pub tick: u32,
    pub input_type: u16,
    pub payload: Bytes,
    pub signature: Signature,
    data: Bytes,
}

impl TransactionView {
    pub const NAME: &'static str = "Transaction";

    /// Parse a signed transaction. The length must be exactly
    /// `144 + input size` as declared by the inline field.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < TRANSACTION_BASE_SIZE {
            return Err(ProtocolError::invalid_size(
                Self::NAME,
                TRANSACTION_BASE_SIZE,
                data.len(),
            ));
        }
        let input_size = usize::from(u16::from_le_bytes([
            data[INPUT_SIZE_OFFSET],
            data[INPUT_SIZE_OFFSET + 1],
        ]));
        ensure_size(Self::NAME, TRANSACTION_BASE_SIZE + input_size, data.len())?;

        let data = Bytes::copy_from_slice(data);
        let mut cursor = &data[..];
        let source = PublicKey::decode_from(&mut cursor);
        let destination = PublicKey::decode_from(&mut cursor);
        let amount = cursor.get_i64_le();
        let tick = cursor.get_u32_le();
        let input_type = cursor.get_u16_le();
        cursor.advance(2);
        let payload_start = TRANSACTION_BASE_SIZE - SIGNATURE_LENGTH;
        let payload = data.slice(payload_start..payload_start + input_size);
        cursor.advance(input_size);
        let signature = Signature::new(read_array(&mut cursor));

        Ok(Self {
            source,
            destination,
            amount,
            tick,
            input_type,
            payload,
            signature,
            data,
        })
    }

    /// The bytes covered by the signature.
    pub fn signed_prefix(&self) -> &[u8] {
        &self.data[..self.data.len() - SIGNATURE_LENGTH]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Check the signature against the source key. `None` when the signer
    /// cannot verify.
    pub fn verify<H: Hasher, S: Signer>(&self, crypto: &Crypto<H, S>) -> Option<bool> {
        crypto.verify(&self.source, self.signed_prefix(), &self.signature)
    }

    /// Lowercase identity form of the digest of the full signed bytes.
    pub fn id<H: Hasher + ?Sized>(&self, hasher: &H) -> String {
        keys::human_readable_bytes(hasher, &hasher.digest(&self.data))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::crypto::tests::{test_crypto, TEST_SEED};

    #[test]
    fn test_accessors_fail_before_build() {
        let tx = Transaction::transfer(PublicKey::contract(4), 10, 100);
        assert!(matches!(tx.id(), Err(ProtocolError::NotBuilt)));
        assert!(matches!(tx.digest(), Err(ProtocolError::NotBuilt)));
        assert!(matches!(tx.package_data(), Err(ProtocolError::NotBuilt)));
    }

    #[test]
    fn test_build_is_one_shot() {
        let crypto = test_crypto();
        let mut tx = Transaction::transfer(PublicKey::contract(4), 10, 100);
        let data = tx.build(&crypto, TEST_SEED).unwrap();
        assert_eq!(data.len(), 144);
        assert!(matches!(
            tx.build(&crypto, TEST_SEED),
            Err(ProtocolError::AlreadyBuilt)
        ));

        let id = tx.id().unwrap();
        assert_eq!(id.len(), 60);
        assert!(id.bytes().all(|b| b.is_ascii_lowercase()));
    }

    #[test]
    fn test_modifier_resets_build() {
        let crypto = test_crypto();
        let mut tx = Transaction::transfer(PublicKey::contract(4), 10, 100);
        tx.build(&crypto, TEST_SEED).unwrap();
        let mut tx = tx.with_amount(11);
        assert!(!tx.is_built());
        assert!(tx.build(&crypto, TEST_SEED).is_ok());
    }

    #[test]
    fn test_layout_and_view() {
        let crypto = test_crypto();
        let mut payload = DynamicPayload::default();
        payload.set_payload(vec![0xAB; 5]).unwrap();
        let mut tx = Transaction::transfer(PublicKey::contract(9), -3, 0x0102_0304)
            .with_input_type(7)
            .with_payload(payload);
        let data = tx.build(&crypto, TEST_SEED).unwrap();
        assert_eq!(data.len(), 149);
        assert_eq!(data[64..72], (-3i64).to_le_bytes());
        assert_eq!(data[72..76], [4, 3, 2, 1]);
        assert_eq!(data[76..78], [7, 0]);
        assert_eq!(data[78..80], [5, 0]);
        assert_eq!(data[80..85], [0xAB; 5]);

        let view = TransactionView::decode(&data).unwrap();
        assert_eq!(view.source, *tx.source());
        assert_eq!(view.input_type, 7);
        assert_eq!(&view.payload[..], &[0xAB; 5]);
        assert_eq!(view.verify(&crypto), Some(true));
        assert_eq!(view.id(crypto.hasher()), tx.id().unwrap());
    }

    #[test]
    fn test_view_rejects_inconsistent_size() {
        let crypto = test_crypto();
        let mut tx = Transaction::transfer(PublicKey::contract(1), 1, 1);
        let data = tx.build(&crypto, TEST_SEED).unwrap();
        let mut longer = data.to_vec();
        longer.push(0);
        assert!(matches!(
            TransactionView::decode(&longer),
            Err(ProtocolError::InvalidSize { expected: 144, actual: 145, .. })
        ));
        assert!(TransactionView::decode(&data[..100]).is_err());
    }

    #[test]
    fn test_largest_payload_keeps_input_size_consistent() {
        let crypto = test_crypto();
        let mut payload = DynamicPayload::new(70_000);
        assert!(payload.set_payload(vec![1u8; 70_000]).is_err());
        payload.set_payload(vec![1u8; MAX_TRANSACTION_SIZE]).unwrap();

        let mut tx = Transaction::transfer(PublicKey::contract(1), 1, 1).with_payload(payload);
        let data = tx.build(&crypto, TEST_SEED).unwrap();
        assert_eq!(data.len(), TRANSACTION_BASE_SIZE + MAX_TRANSACTION_SIZE);
        assert_eq!(
            data[INPUT_SIZE_OFFSET..INPUT_SIZE_OFFSET + 2],
            (MAX_TRANSACTION_SIZE as u16).to_le_bytes()
        );
        let view = TransactionView::decode(&data).unwrap();
        assert_eq!(view.payload.len(), MAX_TRANSACTION_SIZE);
    }

    #[test]
    fn test_foreign_source_is_rejected() {
        let crypto = test_crypto();
        let mut tx = Transaction::transfer(PublicKey::contract(2), 5, 10)
            .with_source(PublicKey::contract(1));
        assert!(matches!(
            tx.build(&crypto, TEST_SEED),
            Err(ProtocolError::InvalidFormat(_))
        ));
        assert!(!tx.is_built());

        let own = *crypto.key_pair(TEST_SEED, 0).unwrap().public_key();
        let mut tx = tx.with_source(own);
        assert!(tx.build(&crypto, TEST_SEED).is_ok());
        assert_eq!(*tx.source(), own);
    }
}
