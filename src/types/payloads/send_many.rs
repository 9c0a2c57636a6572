//! QUtil send-many payload: up to 25 transfers in one transaction.
//!
//! ```text
//! 25 × destination (32) | 25 × amount i64
//! ```
//!
//! Unused slots and transfers with a non-positive amount encode as the
//! empty address with amount 0.

use crate::config::{QUTIL_ADDRESS, QUTIL_SENDMANY_FEE, QUTIL_SENDMANY_INPUT_TYPE};
use crate::core::wire::{read_array, WireDecode, WireEncode};
use crate::error::{ProtocolError, Result};
use crate::types::public_key::PublicKey;
use crate::types::transaction::Transaction;
use bytes::{BufMut, BytesMut};

pub const MAX_SEND_MANY_TRANSFERS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendManyTransfer {
    pub destination: PublicKey,
    pub amount: i64,
}

impl SendManyTransfer {
    pub fn new(destination: PublicKey, amount: i64) -> Self {
        Self {
            destination,
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendManyPayload {
    transfers: Vec<SendManyTransfer>,
}

impl SendManyPayload {
    pub const SIZE: usize = MAX_SEND_MANY_TRANSFERS * (32 + 8);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transfer(&mut self, transfer: SendManyTransfer) -> Result<&mut Self> {
        self.ensure_room(1)?;
        self.transfers.push(transfer);
        Ok(self)
    }

    /// Add several transfers. Nothing is added if they do not all fit.
    pub fn add_transfers<I>(&mut self, transfers: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = SendManyTransfer>,
    {
        let transfers: Vec<_> = transfers.into_iter().collect();
        self.ensure_room(transfers.len())?;
        self.transfers.extend(transfers);
        Ok(self)
    }

    fn ensure_room(&self, additional: usize) -> Result<()> {
        let wanted = self.transfers.len() + additional;
        if wanted > MAX_SEND_MANY_TRANSFERS {
            return Err(ProtocolError::capacity(
                "send-many transfers",
                MAX_SEND_MANY_TRANSFERS,
                wanted,
            ));
        }
        Ok(())
    }

    pub fn transfers(&self) -> &[SendManyTransfer] {
        &self.transfers
    }

    /// Sum of all transfer amounts.
    pub fn total_amount(&self) -> i64 {
        self.transfers
            .iter()
            .fold(0i64, |total, t| total.saturating_add(t.amount))
    }

    /// Transaction to the QUtil contract carrying this payload. The amount
    /// covers the transfers plus the contract fee.
    pub fn into_transaction(self, tick: u32) -> Result<Transaction> {
        let amount = self.total_amount().saturating_add(QUTIL_SENDMANY_FEE);
        Transaction::new()
            .with_destination_identity(QUTIL_ADDRESS)?
            .with_amount(amount)
            .with_tick(tick)
            .with_input_type(QUTIL_SENDMANY_INPUT_TYPE)
            .with_input(&self)
    }

    fn slot(&self, index: usize) -> Option<&SendManyTransfer> {
        self.transfers.get(index).filter(|t| t.amount > 0)
    }
}

impl WireEncode for SendManyPayload {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        for index in 0..MAX_SEND_MANY_TRANSFERS {
            let destination = self
                .slot(index)
                .map_or(PublicKey::EMPTY, |t| t.destination);
            destination.encode_to(buf);
        }
        for index in 0..MAX_SEND_MANY_TRANSFERS {
            buf.put_i64_le(self.slot(index).map_or(0, |t| t.amount));
        }
    }
}

impl WireDecode for SendManyPayload {
    const NAME: &'static str = "SendManyPayload";
    const WIRE_SIZE: usize = Self::SIZE;

    /// Recovers the transfers with a positive amount.
    fn decode_from(buf: &mut &[u8]) -> Self {
        let destinations: Vec<PublicKey> = (0..MAX_SEND_MANY_TRANSFERS)
            .map(|_| PublicKey::new(read_array(buf)))
            .collect();
        let transfers = destinations
            .into_iter()
            .map(|destination| SendManyTransfer {
                destination,
                amount: i64::from_le_bytes(read_array(buf)),
            })
            .filter(|t| t.amount > 0)
            .collect();
        Self { transfers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(n: u8, amount: i64) -> SendManyTransfer {
        SendManyTransfer::new(PublicKey::new([n; 32]), amount)
    }

    #[test]
    fn test_empty_payload_is_all_zero() {
        let bytes = SendManyPayload::new().to_bytes();
        assert_eq!(bytes.len(), 1000);
        assert!(bytes.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_capacity() {
        let mut payload = SendManyPayload::new();
        for n in 0..25 {
            payload.add_transfer(transfer(n, 1)).unwrap();
        }
        let err = payload.add_transfer(transfer(25, 1)).unwrap_err();
        assert!(matches!(err, ProtocolError::CapacityExceeded { max: 25, actual: 26, .. }));
        assert_eq!(payload.transfers().len(), 25);
    }

    #[test]
    fn test_bulk_add_is_all_or_nothing() {
        let mut payload = SendManyPayload::new();
        payload.add_transfers((0..20).map(|n| transfer(n, 1))).unwrap();
        assert!(payload.add_transfers((0..6).map(|n| transfer(n, 1))).is_err());
        assert_eq!(payload.transfers().len(), 20);
    }

    #[test]
    fn test_non_positive_amounts_encode_empty() {
        let mut payload = SendManyPayload::new();
        payload
            .add_transfer(transfer(7, 500))
            .unwrap()
            .add_transfer(transfer(8, 0))
            .unwrap()
            .add_transfer(transfer(9, -4))
            .unwrap();
        let bytes = payload.to_bytes();
        assert_eq!(bytes[..32], [7u8; 32]);
        assert!(bytes[32..96].iter().all(|b| *b == 0));
        assert_eq!(bytes[800..808], 500i64.to_le_bytes());
        assert!(bytes[808..].iter().all(|b| *b == 0));

        let parsed = SendManyPayload::decode(&bytes).unwrap();
        assert_eq!(parsed.transfers(), &[transfer(7, 500)]);
        assert_eq!(payload.total_amount(), 496);
    }

    #[test]
    fn test_into_transaction() {
        let mut payload = SendManyPayload::new();
        payload.add_transfer(transfer(1, 100)).unwrap();
        let tx = payload.into_transaction(42).unwrap();
        assert_eq!(tx.amount(), 110);
        assert_eq!(tx.input_type(), QUTIL_SENDMANY_INPUT_TYPE);
        assert_eq!(tx.input_size(), 1000);
        assert_eq!(tx.package_size(), 1144);
        assert_eq!(tx.destination(), &PublicKey::contract(4));
    }
}
