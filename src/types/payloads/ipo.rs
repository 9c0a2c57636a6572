use crate::config::CONTRACT_IPO_BID_INPUT_TYPE;
use crate::core::wire::{WireDecode, WireEncode};
use crate::error::Result;
use crate::types::public_key::PublicKey;
use crate::types::transaction::Transaction;
use bytes::{Buf, BufMut, BytesMut};

const PADDING: usize = 6;

/// Bid in a contract IPO: `price` per share for `quantity` shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractIpoBid {
    pub price: i64,
    pub quantity: i16,
}

impl ContractIpoBid {
    pub const SIZE: usize = 8 + 2 + PADDING;

    /// Zero-amount transaction addressed to the contract at `contract_index`.
    pub fn into_transaction(self, contract_index: u8, tick: u32) -> Result<Transaction> {
        Transaction::new()
            .with_destination(PublicKey::contract(contract_index))
            .with_amount(0)
            .with_tick(tick)
            .with_input_type(CONTRACT_IPO_BID_INPUT_TYPE)
            .with_input(&self)
    }
}

impl WireEncode for ContractIpoBid {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_i64_le(self.price);
        buf.put_i16_le(self.quantity);
        buf.put_bytes(0, PADDING);
    }
}

impl WireDecode for ContractIpoBid {
    const NAME: &'static str = "ContractIpoBid";
    const WIRE_SIZE: usize = Self::SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        let bid = Self {
            price: buf.get_i64_le(),
            quantity: buf.get_i16_le(),
        };
        buf.advance(PADDING);
        bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::tests::{test_crypto, TEST_SEED};

    #[test]
    fn test_ipo_transaction_is_160_bytes() {
        let bid = ContractIpoBid {
            price: 250_000,
            quantity: 12,
        };
        let mut tx = bid.into_transaction(7, 1_000).unwrap();
        let data = tx.build(&test_crypto(), TEST_SEED).unwrap();
        assert_eq!(data.len(), 160);
        assert_eq!(data[32], 7);
        assert!(data[33..64].iter().all(|b| *b == 0));
        assert_eq!(data[76..80], [1, 0, 16, 0]);
        assert_eq!(data[80..88], 250_000i64.to_le_bytes());
        assert_eq!(data[88..90], 12i16.to_le_bytes());
        assert!(data[90..96].iter().all(|b| *b == 0));
    }
}
