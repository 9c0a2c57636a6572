//! Full tick data record, as broadcast by the tick leader.
//!
//! ```text
//! computor index u16 | epoch u16 | tick u32
//! millisecond u16 | second | minute | hour | day | month | year
//! union (256) | time lock (32)
//! transaction digests (1024 × 32) | contract fees (1024 × i64)
//! signature (64)
//! ```

use super::signature::Signature;
use crate::config::{DIGEST_LENGTH, MAX_NUMBER_OF_CONTRACTS, NUMBER_OF_TRANSACTIONS_PER_TICK};
use crate::core::wire::{read_array, WireDecode, WireEncode};
use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, BytesMut};
use std::borrow::Cow;

const UNION_SIZE: usize = 256;
const TIME_LOCK_SIZE: usize = 32;

/// Longest proposal URI the union region can hold.
pub const MAX_PROPOSAL_URI_LENGTH: usize = UNION_SIZE - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickData {
    pub computor_index: u16,
    pub epoch: u16,
    pub tick: u32,
    pub millisecond: u16,
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
    union_data: [u8; UNION_SIZE],
    pub time_lock: [u8; TIME_LOCK_SIZE],
    transaction_digests: Vec<[u8; DIGEST_LENGTH]>,
    contract_fees: Vec<i64>,
    pub signature: Signature,
}

impl Default for TickData {
    fn default() -> Self {
        Self {
            computor_index: 0,
            epoch: 0,
            tick: 0,
            millisecond: 0,
            second: 0,
            minute: 0,
            hour: 0,
            day: 0,
            month: 0,
            year: 0,
            union_data: [0u8; UNION_SIZE],
            time_lock: [0u8; TIME_LOCK_SIZE],
            transaction_digests: vec![[0u8; DIGEST_LENGTH]; NUMBER_OF_TRANSACTIONS_PER_TICK],
            contract_fees: vec![0; MAX_NUMBER_OF_CONTRACTS],
            signature: Signature::default(),
        }
    }
}

impl TickData {
    pub const SIZE: usize = 2
        + 2
        + 4
        + 2
        + 6
        + UNION_SIZE
        + TIME_LOCK_SIZE
        + NUMBER_OF_TRANSACTIONS_PER_TICK * DIGEST_LENGTH
        + MAX_NUMBER_OF_CONTRACTS * 8
        + 64;

    pub fn union_data(&self) -> &[u8; UNION_SIZE] {
        &self.union_data
    }

    pub fn set_union_data(&mut self, data: [u8; UNION_SIZE]) {
        self.union_data = data;
    }

    /// Length byte of the proposal-URI view of the union region.
    pub fn proposal_uri_size(&self) -> usize {
        usize::from(self.union_data[0])
    }

    /// URI stored in the union region, decoded lossily.
    pub fn proposal_uri(&self) -> Cow<'_, str> {
        let len = self.proposal_uri_size();
        String::from_utf8_lossy(&self.union_data[1..1 + len])
    }

    pub fn set_proposal_uri(&mut self, uri: &str) -> Result<()> {
        let bytes = uri.as_bytes();
        if bytes.len() > MAX_PROPOSAL_URI_LENGTH {
            return Err(ProtocolError::capacity(
                "proposal URI",
                MAX_PROPOSAL_URI_LENGTH,
                bytes.len(),
            ));
        }
        self.union_data = [0u8; UNION_SIZE];
        self.union_data[0] = bytes.len() as u8;
        self.union_data[1..1 + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn transaction_digests(&self) -> &[[u8; DIGEST_LENGTH]] {
        &self.transaction_digests
    }

    /// Digest slot `index`; `None` past the per-tick limit.
    pub fn transaction_digest_mut(&mut self, index: usize) -> Option<&mut [u8; DIGEST_LENGTH]> {
        self.transaction_digests.get_mut(index)
    }

    /// Digests of non-empty slots.
    pub fn included_transactions(&self) -> impl Iterator<Item = &[u8; DIGEST_LENGTH]> {
        self.transaction_digests
            .iter()
            .filter(|digest| digest.iter().any(|b| *b != 0))
    }

    pub fn contract_fees(&self) -> &[i64] {
        &self.contract_fees
    }

    pub fn contract_fee_mut(&mut self, index: usize) -> Option<&mut i64> {
        self.contract_fees.get_mut(index)
    }
}

impl WireEncode for TickData {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.reserve(Self::SIZE);
        buf.put_u16_le(self.computor_index);
        buf.put_u16_le(self.epoch);
        buf.put_u32_le(self.tick);
        buf.put_u16_le(self.millisecond);
        buf.put_u8(self.second);
        buf.put_u8(self.minute);
        buf.put_u8(self.hour);
        buf.put_u8(self.day);
        buf.put_u8(self.month);
        buf.put_u8(self.year);
        buf.put_slice(&self.union_data);
        buf.put_slice(&self.time_lock);
        for digest in &self.transaction_digests {
            buf.put_slice(digest);
        }
        for fee in &self.contract_fees {
            buf.put_i64_le(*fee);
        }
        self.signature.encode_to(buf);
    }
}

impl WireDecode for TickData {
    const NAME: &'static str = "TickData";
    const WIRE_SIZE: usize = Self::SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        let computor_index = buf.get_u16_le();
        let epoch = buf.get_u16_le();
        let tick = buf.get_u32_le();
        let millisecond = buf.get_u16_le();
        let second = buf.get_u8();
        let minute = buf.get_u8();
        let hour = buf.get_u8();
        let day = buf.get_u8();
        let month = buf.get_u8();
        let year = buf.get_u8();
        let union_data = read_array(buf);
        let time_lock = read_array(buf);
        let transaction_digests = (0..NUMBER_OF_TRANSACTIONS_PER_TICK)
            .map(|_| read_array(buf))
            .collect();
        let contract_fees = (0..MAX_NUMBER_OF_CONTRACTS)
            .map(|_| buf.get_i64_le())
            .collect();
        let signature = Signature::decode_from(buf);

        Self {
            computor_index,
            epoch,
            tick,
            millisecond,
            second,
            minute,
            hour,
            day,
            month,
            year,
            union_data,
            time_lock,
            transaction_digests,
            contract_fees,
            signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_data_size() {
        assert_eq!(TickData::SIZE, 41_328);
        assert_eq!(TickData::default().to_bytes().len(), 41_328);
    }

    #[test]
    fn test_encode_matches_decode_layout() {
        let mut data = TickData {
            computor_index: 17,
            epoch: 110,
            tick: 13_000_001,
            millisecond: 999,
            second: 59,
            minute: 30,
            hour: 12,
            day: 16,
            month: 10,
            year: 26,
            signature: Signature::new([0xEE; 64]),
            ..TickData::default()
        };
        data.set_proposal_uri("https://example.org/p/1").unwrap();
        *data.transaction_digest_mut(3).unwrap() = [0x33; 32];
        *data.contract_fee_mut(1023).unwrap() = -5;

        let bytes = data.to_bytes();
        assert_eq!(bytes[0..2], 17u16.to_le_bytes());
        assert_eq!(bytes[16], 23);
        assert_eq!(bytes[304 + 3 * 32], 0x33);
        assert_eq!(bytes[41_328 - 72..41_328 - 64], (-5i64).to_le_bytes());
        assert_eq!(bytes[41_328 - 1], 0xEE);

        let decoded = TickData::decode(&bytes).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(decoded.proposal_uri(), "https://example.org/p/1");
        assert_eq!(decoded.included_transactions().count(), 1);
    }

    #[test]
    fn test_proposal_uri_capacity() {
        let mut data = TickData::default();
        assert!(data.set_proposal_uri(&"x".repeat(255)).is_ok());
        assert_eq!(data.proposal_uri_size(), 255);
        assert!(matches!(
            data.set_proposal_uri(&"x".repeat(256)),
            Err(ProtocolError::CapacityExceeded { .. })
        ));
    }
}
