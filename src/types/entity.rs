//! Balance records returned by entity (balance) queries.

use super::public_key::PublicKey;
use crate::config::{PUBLIC_KEY_LENGTH, SPECTRUM_DEPTH};
use crate::core::wire::{read_array, WireDecode, WireEncode};
use bytes::{Buf, BufMut, BytesMut};

/// Ledger entry for one public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Entity {
    pub public_key: PublicKey,
    pub incoming_amount: i64,
    pub outgoing_amount: i64,
    pub number_of_incoming_transfers: u32,
    pub number_of_outgoing_transfers: u32,
    pub latest_incoming_transfer_tick: u32,
    pub latest_outgoing_transfer_tick: u32,
}

impl Entity {
    pub const SIZE: usize = PUBLIC_KEY_LENGTH + 8 + 8 + 4 * 4;

    pub fn balance(&self) -> i64 {
        self.incoming_amount.saturating_sub(self.outgoing_amount)
    }
}

impl WireEncode for Entity {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        self.public_key.encode_to(buf);
        buf.put_i64_le(self.incoming_amount);
        buf.put_i64_le(self.outgoing_amount);
        buf.put_u32_le(self.number_of_incoming_transfers);
        buf.put_u32_le(self.number_of_outgoing_transfers);
        buf.put_u32_le(self.latest_incoming_transfer_tick);
        buf.put_u32_le(self.latest_outgoing_transfer_tick);
    }
}

impl WireDecode for Entity {
    const NAME: &'static str = "Entity";
    const WIRE_SIZE: usize = Self::SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self {
            public_key: PublicKey::decode_from(buf),
            incoming_amount: buf.get_i64_le(),
            outgoing_amount: buf.get_i64_le(),
            number_of_incoming_transfers: buf.get_u32_le(),
            number_of_outgoing_transfers: buf.get_u32_le(),
            latest_incoming_transfer_tick: buf.get_u32_le(),
            latest_outgoing_transfer_tick: buf.get_u32_le(),
        }
    }
}

/// Payload of a `RequestEntity` package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRequest {
    pub public_key: PublicKey,
}

impl WireEncode for EntityRequest {
    fn wire_size(&self) -> usize {
        PUBLIC_KEY_LENGTH
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        self.public_key.encode_to(buf);
    }
}

impl WireDecode for EntityRequest {
    const NAME: &'static str = "EntityRequest";
    const WIRE_SIZE: usize = PUBLIC_KEY_LENGTH;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self {
            public_key: PublicKey::decode_from(buf),
        }
    }
}

/// Payload of a `RespondEntity` package: the entity plus its spectrum proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityResponse {
    pub entity: Entity,
    pub tick: u32,
    pub spectrum_index: i32,
    pub siblings: Vec<[u8; 32]>,
}

impl EntityResponse {
    /// Entity, tick and spectrum index.
    const PREFIX_SIZE: usize = Entity::SIZE + 4 + 4;
    pub const SIZE: usize = Self::PREFIX_SIZE + SPECTRUM_DEPTH * 32;

    pub fn balance(&self) -> i64 {
        self.entity.balance()
    }
}

impl WireEncode for EntityResponse {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        self.entity.encode_to(buf);
        buf.put_u32_le(self.tick);
        buf.put_i32_le(self.spectrum_index);
        for sibling in self.siblings.iter().take(SPECTRUM_DEPTH) {
            buf.put_slice(sibling);
        }
        let missing = SPECTRUM_DEPTH.saturating_sub(self.siblings.len());
        buf.put_bytes(0, missing * 32);
    }
}

impl WireDecode for EntityResponse {
    const NAME: &'static str = "EntityResponse";
    const WIRE_SIZE: usize = Self::SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        let entity = Entity::decode_from(buf);
        let tick = buf.get_u32_le();
        let spectrum_index = buf.get_i32_le();
        // The sibling tail is whatever follows the fixed prefix.
        let mut siblings = Vec::with_capacity(buf.remaining() / 32);
        while buf.remaining() >= 32 {
            siblings.push(read_array(buf));
        }
        Self {
            entity,
            tick,
            spectrum_index,
            siblings,
        }
    }
}
