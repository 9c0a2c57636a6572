use super::AssetName;
use crate::config::{QX_ADDRESS, QX_TRANSFER_ASSET_FEE, QX_TRANSFER_ASSET_INPUT_TYPE};
use crate::core::wire::{read_array, WireDecode, WireEncode};
use crate::error::Result;
use crate::types::public_key::PublicKey;
use crate::types::transaction::Transaction;
use bytes::{Buf, BufMut, BytesMut};

/// QX asset ownership transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTransferPayload {
    pub issuer: PublicKey,
    pub new_owner_and_possessor: PublicKey,
    pub asset_name: AssetName,
    pub number_of_units: i64,
}

impl AssetTransferPayload {
    pub const SIZE: usize = 32 + 32 + 8 + 8;

    /// Transaction to the QX contract paying the transfer fee.
    pub fn into_transaction(self, tick: u32) -> Result<Transaction> {
        Transaction::new()
            .with_destination_identity(QX_ADDRESS)?
            .with_amount(QX_TRANSFER_ASSET_FEE)
            .with_tick(tick)
            .with_input_type(QX_TRANSFER_ASSET_INPUT_TYPE)
            .with_input(&self)
    }
}

impl WireEncode for AssetTransferPayload {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        self.issuer.encode_to(buf);
        self.new_owner_and_possessor.encode_to(buf);
        buf.put_slice(self.asset_name.as_bytes());
        buf.put_i64_le(self.number_of_units);
    }
}

impl WireDecode for AssetTransferPayload {
    const NAME: &'static str = "AssetTransferPayload";
    const WIRE_SIZE: usize = Self::SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self {
            issuer: PublicKey::decode_from(buf),
            new_owner_and_possessor: PublicKey::decode_from(buf),
            asset_name: AssetName::from_bytes(read_array(buf)),
            number_of_units: buf.get_i64_le(),
        }
    }
}
