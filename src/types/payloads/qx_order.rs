use super::AssetName;
use crate::config::{
    QX_ADDRESS, QX_ADD_ASK_ORDER, QX_ADD_BID_ORDER, QX_REMOVE_ASK_ORDER, QX_REMOVE_BID_ORDER,
};
use crate::core::wire::{read_array, WireDecode, WireEncode};
use crate::error::Result;
use crate::types::public_key::PublicKey;
use crate::types::transaction::Transaction;
use bytes::{Buf, BufMut, BytesMut};

/// Order book operation, selecting the QX input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QxOrderAction {
    AddAsk,
    AddBid,
    RemoveAsk,
    RemoveBid,
}

impl QxOrderAction {
    pub fn input_type(self) -> u16 {
        match self {
            QxOrderAction::AddAsk => QX_ADD_ASK_ORDER,
            QxOrderAction::AddBid => QX_ADD_BID_ORDER,
            QxOrderAction::RemoveAsk => QX_REMOVE_ASK_ORDER,
            QxOrderAction::RemoveBid => QX_REMOVE_BID_ORDER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QxOrderPayload {
    pub issuer: PublicKey,
    pub asset_name: AssetName,
    pub price: i64,
    pub number_of_shares: i64,
}

impl QxOrderPayload {
    pub const SIZE: usize = 32 + 8 + 8 + 8;

    /// `price × shares`, saturating.
    pub fn total_amount(&self) -> i64 {
        self.price.saturating_mul(self.number_of_shares)
    }

    /// Transaction to the QX contract. Adding a bid escrows the order total;
    /// every other action is sent with amount 0.
    pub fn into_transaction(self, action: QxOrderAction, tick: u32) -> Result<Transaction> {
        let amount = match action {
            QxOrderAction::AddBid => self.total_amount(),
            _ => 0,
        };
        Transaction::new()
            .with_destination_identity(QX_ADDRESS)?
            .with_amount(amount)
            .with_tick(tick)
            .with_input_type(action.input_type())
            .with_input(&self)
    }
}

impl WireEncode for QxOrderPayload {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        self.issuer.encode_to(buf);
        buf.put_slice(self.asset_name.as_bytes());
        buf.put_i64_le(self.price);
        buf.put_i64_le(self.number_of_shares);
    }
}

impl WireDecode for QxOrderPayload {
    const NAME: &'static str = "QxOrderPayload";
    const WIRE_SIZE: usize = Self::SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self {
            issuer: PublicKey::decode_from(buf),
            asset_name: AssetName::from_bytes(read_array(buf)),
            price: buf.get_i64_le(),
            number_of_shares: buf.get_i64_le(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> QxOrderPayload {
        QxOrderPayload {
            issuer: PublicKey::EMPTY,
            asset_name: AssetName::new("QX").unwrap(),
            price: 1_500,
            number_of_shares: 3,
        }
    }

    #[test]
    fn test_qx_order_layout() {
        let bytes = order().to_bytes();
        assert_eq!(bytes.len(), 56);
        assert_eq!(bytes[40..48], 1_500i64.to_le_bytes());
        assert_eq!(QxOrderPayload::decode(&bytes).unwrap(), order());
        assert_eq!(order().total_amount(), 4_500);
    }

    #[test]
    fn test_only_bids_escrow_amount() {
        let bid = order().into_transaction(QxOrderAction::AddBid, 1).unwrap();
        assert_eq!(bid.amount(), 4_500);
        assert_eq!(bid.input_type(), 6);

        let ask = order().into_transaction(QxOrderAction::AddAsk, 1).unwrap();
        assert_eq!(ask.amount(), 0);
        assert_eq!(ask.input_type(), 5);
    }
}
