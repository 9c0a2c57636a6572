//! Wire entities exchanged with peers.

pub mod entity;
pub mod governance;
pub mod payload;
pub mod payloads;
pub mod public_key;
pub mod signature;
pub mod tick_data;
pub mod tick_info;
pub mod transaction;

pub use entity::{Entity, EntityRequest, EntityResponse};
pub use payload::DynamicPayload;
pub use public_key::PublicKey;
pub use signature::Signature;
pub use tick_data::TickData;
pub use tick_info::TickInfo;
pub use transaction::{Transaction, TransactionView};
