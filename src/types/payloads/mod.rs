//! Contract input payloads carried inside transactions.

pub mod asset_transfer;
pub mod ipo;
pub mod qx_order;
pub mod send_many;

use crate::error::{ProtocolError, Result};
use std::fmt;

pub use asset_transfer::AssetTransferPayload;
pub use ipo::ContractIpoBid;
pub use qx_order::{QxOrderAction, QxOrderPayload};
pub use send_many::{SendManyPayload, SendManyTransfer};

const ASSET_NAME_LENGTH: usize = 8;

/// Asset name, zero-padded to 8 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AssetName([u8; ASSET_NAME_LENGTH]);

impl AssetName {
    pub fn new(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > ASSET_NAME_LENGTH {
            return Err(ProtocolError::capacity(
                "asset name",
                ASSET_NAME_LENGTH,
                bytes.len(),
            ));
        }
        let mut out = [0u8; ASSET_NAME_LENGTH];
        out[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn from_bytes(bytes: [u8; ASSET_NAME_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ASSET_NAME_LENGTH] {
        &self.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(ASSET_NAME_LENGTH);
        f.write_str(&String::from_utf8_lossy(&self.0[..end]))
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetName({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_name_padding() {
        let name = AssetName::new("QX").unwrap();
        assert_eq!(name.as_bytes(), b"QX\0\0\0\0\0\0");
        assert_eq!(name.to_string(), "QX");
        assert!(AssetName::new("TOOLONGNAME").is_err());
    }
}
