use crate::config::MAX_TRANSACTION_SIZE;
use crate::core::wire::WireEncode;
use crate::error::{ProtocolError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Opaque transaction input, bounded by a maximum size and set at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicPayload {
    data: Bytes,
    max_size: usize,
    filled: bool,
}

impl Default for DynamicPayload {
    fn default() -> Self {
        Self::new(MAX_TRANSACTION_SIZE)
    }
}

impl DynamicPayload {
    /// Payload bounded by `max_size`, never more than `MAX_TRANSACTION_SIZE`.
    pub fn new(max_size: usize) -> Self {
        Self {
            data: Bytes::new(),
            max_size: max_size.min(MAX_TRANSACTION_SIZE),
            filled: false,
        }
    }

    /// Payload holding the encoding of `value`.
    pub fn from_encoded<T: WireEncode + ?Sized>(value: &T) -> Result<Self> {
        let mut payload = Self::default();
        payload.set_payload(value.to_bytes())?;
        Ok(payload)
    }

    pub fn set_payload(&mut self, data: impl Into<Bytes>) -> Result<()> {
        if self.filled {
            return Err(ProtocolError::PayloadAlreadySet);
        }
        let data = data.into();
        if data.len() > self.max_size {
            return Err(ProtocolError::capacity(
                "transaction payload",
                self.max_size,
                data.len(),
            ));
        }
        self.data = data;
        self.filled = true;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl WireEncode for DynamicPayload {
    fn wire_size(&self) -> usize {
        self.data.len()
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.data);
    }
}
