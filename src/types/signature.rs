use crate::config::SIGNATURE_LENGTH;
use crate::core::wire::{read_array, WireDecode, WireEncode};
use bytes::{BufMut, BytesMut};

/// 64-byte signature appended to signed packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; SIGNATURE_LENGTH])
    }
}

impl Signature {
    pub const fn new(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }
}

impl From<[u8; SIGNATURE_LENGTH]> for Signature {
    fn from(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl WireEncode for Signature {
    fn wire_size(&self) -> usize {
        SIGNATURE_LENGTH
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }
}

impl WireDecode for Signature {
    const NAME: &'static str = "Signature";
    const WIRE_SIZE: usize = SIGNATURE_LENGTH;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self(read_array(buf))
    }
}
