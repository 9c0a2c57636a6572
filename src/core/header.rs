//! Request/response header carried in front of every package.
//!
//! ```text
//! [size: u24 LE] [type: u8] [dejaVu: u32 LE]
//! ```
//!
//! `size` counts the whole package including these 8 bytes.

use crate::config::{HEADER_SIZE, MAX_PACKAGE_SIZE};
use crate::core::wire::{WireDecode, WireEncode};
use crate::error::{ProtocolError, Result};
use crate::protocol::package_type::PackageType;
use bytes::{Buf, BufMut, BytesMut};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestResponseHeader {
    size: u32,
    package_type: u8,
    dejavu: u32,
}

impl Default for RequestResponseHeader {
    fn default() -> Self {
        Self {
            size: HEADER_SIZE as u32,
            package_type: 0,
            dejavu: 0,
        }
    }
}

impl RequestResponseHeader {
    /// Header for a package of `package_type` carrying `payload_size` bytes.
    pub fn new(package_type: impl Into<u8>, payload_size: usize) -> Result<Self> {
        let mut header = Self {
            package_type: package_type.into(),
            ..Self::default()
        };
        header.set_size(HEADER_SIZE + payload_size)?;
        Ok(header)
    }

    /// Set the total package size (header included).
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        if size > MAX_PACKAGE_SIZE {
            return Err(ProtocolError::capacity("package size", MAX_PACKAGE_SIZE, size));
        }
        self.size = size as u32;
        Ok(())
    }

    /// Total package size in bytes, header included.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Payload length implied by the declared size.
    pub fn payload_size(&self) -> usize {
        self.size().saturating_sub(HEADER_SIZE)
    }

    pub fn raw_type(&self) -> u8 {
        self.package_type
    }

    pub fn package_type(&self) -> PackageType {
        PackageType::from(self.package_type)
    }

    pub fn set_type(&mut self, package_type: impl Into<u8>) -> &mut Self {
        self.package_type = package_type.into();
        self
    }

    pub fn dejavu(&self) -> u32 {
        self.dejavu
    }

    pub fn set_dejavu(&mut self, dejavu: u32) -> &mut Self {
        self.dejavu = dejavu;
        self
    }

    /// Builder-style variant of [`set_dejavu`](Self::set_dejavu).
    pub fn with_dejavu(mut self, dejavu: u32) -> Self {
        self.dejavu = dejavu;
        self
    }

    /// Assign a fresh random correlation id in `0..i32::MAX`.
    pub fn randomize_dejavu(&mut self) -> &mut Self {
        self.dejavu = rand::rng().random_range(0..i32::MAX as u32);
        self
    }

    /// Parse the 8 header bytes from a slice that may be longer.
    pub fn peek(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ProtocolError::invalid_size(
                Self::NAME,
                HEADER_SIZE,
                data.len(),
            ));
        }
        Self::decode(&data[..HEADER_SIZE])
    }
}

impl WireEncode for RequestResponseHeader {
    fn wire_size(&self) -> usize {
        HEADER_SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_uint_le(u64::from(self.size), 3);
        buf.put_u8(self.package_type);
        buf.put_u32_le(self.dejavu);
    }
}

impl WireDecode for RequestResponseHeader {
    const NAME: &'static str = "RequestResponseHeader";
    const WIRE_SIZE: usize = HEADER_SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self {
            size: buf.get_uint_le(3) as u32,
            package_type: buf.get_u8(),
            dejavu: buf.get_u32_le(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = RequestResponseHeader::new(PackageType::RequestEntity, 32)
            .unwrap()
            .with_dejavu(0x0403_0201);
        let bytes = header.to_bytes();
        assert_eq!(bytes, vec![40, 0, 0, 31, 0x01, 0x02, 0x03, 0x04]);

        let decoded = RequestResponseHeader::decode(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.payload_size(), 32);
        assert_eq!(decoded.package_type(), PackageType::RequestEntity);
    }

    #[test]
    fn test_three_byte_size() {
        let header = RequestResponseHeader::new(0u8, MAX_PACKAGE_SIZE - HEADER_SIZE).unwrap();
        let bytes = header.to_bytes();
        assert_eq!(bytes[..3], [0xFF, 0xFF, 0xFF]);
        assert_eq!(RequestResponseHeader::decode(&bytes).unwrap().size(), MAX_PACKAGE_SIZE);
    }

    #[test]
    fn test_oversized_package_rejected() {
        let result = RequestResponseHeader::new(0u8, MAX_PACKAGE_SIZE);
        assert!(matches!(
            result,
            Err(ProtocolError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_randomized_dejavu_is_positive_i32() {
        let mut header = RequestResponseHeader::default();
        for _ in 0..64 {
            header.randomize_dejavu();
            assert!(header.dejavu() < i32::MAX as u32);
        }
    }

    #[test]
    fn test_peek_requires_eight_bytes() {
        assert!(RequestResponseHeader::peek(&[8, 0, 0, 27, 0, 0, 0]).is_err());
        let header = RequestResponseHeader::peek(&[8, 0, 0, 27, 0, 0, 0, 0, 0xAA]).unwrap();
        assert_eq!(header.size(), 8);
        assert_eq!(header.package_type(), PackageType::RequestCurrentTickInfo);
    }
}
