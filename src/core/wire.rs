//! # Wire Encoding
//!
//! Fixed-layout encode/decode contract shared by every wire entity.
//!
//! Encoding appends exactly [`WireEncode::wire_size`] bytes. Decoding a
//! fixed-size entity requires the input to be exactly
//! [`WireDecode::WIRE_SIZE`] bytes; any mismatch fails fast with
//! [`ProtocolError::InvalidSize`] naming the entity. All integers are
//! little-endian.

use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, BytesMut};

/// An entity with a byte-exact wire representation.
pub trait WireEncode {
    /// Number of bytes [`encode_to`](Self::encode_to) appends.
    fn wire_size(&self) -> usize;

    /// Append the wire representation to `buf`.
    fn encode_to(&self, buf: &mut BytesMut);

    /// Encode into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode_to(&mut buf);
        debug_assert_eq!(buf.len(), self.wire_size());
        buf.to_vec()
    }
}

/// Raw bytes encode as themselves.
impl WireEncode for [u8] {
    fn wire_size(&self) -> usize {
        self.len()
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }
}

/// A fixed-size entity that can be parsed from its exact wire bytes.
pub trait WireDecode: Sized {
    /// Entity name used in error messages.
    const NAME: &'static str;

    /// Exact wire size in bytes.
    const WIRE_SIZE: usize;

    /// Parse from a cursor already known to hold `WIRE_SIZE` bytes.
    fn decode_from(buf: &mut &[u8]) -> Self;

    /// Parse from exactly `WIRE_SIZE` bytes.
    fn decode(data: &[u8]) -> Result<Self> {
        ensure_size(Self::NAME, Self::WIRE_SIZE, data.len())?;
        let mut cursor = data;
        let value = Self::decode_from(&mut cursor);
        debug_assert!(cursor.is_empty());
        Ok(value)
    }
}

/// Fail with `InvalidSize` unless `actual == expected`.
#[inline]
pub fn ensure_size(entity: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual != expected {
        return Err(ProtocolError::invalid_size(entity, expected, actual));
    }
    Ok(())
}

/// Read a fixed-size byte array from the cursor.
#[inline]
pub(crate) fn read_array<const N: usize>(buf: &mut &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair {
        a: u16,
        b: i64,
    }

    impl WireEncode for Pair {
        fn wire_size(&self) -> usize {
            10
        }

        fn encode_to(&self, buf: &mut BytesMut) {
            buf.put_u16_le(self.a);
            buf.put_i64_le(self.b);
        }
    }

    impl WireDecode for Pair {
        const NAME: &'static str = "Pair";
        const WIRE_SIZE: usize = 10;

        fn decode_from(buf: &mut &[u8]) -> Self {
            Pair {
                a: buf.get_u16_le(),
                b: buf.get_i64_le(),
            }
        }
    }

    #[test]
    fn test_little_endian_layout() {
        let bytes = Pair { a: 0x0102, b: -2 }.to_bytes();
        assert_eq!(bytes[..2], [0x02, 0x01]);
        assert_eq!(bytes[2..], (-2i64).to_le_bytes());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = Pair::decode(&[0u8; 11]).unwrap_err();
        match err {
            ProtocolError::InvalidSize {
                entity,
                expected,
                actual,
            } => {
                assert_eq!(entity, "Pair");
                assert_eq!(expected, 10);
                assert_eq!(actual, 11);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(Pair::decode(&[0u8; 9]).is_err());
    }
}
