//! Tokio codec for package framing over contiguous buffers.
//!
//! The encoder writes already-assembled packages (header + body) after
//! checking that the header's declared size matches. The decoder is the
//! `BytesMut` counterpart of the ring-buffer [`Framer`](super::framer::Framer)
//! and follows the same corruption rules.

use crate::config::{DEFAULT_FRAMER_CAPACITY, HEADER_SIZE};
use crate::core::framer::ReceivedPackage;
use crate::core::header::RequestResponseHeader;
use crate::core::wire::ensure_size;
use crate::error::{constants, ProtocolError, Result};
use bytes::{Bytes, BytesMut};
use std::borrow::Cow;
use tokio_util::codec::{Decoder, Encoder};

#[derive(Debug, Clone)]
pub struct PackageCodec {
    max_package_size: usize,
}

impl Default for PackageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMER_CAPACITY)
    }
}

impl PackageCodec {
    pub fn new(max_package_size: usize) -> Self {
        Self { max_package_size }
    }
}

impl Decoder for PackageCodec {
    type Item = ReceivedPackage;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = RequestResponseHeader::peek(src)?;
        let size = header.size();
        if size < HEADER_SIZE {
            return Err(ProtocolError::ProtocolCorruption(Cow::Borrowed(
                constants::ERR_HEADER_TOO_SMALL,
            )));
        }
        if size > self.max_package_size {
            return Err(ProtocolError::ProtocolCorruption(Cow::Borrowed(
                constants::ERR_HEADER_EXCEEDS_BUFFER,
            )));
        }
        if src.len() < size {
            src.reserve(size - src.len());
            return Ok(None);
        }

        let mut frame = src.split_to(size);
        let payload = frame.split_off(HEADER_SIZE).freeze();
        Ok(Some(ReceivedPackage { header, payload }))
    }
}

impl Encoder<Bytes> for PackageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        let header = RequestResponseHeader::peek(&item)?;
        ensure_size("Package", header.size(), item.len())?;
        dst.extend_from_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{entity_request, tick_info_request};
    use crate::protocol::package_type::PackageType;
    use crate::types::public_key::PublicKey;

    #[test]
    fn test_encode_then_decode_stream() {
        let mut codec = PackageCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(tick_info_request().unwrap(), &mut buf).unwrap();
        codec
            .encode(entity_request(&PublicKey::contract(1)).unwrap(), &mut buf)
            .unwrap();

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first.package_type(), PackageType::RequestCurrentTickInfo);
        assert!(first.payload.is_empty());

        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(second.package_type(), PackageType::RequestEntity);
        assert_eq!(second.payload.len(), 32);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_partial_frame() {
        let mut codec = PackageCodec::default();
        let bytes = entity_request(&PublicKey::EMPTY).unwrap();
        let mut buf = BytesMut::from(&bytes[..20]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&bytes[20..]);
        assert!(codec.decode(&mut buf).unwrap().is_some());
    }

    #[test]
    fn test_encoder_rejects_mismatched_size() {
        let mut codec = PackageCodec::default();
        let mut bytes = entity_request(&PublicKey::EMPTY).unwrap().to_vec();
        bytes.push(0);
        let mut buf = BytesMut::new();
        assert!(matches!(
            codec.encode(Bytes::from(bytes), &mut buf),
            Err(ProtocolError::InvalidSize { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decoder_corruption() {
        let mut codec = PackageCodec::new(64);
        let mut buf = BytesMut::from(&[3u8, 0, 0, 1, 0, 0, 0, 0][..]);
        assert!(codec.decode(&mut buf).is_err());
        let mut buf = BytesMut::from(&[65u8, 0, 0, 1, 0, 0, 0, 0][..]);
        assert!(codec.decode(&mut buf).is_err());
    }
}
