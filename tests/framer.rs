//! Stream framing under arbitrary chunking

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use qubic_protocol::core::builder::{entity_request, tick_info_request};
use qubic_protocol::core::codec::PackageCodec;
use qubic_protocol::core::header::RequestResponseHeader;
use qubic_protocol::core::wire::WireEncode;
use qubic_protocol::error::ProtocolError;
use qubic_protocol::types::PublicKey;
use qubic_protocol::Framer;
use bytes::BytesMut;
use tokio_util::codec::Decoder;

fn package(package_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = RequestResponseHeader::new(package_type, payload.len())
        .unwrap()
        .to_bytes();
    bytes.extend_from_slice(payload);
    bytes
}

fn stream_of(payloads: &[Vec<u8>]) -> Vec<u8> {
    payloads
        .iter()
        .enumerate()
        .flat_map(|(i, payload)| package(i as u8, payload))
        .collect()
}

#[test]
fn test_single_byte_chunks() {
    let stream = [
        tick_info_request().unwrap().to_vec(),
        entity_request(&PublicKey::contract(3)).unwrap().to_vec(),
    ]
    .concat();

    let mut framer = Framer::new(64);
    let mut received = Vec::new();
    for byte in &stream {
        framer
            .on_bytes_received(std::slice::from_ref(byte), |p| received.push(p))
            .unwrap();
    }
    assert_eq!(received.len(), 2);
    assert!(received[0].payload.is_empty());
    assert_eq!(received[1].payload(), PublicKey::contract(3).as_bytes());
    assert_eq!([received[0].to_bytes(), received[1].to_bytes()].concat(), stream);
}

#[test]
fn test_long_run_through_small_ring() {
    // far more bytes than the capacity, with packages straddling the end
    let mut framer = Framer::new(100);
    let mut total = 0;
    for round in 0..500u32 {
        let payload = vec![(round % 251) as u8; (round % 60) as usize];
        let bytes = package(1, &payload);
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        assert!(framer.feed(head).unwrap().len() <= 1);
        let packages = framer.feed(tail).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].payload(), &payload[..]);
        total += bytes.len();
    }
    assert!(total > 100 * 100);
    assert_eq!(framer.available(), 0);
}

#[test]
fn test_package_filling_whole_buffer() {
    let mut framer = Framer::new(64);
    let bytes = package(2, &[7; 56]);
    let packages = framer.feed(&bytes).unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(framer.free_space(), 64);
}

#[test]
fn test_corruption_stops_emission() {
    let mut stream = package(1, &[1; 4]);
    stream.extend_from_slice(&[2, 0, 0, 1, 0, 0, 0, 0]);
    stream.extend(package(1, &[2; 4]));

    let mut framer = Framer::new(256);
    let mut received = Vec::new();
    let result = framer.on_bytes_received(&stream, |p| received.push(p));
    assert!(matches!(result, Err(ProtocolError::ProtocolCorruption(_))));
    assert_eq!(received.len(), 1);
    assert!(framer.is_poisoned());
}

proptest! {
    #[test]
    fn prop_chunking_does_not_change_output(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 1..20),
        cuts in prop::collection::vec(1usize..64, 1..400),
    ) {
        let stream = stream_of(&payloads);
        let mut framer = Framer::new(512);
        let mut received = Vec::new();

        let mut offset = 0;
        let mut cut = cuts.iter().cycle();
        while offset < stream.len() {
            let end = (offset + cut.next().copied().unwrap_or(1)).min(stream.len());
            framer
                .on_bytes_received(&stream[offset..end], |p| received.push(p))
                .unwrap();
            offset = end;
        }

        prop_assert_eq!(received.len(), payloads.len());
        for (package, payload) in received.iter().zip(&payloads) {
            prop_assert_eq!(package.payload(), &payload[..]);
        }
        prop_assert_eq!(framer.available(), 0);
    }

    #[test]
    fn prop_framer_matches_codec(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..100), 1..10),
    ) {
        let stream = stream_of(&payloads);

        let framed = Framer::new(4096).feed(&stream).unwrap();

        let mut codec = PackageCodec::default();
        let mut buf = BytesMut::from(&stream[..]);
        let mut decoded = Vec::new();
        while let Some(package) = codec.decode(&mut buf).unwrap() {
            decoded.push(package);
        }
        prop_assert_eq!(framed, decoded);
    }
}
