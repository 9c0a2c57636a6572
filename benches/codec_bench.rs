use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use qubic_protocol::core::builder::PackageBuilder;
use qubic_protocol::core::codec::PackageCodec;
use qubic_protocol::core::header::RequestResponseHeader;
use qubic_protocol::core::wire::{WireDecode, WireEncode};
use qubic_protocol::crypto::keys::{identity, identity_to_bytes};
use qubic_protocol::crypto::Hasher;
use qubic_protocol::protocol::PackageType;
use qubic_protocol::types::{Entity, EntityResponse, PublicKey, TickData};
use tokio_util::codec::Decoder;

/// Non-cryptographic stand-in; the benches measure encoding only.
struct XorFold;

impl Hasher for XorFold {
    fn hash_into(&self, input: &[u8], output: &mut [u8]) {
        output.fill(0);
        for (i, byte) in input.iter().enumerate() {
            output[i % output.len()] ^= byte;
        }
    }
}

fn entity_response() -> EntityResponse {
    EntityResponse {
        entity: Entity {
            public_key: PublicKey::contract(1),
            incoming_amount: 1_000_000,
            outgoing_amount: 1,
            ..Entity::default()
        },
        tick: 15_000_000,
        spectrum_index: 42,
        siblings: vec![[7u8; 32]; 24],
    }
}

#[allow(clippy::unwrap_used)]
fn bench_structures(c: &mut Criterion) {
    let mut group = c.benchmark_group("structures");

    let response = entity_response();
    let encoded = response.to_bytes();
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("entity_response_encode", |b| {
        b.iter(|| black_box(response.to_bytes()))
    });
    group.bench_function("entity_response_decode", |b| {
        b.iter(|| black_box(EntityResponse::decode(&encoded).unwrap()))
    });

    let tick_data = TickData::default();
    let encoded = tick_data.to_bytes();
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("tick_data_decode", |b| {
        b.iter(|| black_box(TickData::decode(&encoded).unwrap()))
    });

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_package_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("package_codec");
    let body = entity_response();
    let header = RequestResponseHeader::new(PackageType::RespondEntity, body.wire_size()).unwrap();
    let mut builder = PackageBuilder::new();
    builder.add(&header).add(&body);
    let package = builder.into_bytes();

    let mut stream = BytesMut::new();
    for _ in 0..256 {
        stream.extend_from_slice(&package);
    }
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("decode_256_entity_responses", |b| {
        b.iter(|| {
            let mut codec = PackageCodec::default();
            let mut buf = stream.clone();
            let mut count = 0;
            while let Some(package) = codec.decode(&mut buf).unwrap() {
                black_box(EntityResponse::decode(package.payload()).unwrap());
                count += 1;
            }
            assert_eq!(count, 256);
        })
    });

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_identity(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity");
    let key = [0xA5u8; 32];
    let id = identity(&XorFold, &key, false);

    group.bench_function("encode", |b| {
        b.iter(|| black_box(identity(&XorFold, black_box(&key), false)))
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(identity_to_bytes(black_box(&id)).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_structures, bench_package_codec, bench_identity);
criterion_main!(benches);
