use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use qubic_protocol::core::header::RequestResponseHeader;
use qubic_protocol::Framer;

fn stream(package_count: usize, payload_size: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(package_count * (payload_size + 8));
    for i in 0..package_count {
        #[allow(clippy::unwrap_used)]
        let header = RequestResponseHeader::new((i % 36) as u8, payload_size).unwrap();
        bytes.extend(header.to_bytes());
        bytes.extend(std::iter::repeat(i as u8).take(payload_size));
    }
    bytes
}

#[allow(clippy::unwrap_used)]
fn bench_framer_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("framer_chunking");
    let data = stream(1024, 120);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for &chunk_size in &[1usize, 64, 1500, 64 * 1024] {
        group.bench_function(format!("chunk_{chunk_size}b"), |b| {
            b.iter_batched(
                || Framer::new(256 * 1024),
                |mut framer| {
                    let mut count = 0usize;
                    for chunk in data.chunks(chunk_size) {
                        count += framer.on_bytes_received(chunk, |_| {}).unwrap();
                    }
                    assert_eq!(count, 1024);
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_framer_large_packages(c: &mut Criterion) {
    let mut group = c.benchmark_group("framer_large_packages");

    for &payload_size in &[1024usize, 41_328, 1024 * 1024] {
        let data = stream(4, payload_size);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("payload_{payload_size}b"), |b| {
            let mut framer = Framer::default();
            b.iter(|| {
                for chunk in data.chunks(64 * 1024) {
                    framer.on_bytes_received(chunk, |_| {}).unwrap();
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_framer_chunking, bench_framer_large_packages);
criterion_main!(benches);
