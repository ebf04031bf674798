use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nvcfg_config::{checksum, decode, encode};

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    for size in [16usize, 256, 4096] {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| checksum(black_box(data)))
        });
    }
    group.finish();
}

fn bench_record(c: &mut Criterion) {
    let record = [0x5Au8; 32];
    let blob = encode(&record);
    c.bench_function("encode_32", |b| b.iter(|| encode(black_box(&record))));
    c.bench_function("decode_32", |b| {
        b.iter(|| decode::<[u8; 32]>(black_box(&blob)).unwrap())
    });
}

criterion_group!(benches, bench_checksum, bench_record);
criterion_main!(benches);
