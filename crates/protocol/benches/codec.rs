//! Benchmarks for the f142 and hs00 codecs
//!
//! These benchmarks track:
//! 1. Encode cost for scalar and array log values
//! 2. Decode cost, which should not copy array payloads
//! 3. Histogram encode/decode as the bin count grows

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use streaming_protocol::{
    AlarmSeverity, AlarmStatus, DimensionMetaData, Histogram, Value, decode_histogram, decode_log_value,
    encode_histogram, encode_log_value,
};

/// A 2-D histogram with `bins` x `bins` f64 counts
fn create_histogram(bins: usize) -> Histogram {
    let edges: Vec<f64> = (0..=bins).map(|i| i as f64).collect();
    let counts: Vec<f64> = (0..bins * bins).map(|i| (i % 97) as f64).collect();

    Histogram {
        source: Some("bench_source".into()),
        timestamp: 1_600_000_000_000_000_000,
        current_shape: vec![bins as u32, bins as u32],
        dim_metadata: vec![
            DimensionMetaData::new(bins as u32, "mm", "x", edges.clone()),
            DimensionMetaData::new(bins as u32, "mm", "y", edges),
        ],
        data: counts.into(),
        errors: None,
        last_metadata_timestamp: None,
        info: None,
    }
}

/// Benchmark log value encoding
fn bench_log_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("f142_encode");

    let scalar = Value::F64(21.5);
    group.throughput(Throughput::Elements(1));
    group.bench_function("scalar_f64", |b| {
        b.iter(|| {
            black_box(
                encode_log_value(
                    black_box(&scalar),
                    "motor:x",
                    1_000,
                    Some(AlarmStatus::NoAlarm),
                    Some(AlarmSeverity::NoAlarm),
                )
                .unwrap(),
            )
        })
    });

    for len in [100, 10_000] {
        let array = Value::ArrayI32((0..len).collect());
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("array_i32", len), &array, |b, array| {
            b.iter(|| black_box(encode_log_value(black_box(array), "detector", 1_000, None, None).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark log value decoding - array payloads are borrowed, not copied
fn bench_log_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("f142_decode");

    for len in [100, 10_000] {
        let buf = encode_log_value(&Value::ArrayF64(vec![0.5; len]), "detector", 1_000, None, None).unwrap();
        group.throughput(Throughput::Bytes(buf.len() as u64));
        group.bench_with_input(BenchmarkId::new("array_f64", len), &buf, |b, buf| {
            b.iter(|| black_box(decode_log_value(black_box(buf)).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark histogram encode and decode
fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("hs00");

    for bins in [16, 256] {
        let histogram = create_histogram(bins);
        let buf = encode_histogram(&histogram).unwrap();

        group.throughput(Throughput::Elements((bins * bins) as u64));
        group.bench_with_input(BenchmarkId::new("encode", bins), &histogram, |b, histogram| {
            b.iter(|| black_box(encode_histogram(black_box(histogram)).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("decode", bins), &buf, |b, buf| {
            b.iter(|| black_box(decode_histogram(black_box(buf)).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("decode_to_owned", bins), &buf, |b, buf| {
            b.iter(|| black_box(decode_histogram(black_box(buf)).unwrap().to_owned().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_log_encode, bench_log_decode, bench_histogram);

criterion_main!(benches);
