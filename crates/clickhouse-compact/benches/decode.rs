//! Benchmarks for type resolution and response decoding.
//!
//! Run with: cargo bench --bench decode

use std::fmt::Write as _;
use std::hint::black_box;
use std::sync::Arc;

use clickhouse_compact::{DecoderConfig, ResponseDecoder, TypeRegistry, grammar};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const NESTED: &str = r"Tuple(UInt8, Tuple(UInt8, Nullable(Nothing), String, Array(String)), Decimal(9, 2), Date, IPv4, IPv6, Nullable(Enum8('' = -128, 'a' = 1, '\t\n\0\\\'' = 2)))";

fn create_body(rows: usize) -> Vec<u8> {
    let mut body = String::from(
        r#"{"meta":[{"name":"id","type":"UInt64"},{"name":"tag","type":"Nullable(String)"},{"name":"amount","type":"Decimal(18, 4)"},{"name":"day","type":"Date"},{"name":"xs","type":"Array(Int32)"}],"data":["#,
    );
    for i in 0..rows {
        if i > 0 {
            body.push(',');
        }
        let _ = write!(
            body,
            r#"["{i}","tag_{i}",{i}.1234,"2024-01-{:02}",[1,2,3]]"#,
            i % 28 + 1
        );
    }
    body.push_str("]}");
    body.into_bytes()
}

fn bench_type_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("type_parsing");
    let registry = TypeRegistry::new();

    group.bench_function("grammar_nested", |b| {
        b.iter(|| black_box(grammar::parse(black_box(NESTED))));
    });

    group.bench_function("resolve_nested", |b| {
        b.iter(|| black_box(registry.parse(black_box(NESTED))));
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let registry = Arc::new(TypeRegistry::new());

    for rows in [100, 10_000] {
        let body = create_body(rows);
        group.throughput(Throughput::Elements(rows as u64));

        let cached = ResponseDecoder::new(Arc::clone(&registry));
        group.bench_with_input(BenchmarkId::new("cached", rows), &body, |b, body| {
            b.iter(|| {
                let records = cached.decode_slice(body).unwrap();
                black_box(records.filter_map(Result::ok).count())
            });
        });

        let uncached = ResponseDecoder::with_config(Arc::clone(&registry), DecoderConfig::small());
        group.bench_with_input(BenchmarkId::new("uncached", rows), &body, |b, body| {
            b.iter(|| {
                let records = uncached.decode_slice(body).unwrap();
                black_box(records.filter_map(Result::ok).count())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_type_parsing, bench_decode);
criterion_main!(benches);
