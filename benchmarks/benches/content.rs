//! Upload decoding benchmarks using Criterion

use base64::{engine::general_purpose::STANDARD, Engine};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use filebridge_core::{decode_content, validate_relative_path, IncomingFilePayload};

fn feature_file(size: usize) -> String {
    "Feature: Login\n  Scenario: valid user\n    Given a user\n".repeat(size / 50 + 1)[..size].to_string()
}

fn content_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("content");

    let text = feature_file(64 * 1024);
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("decode_plain_64kb", |b| b.iter(|| black_box(decode_content(&text))));

    let encoded = STANDARD.encode(text.as_bytes());
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("decode_base64_64kb", |b| b.iter(|| black_box(decode_content(&encoded))));

    let body = serde_payload(&encoded);
    group.bench_function("parse_payload_64kb", |b| {
        b.iter(|| black_box(IncomingFilePayload::parse(&body).unwrap()))
    });

    group.bench_function("validate_folder_path", |b| {
        b.iter(|| black_box(validate_relative_path("Features/Auth/Steps/Generated")))
    });

    group.finish();
}

fn serde_payload(content: &str) -> String {
    format!(
        "{{\"fileName\":\"Login.feature\",\"content\":\"{}\",\"folderPath\":\"Features/Auth\"}}",
        content
    )
}

criterion_group!(benches, content_benchmarks);
criterion_main!(benches);
