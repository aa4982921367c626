//! Benchmarks for the digest pipeline.
//!
//! Benchmark targets:
//! - Error normalization: <20µs per message
//! - Full digest over 200 runs: <5ms
//! - Full digest over 1,000 runs: <25ms

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

use faildigest::models::{ProjectIdentity, RawRun};
use faildigest::services::DigestService;
use faildigest::services::digest::normalize_error;

// ============================================================================
// Helper Functions
// ============================================================================

const ERRORS: &[&str] = &[
    "permission denied: /tmp/build-{n}/out.log",
    "bash: line {n}: jq: command not found",
    "request {n} timed out after 30s at 2025-03-14T10:00:00Z",
    "JSONDecodeError: Expecting value: line 1 column {n} (char {n})",
    "HTTP 429 Too Many Requests (retry after {n}s)",
    "segfault at 0x7ffd{n}a0 ip 0x55d1 sp 0x7ffd error 4",
    "cd: /work/feature-{n}: No such file or directory",
];

const TOOLS: &[&str] = &["bash", "read", "write", "http", "edit"];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

/// Builds `count` failed runs spread over the last week.
fn runs(count: usize) -> Vec<RawRun> {
    let now = now();
    (0..count)
        .map(|i| {
            let error = ERRORS[i % ERRORS.len()].replace("{n}", &i.to_string());
            let minutes_ago = i64::try_from(i * 37).unwrap();
            RawRun::tool(format!("{i:08x}-run"), TOOLS[i % TOOLS.len()], error)
                .with_start_time(now - Duration::minutes(minutes_ago))
                .with_inputs(json!({"command": format!("make target-{i}"), "cwd": "/work/api"}))
        })
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_error");

    for (idx, template) in ERRORS.iter().enumerate() {
        let error = template.replace("{n}", "4096");
        group.bench_with_input(BenchmarkId::new("template", idx), &error, |b, error| {
            b.iter(|| normalize_error(black_box(error)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_digest");
    let service = DigestService::default();
    let identity = ProjectIdentity::new("api", "api");

    for count in [50usize, 200, 1_000] {
        let runs = runs(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("runs", count), &runs, |b, runs| {
            b.iter(|| service.render(black_box(&identity), black_box(runs), now()));
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let service = DigestService::default();
    let identity = ProjectIdentity::new("api", "api");
    let runs = runs(200);

    c.bench_function("report_200_runs", |b| {
        b.iter(|| service.report(black_box(&identity), black_box(&runs), now()));
    });
}

criterion_group!(benches, bench_normalize, bench_render, bench_report);
criterion_main!(benches);
