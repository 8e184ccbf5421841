//! Redaction and classification performance benchmarks.
//!
//! Measures the rule tables on lab-shaped text of increasing size, and the
//! curator on a full raw dataset file.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use labsieve::{CuratorConfig, Curator, RedactionTable, SensitivityTable};
use std::io::Write;
use tempfile::TempDir;

/// Generate sensor-log style text with addresses, mail and the odd secret.
fn generate_lab_text(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        text.push_str(&format!(
            "ts={} src=10.0.{}.{} dst=192.168.1.{} proto=tcp note=\"",
            1_700_000_000 + i,
            i % 256,
            (i * 7) % 256,
            i % 254 + 1
        ));
        match i % 5 {
            0 => text.push_str("contact ops@lab.example"),
            1 => text.push_str("call +1 555-010-0199"),
            2 => text.push_str("token=abcd1234efgh5678"),
            3 => text.push_str("blob U29tZSBsb25nIGJhc2U2NCBlbmNvZGVkIHRleHQgZm9yIHRlc3Rpbmc="),
            _ => text.push_str("routine scan finished"),
        }
        text.push_str("\"\n");
    }
    text
}

fn bench_redaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("redaction");
    let table = RedactionTable::standard();

    for lines in [10, 100, 1000].iter() {
        let text = generate_lab_text(*lines);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("lab_lines", lines), &text, |b, text| {
            b.iter(|| black_box(table.redact(text)))
        });
    }

    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    let table = SensitivityTable::standard();

    let clean = generate_lab_text(100);
    let mut dirty = clean.clone();
    dirty.push_str("operator opened meterpreter session\n");

    group.bench_function("clean_100", |b| b.iter(|| black_box(table.classify(&clean))));
    group.bench_function("dirty_100", |b| b.iter(|| black_box(table.classify(&dirty))));

    group.finish();
}

fn bench_curate_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("curate_file");

    for records in [100, 1000].iter() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.jsonl");
        let mut file = std::fs::File::create(&raw).unwrap();
        for i in 0..*records {
            let line = serde_json::json!({
                "id": format!("{:064x}", i),
                "source": "zeek/logs/conn.log",
                "collected_at": "2025-01-01T00:00:00Z",
                "text": generate_lab_text(5),
            });
            writeln!(file, "{}", line).unwrap();
        }

        let config = CuratorConfig {
            raw: raw.clone(),
            curated: dir.path().join("curated.jsonl"),
            review: dir.path().join("review.jsonl"),
            ..Default::default()
        };

        group.throughput(Throughput::Elements(*records as u64));
        group.bench_with_input(BenchmarkId::new("records", records), &config, |b, config| {
            b.iter(|| black_box(Curator::new(config).curate().unwrap()))
        });
    }

    group.finish();
}

fn bench_table_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_creation");

    group.bench_function("redaction_standard", |b| {
        b.iter(|| black_box(RedactionTable::standard()))
    });
    group.bench_function("sensitivity_standard", |b| {
        b.iter(|| black_box(SensitivityTable::standard()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_redaction,
    bench_classification,
    bench_curate_file,
    bench_table_creation
);
criterion_main!(benches);
