//! Codec adapter benchmark suite
//!
//! Criterion view of the same adapters the calibrated runner compares:
//! - serialize and deserialize per adapter
//! - every built-in case

use codec_calibration_bench::cases::catalog;
use codec_calibration_bench::subjects::subjects;
use codec_calibration_bench::SubjectVariant;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for case in catalog(0) {
        for subject in subjects(SubjectVariant::All) {
            group.bench_with_input(
                BenchmarkId::new(subject.name(), case.name()),
                case.payload(),
                |bencher, payload| bencher.iter(|| subject.serialize(black_box(payload))),
            );
        }
    }

    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize");

    for case in catalog(0) {
        for subject in subjects(SubjectVariant::All) {
            let Ok(bytes) = subject.serialize(case.payload()) else {
                continue;
            };
            group.bench_with_input(
                BenchmarkId::new(subject.name(), case.name()),
                &bytes,
                |bencher, bytes| bencher.iter(|| subject.deserialize(black_box(bytes))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_deserialize);
criterion_main!(benches);
