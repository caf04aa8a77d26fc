//! Benchmarks for the miniature pipeline.
//!
//! Run with: cargo bench -p frameo-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frameo_core::config::{OutputFormat, Resolution};
use frameo_core::pipeline::encode::OutputEncoder;
use frameo_core::pipeline::geometry::{apply_orientation, fit_to_frame};
use image::DynamicImage;
use std::path::Path;

fn benchmark_fit_to_frame(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(4000, 3000);
    let resolution = Resolution::default();

    c.bench_function("fit_to_frame_4000x3000", |b| {
        b.iter(|| fit_to_frame(black_box(img.clone()), resolution))
    });
}

fn benchmark_orientation(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);

    c.bench_function("apply_orientation_6", |b| {
        b.iter(|| apply_orientation(black_box(img.clone()), Some(6)))
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1280, 800);
    let path = Path::new("bench.jpg");

    let mut group = c.benchmark_group("encode_1280x800");
    for format in [OutputFormat::Webp, OutputFormat::Jpeg] {
        let encoder = OutputEncoder::new(format, 80);
        group.bench_function(format.extension(), |b| {
            b.iter(|| encoder.encode(black_box(&img), path))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_fit_to_frame,
    benchmark_orientation,
    benchmark_encode
);
criterion_main!(benches);
