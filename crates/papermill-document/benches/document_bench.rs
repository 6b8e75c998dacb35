// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the papermill-document crate: text layout over a
// long multi-page input, and the size-targeted JPEG search on a synthetic
// photo-like image.

use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use papermill_core::SizeConstraint;
use papermill_document::JpegCodec;
use papermill_document::encode_to_size;
use papermill_document::layout::{BuiltinMetrics, PageGeometry, layout};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Wrap and paginate roughly 50 pages of prose with the built-in metrics.
fn bench_layout(c: &mut Criterion) {
    let paragraph = "The quick brown fox jumps over the lazy dog, then naps in the afternoon sun. "
        .repeat(12);
    let text = vec![paragraph; 200].join("\n");
    let geometry = PageGeometry::default();

    c.bench_function("layout (200 paragraphs, A4)", |b| {
        b.iter(|| {
            let doc = layout(black_box(&text), &BuiltinMetrics, &geometry);
            black_box(doc.pages().len());
        });
    });
}

/// Run the full quality/width search on a noisy 800x600 image so the
/// 20 KB budget forces several downscales.
fn bench_encode_to_size(c: &mut Criterion) {
    let img = RgbImage::from_fn(800, 600, |x, y| {
        let n = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
        Rgb([(n >> 8) as u8, (n >> 16) as u8, (x ^ y) as u8])
    });
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("encode synthetic image");
    let constraint = SizeConstraint::from_target_kb(20);

    let mut group = c.benchmark_group("encode_to_size");
    group.sample_size(10);
    group.bench_function("800x600 to 20 KB", |b| {
        b.iter(|| {
            let sized = encode_to_size(black_box(&png), &constraint, &JpegCodec)
                .expect("encode to size");
            black_box(sized.bytes.len());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_layout, bench_encode_to_size);
criterion_main!(benches);
