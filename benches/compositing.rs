use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use paintcore::basics::PI;
use paintcore::convolve::{convolve_region, kernels, ConvolveMode};
use paintcore::paint_mode::PaintMode;
use paintcore::region::{CombineOp, Region};
use paintcore::region_ops::{apply_paint_mode_region, blend_region};
use paintcore::stencil::{apply_stencil, Opacity, StencilOp};
use paintcore::transform::{transform_region, TransformOp, TransformOptions};
use paintcore::PixelBuffer;

const W: usize = 1024;
const H: usize = 768;

fn noise(w: usize, h: usize, bytes: usize, seed: u32) -> PixelBuffer {
    let mut state = seed.max(1);
    let data = (0..w * h * bytes)
        .map(|_| {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect();
    PixelBuffer::from_vec(w, h, bytes, data).unwrap()
}

fn bench_region_ops(c: &mut Criterion) {
    let a = noise(W, H, 4, 1);
    let b = noise(W, H, 4, 2);
    let mut d = PixelBuffer::new(W, H, 4).unwrap();

    c.bench_function("blend_region_rgba", |bench| {
        bench.iter(|| {
            blend_region(&a.as_region(), &b.as_region(), &mut d.as_region_mut(), black_box(96))
                .unwrap()
        })
    });

    // HSV modes only act on three-channel pixels.
    let a = noise(W, H, 3, 1);
    let b = noise(W, H, 3, 2);
    let mut d = PixelBuffer::new(W, H, 3).unwrap();
    let mut group = c.benchmark_group("paint_mode_rgb");
    for mode in [PaintMode::Multiply, PaintMode::Screen, PaintMode::HueOnly] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{mode:?}")), &mode, |bench, &mode| {
            bench.iter(|| {
                apply_paint_mode_region(&a.as_region(), &b.as_region(), &mut d.as_region_mut(), mode)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_convolve(c: &mut Criterion) {
    let src = noise(W, H, 3, 3);
    let mut dest = PixelBuffer::new(W, H, 3).unwrap();
    let mut group = c.benchmark_group("convolve_rgb");
    for size in [3usize, 5, 7] {
        let (k, div) = kernels::box_blur(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bench, &size| {
            bench.iter(|| {
                convolve_region(&src.as_region(), &mut dest.as_region_mut(), &k, size, div, ConvolveMode::Normal)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let w = W as i32;
    let h = H as i32;
    let disc = Region::ellipse(w, h, 400.0, 300.0, 250.0, 180.0);
    let star: Vec<(f64, f64)> = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { 300.0 } else { 120.0 };
            let t = i as f64 * PI / 5.0;
            (512.0 + r * t.cos(), 384.0 + r * t.sin())
        })
        .collect();

    c.bench_function("polygon_scan", |bench| {
        bench.iter(|| Region::from_polygon(w, h, black_box(&star)))
    });

    let poly = Region::from_polygon(w, h, &star);
    c.bench_function("combine_sub", |bench| {
        bench.iter(|| disc.combine(&poly, CombineOp::Sub, black_box(17), black_box(-9)))
    });

    let paint = noise(W, H, 4, 4);
    let mut canvas = noise(W, H, 4, 5);
    c.bench_function("stencil_blend", |bench| {
        bench.iter(|| {
            apply_stencil(
                &disc,
                (0, 0),
                Opacity::from_permille(700),
                StencilOp::Blend,
                Some(&paint.as_region()),
                None,
                &mut canvas.as_region_mut(),
            )
            .unwrap()
        })
    });
}

fn bench_transform(c: &mut Criterion) {
    let src = noise(512, 512, 4, 6);
    let mut group = c.benchmark_group("transform_512_rgba");
    for (name, angle) in [("quarter_turn", PI / 2.0), ("rotate_30deg", PI / 6.0)] {
        group.bench_function(name, |bench| {
            bench.iter(|| {
                transform_region(
                    &src.as_region(),
                    None,
                    &TransformOp::Rotate { angle: black_box(angle) },
                    &TransformOptions::default(),
                )
                .unwrap()
            })
        });
    }
    group.bench_function("nearest_scale_2x", |bench| {
        let options = TransformOptions::default().with_interpolation(false);
        bench.iter(|| {
            transform_region(&src.as_region(), None, &TransformOp::Scale { x: 2.0, y: 2.0 }, &options)
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_region_ops, bench_convolve, bench_selection, bench_transform);
criterion_main!(benches);
