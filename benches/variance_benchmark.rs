//! Criterion benchmarks for the block statistics and sub-pixel variance.
//!
//! Tracks performance across:
//! - Every block size in the catalogue
//! - Scalar vs detected (SIMD) kernels
//! - Full-pel, half-pel and diagonal sub-pixel phases

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zenvariance::{BlockSize, FilterPhase, Kernels, PixelBlock};

/// Deterministic pseudo-random plane so runs are comparable.
fn plane(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

fn bench_variance(c: &mut Criterion) {
    let mut group = c.benchmark_group("variance");
    let stride = 80;
    let a = plane(stride * 65, 1);
    let b = plane(stride * 65, 2);

    for (tier, kernels) in [("scalar", Kernels::scalar()), ("detect", Kernels::detect())] {
        for bsize in BlockSize::ALL {
            let ba = PixelBlock::new(&a, stride, bsize.width(), bsize.height()).unwrap();
            let bb = PixelBlock::new(&b, stride, bsize.width(), bsize.height()).unwrap();
            group.throughput(Throughput::Elements(bsize.pixel_count() as u64));
            group.bench_with_input(BenchmarkId::new(tier, bsize), &bsize, |bench, _| {
                bench.iter(|| kernels.variance(black_box(&ba), black_box(&bb)))
            });
        }
    }
    group.finish();
}

fn bench_sub_pixel_variance(c: &mut Criterion) {
    let mut group = c.benchmark_group("sub_pixel_variance");
    let stride = 80;
    let src = plane(stride * 65, 3);
    let reference = plane(stride * 65, 4);
    let kernels = Kernels::detect();

    let phases = [
        ("full", FilterPhase::ZERO, FilterPhase::ZERO),
        ("half_x", FilterPhase::HALF, FilterPhase::ZERO),
        ("diag", FilterPhase::from_mv(3), FilterPhase::from_mv(5)),
    ];

    for bsize in [BlockSize::Block8x8, BlockSize::Block16x16, BlockSize::Block64x64] {
        let s = PixelBlock::new(&src, stride, bsize.width(), bsize.height()).unwrap();
        let r = PixelBlock::new(&reference, stride, bsize.width(), bsize.height()).unwrap();
        group.throughput(Throughput::Elements(bsize.pixel_count() as u64));
        for (name, xp, yp) in phases {
            group.bench_with_input(BenchmarkId::new(name, bsize), &bsize, |bench, _| {
                bench.iter(|| kernels.sub_pixel_variance(black_box(&s), xp, yp, black_box(&r)))
            });
            group.bench_with_input(BenchmarkId::new(format!("{}_avg", name), bsize), &bsize, |bench, _| {
                bench.iter(|| {
                    kernels.sub_pixel_avg_variance(black_box(&s), xp, yp, black_box(&r), black_box(&r))
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_variance, bench_sub_pixel_variance);
criterion_main!(benches);
