//! Benchmarks for wavelet rendering and cache lookups.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tzxplay::dsp::{EdgeShape, WaveletCache};

/// Pilot, sync and bit pulse lengths at 44.1kHz
const LENGTHS: &[usize] = &[8, 9, 33, 38, 75];

pub fn bench_wavelet(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavelet");

    for shape in [EdgeShape::Flat, EdgeShape::Shaped] {
        let name = format!("{:?}", shape).to_lowercase();

        // Cold: every call renders a new buffer
        group.bench_with_input(BenchmarkId::new("render", &name), &shape, |b, &shape| {
            b.iter(|| {
                let mut cache = WaveletCache::new(shape);
                for &len in LENGTHS {
                    black_box(cache.segment(black_box(len), true));
                    black_box(cache.segment(black_box(len), false));
                }
            })
        });

        // Warm: the steady state during a data block
        let mut cache = WaveletCache::new(shape);
        for &len in LENGTHS {
            cache.segment(len, true);
            cache.segment(len, false);
        }
        group.bench_with_input(BenchmarkId::new("cached", &name), &shape, |b, _| {
            b.iter(|| {
                for &len in LENGTHS {
                    black_box(cache.segment(black_box(len), true));
                    black_box(cache.segment(black_box(len), false));
                }
            })
        });
    }

    group.finish();
}
