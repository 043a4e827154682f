//! Benchmarks for the sample clock.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tzxplay::dsp::SampleClock;
use tzxplay::tape::Encoder;

use crate::SAMPLE_RATES;

pub fn bench_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/clock");
    let encoder = Encoder::default();
    // 64 bytes of alternating bits
    let pulses: Vec<u64> = encoder
        .data(855, 1710, &[0xAA; 64], 8)
        .map(|ns| ns as u64)
        .collect();

    for &rate in SAMPLE_RATES {
        group.bench_with_input(BenchmarkId::new("advance", rate), &rate, |b, &rate| {
            b.iter(|| {
                let mut clock = SampleClock::new(rate);
                for &ns in &pulses {
                    black_box(clock.advance(black_box(ns)));
                }
            })
        });
    }

    group.finish();
}
