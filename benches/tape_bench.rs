//! Benchmarks for tape synthesis and playback.
//!
//! Run with: cargo bench
//!
//! Playback only has to stay ahead of the sound card, so the number that
//! matters is how many seconds of tape are rendered per second of CPU.
//!
//! Reference: a 6912-byte screen saved by the ROM is about 40s of tape and
//! 110k pulse edges.
//!
//! Benchmark groups:
//!   - dsp/*        Wavelet synthesis and the sample clock
//!   - scenarios/*  Whole blocks through the player

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Output rates worth checking
pub const SAMPLE_RATES: &[u32] = &[22_050, 44_100, 96_000];

criterion_group!(
    benches,
    dsp::bench_wavelet,
    dsp::bench_clock,
    scenarios::bench_playback,
);
criterion_main!(benches);
