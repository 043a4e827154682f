//! Benchmarks for whole blocks through the player.

use criterion::{BenchmarkId, Criterion, Throughput};
use tzxplay::control::NoControl;
use tzxplay::dsp::EdgeShape;
use tzxplay::playback::{PlaybackConfig, Player};
use tzxplay::tape::Block;

use crate::SAMPLE_RATES;

/// A 6912-byte screen as the ROM saves it
fn screen_block() -> Block {
    let mut data = vec![0xFF];
    data.extend((0..6912u32).map(|i| (i * 31 % 251) as u8));
    data.push(0x5A);
    Block::StandardSpeed {
        pause_ms: 1000,
        data,
    }
}

pub fn bench_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/playback");
    group.sample_size(20);
    let blocks = vec![screen_block()];

    for &rate in SAMPLE_RATES {
        for shape in [EdgeShape::Flat, EdgeShape::Shaped] {
            let config = PlaybackConfig::new().sample_rate(rate).shape(shape);
            let samples: u64 = Player::new(&blocks, config.clone(), NoControl)
                .filter_map(Result::ok)
                .map(|segment| segment.len() as u64)
                .sum();
            group.throughput(Throughput::Elements(samples));

            let id = format!("{:?}/{}", shape, rate).to_lowercase();
            group.bench_with_input(BenchmarkId::new("screen", id), &config, |b, config| {
                b.iter(|| {
                    Player::new(&blocks, config.clone(), NoControl)
                        .filter_map(Result::ok)
                        .map(|segment| segment.len())
                        .sum::<usize>()
                })
            });
        }
    }

    group.finish();
}
