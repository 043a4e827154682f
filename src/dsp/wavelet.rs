use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SILENCE_CHUNK;

/*
Wavelets
========

A tape signal is a square wave whose edges carry the data. Between two edges
the level is constant, so the output is a sequence of half-cycles, each one
described by just two numbers: its length in samples and its level (high or
low). We call the rendered buffer for one half-cycle a "wavelet".

Edge Shapes
-----------

  Flat:     ┌──────┐
            │      │
  ──────────┘      └──────   constant ±0.977 (32000 / 32767)

  Shaped:     ╭────╮
             ╱      ╲
  ──────────╯        ╰────   half a sine period, peak grows with length

The shaped variant approximates the rounded transitions a real cassette
produces. Short pulses get a lower peak so that pilot tones and data bits keep
roughly the same energy:

    peak = min((length + 10) / 25, 1.0)

At 44.1kHz a standard ROM "zero" bit half-cycle (855 T-states) is ~11 samples,
giving a peak of 0.84; pilot pulses (2168 T-states, ~27 samples) already
saturate at 1.0.

Caching
-------

A tape image uses only a handful of distinct pulse lengths (pilot, sync,
zero, one), so after the first few hundred edges every wavelet is a cache
hit. The cache is append-only and never evicts; handing out `Arc<[f32]>`
lets every hit share the same allocation.

Silence is served from a single zero chunk of SILENCE_CHUNK samples. Gaps
longer than that are split into several segments, and the remainder is a
prefix view of the same chunk, so silence never allocates after start-up.
*/

/// How the level between two edges is rendered.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeShape {
    /// Constant amplitude square wave.
    #[default]
    Flat,
    /// Half-sine envelope per half-cycle.
    Shaped,
}

const FLAT_AMPLITUDE: f32 = 32000.0 / 32767.0;

/// One buffer of output audio.
///
/// Dereferences to the samples it covers. Cached wavelets and silence are
/// shared, so cloning a segment never copies sample data.
#[derive(Debug, Clone)]
pub struct Segment {
    samples: Arc<[f32]>,
    len: usize,
}

impl Segment {
    fn whole(samples: Arc<[f32]>) -> Self {
        let len = samples.len();
        Self { samples, len }
    }

    /// Check whether two segments are views over the same allocation
    pub fn shares_buffer(&self, other: &Segment) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

impl Deref for Segment {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples[..self.len]
    }
}

impl AsRef<[f32]> for Segment {
    fn as_ref(&self) -> &[f32] {
        self
    }
}

/// Append-only store of rendered half-cycles keyed by (length, level).
pub struct WaveletCache {
    shape: EdgeShape,
    wavelets: HashMap<(usize, bool), Arc<[f32]>>,
    zeros: Arc<[f32]>,
}

impl WaveletCache {
    pub fn new(shape: EdgeShape) -> Self {
        Self {
            shape,
            wavelets: HashMap::new(),
            zeros: Arc::from(vec![0.0f32; SILENCE_CHUNK]),
        }
    }

    pub fn shape(&self) -> EdgeShape {
        self.shape
    }

    /// Number of distinct wavelets rendered so far
    pub fn len(&self) -> usize {
        self.wavelets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelets.is_empty()
    }

    /// Get the half-cycle of `length` samples at `level`, rendering it on first use.
    ///
    /// `length` must be positive; the playback loop never asks for empty segments.
    pub fn wavelet(&mut self, length: usize, level: bool) -> Arc<[f32]> {
        debug_assert!(length > 0, "wavelets are never empty");
        let shape = self.shape;
        self.wavelets
            .entry((length, level))
            .or_insert_with(|| render(shape, length, level))
            .clone()
    }

    /// Same as [`wavelet`](Self::wavelet), wrapped as an output segment.
    pub fn segment(&mut self, length: usize, level: bool) -> Segment {
        Segment::whole(self.wavelet(length, level))
    }

    /// Next piece of a silent gap of `remaining` samples.
    ///
    /// Returns at most SILENCE_CHUNK samples; callers loop until the gap is covered.
    pub fn silence(&self, remaining: usize) -> Segment {
        Segment {
            samples: self.zeros.clone(),
            len: remaining.min(SILENCE_CHUNK),
        }
    }
}

fn render(shape: EdgeShape, length: usize, level: bool) -> Arc<[f32]> {
    let sign = if level { 1.0 } else { -1.0 };
    match shape {
        EdgeShape::Flat => Arc::from(vec![sign * FLAT_AMPLITUDE; length]),
        EdgeShape::Shaped => {
            let amp = sign * ((length as f32 + 10.0) / 25.0).min(1.0);
            let step = std::f32::consts::PI / length as f32;
            (0..length)
                .map(|pos| amp * (pos as f32 * step).sin())
                .collect()
        }
    }
}
