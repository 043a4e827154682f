use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::EdgeShape, DEFAULT_CPU_FREQ, DEFAULT_SAMPLE_RATE};

/// Options for one playback session
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// End playback at a "stop the tape" pause block
    pub stop_always: bool,
    /// End playback at a "stop the tape if in 48K mode" block
    pub stop_48k: bool,
    /// Flat or sine-shaped half-cycles
    pub shape: EdgeShape,
    /// CPU clock used to convert T-states to time
    pub cpu_freq: u32,
    /// Log every block at info level instead of debug
    pub verbose: bool,
    /// Sleep between control polls while paused
    pub pause_poll: Duration,
}

impl PlaybackConfig {
    pub fn new() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            stop_always: false,
            stop_48k: false,
            shape: EdgeShape::Flat,
            cpu_freq: DEFAULT_CPU_FREQ,
            verbose: false,
            pause_poll: Duration::from_millis(100),
        }
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn stop_always(mut self, stop: bool) -> Self {
        self.stop_always = stop;
        self
    }

    pub fn stop_48k(mut self, stop: bool) -> Self {
        self.stop_48k = stop;
        self
    }

    pub fn shape(mut self, shape: EdgeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn cpu_freq(mut self, cpu_freq: u32) -> Self {
        self.cpu_freq = cpu_freq;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn pause_poll(mut self, interval: Duration) -> Self {
        self.pause_poll = interval;
        self
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::new()
    }
}
