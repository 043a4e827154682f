//! Sample clock - pulse durations to sample-accurate segment lengths
//!
//! Tape edges are specified in CPU T-states, which never divide evenly into
//! output samples. Rounding every pulse on its own drifts by up to half a
//! sample per edge; over a 40k-edge loading screen that is seconds of error.
//! Instead the clock keeps the absolute tape position in nanoseconds and
//! rounds only that, so the error never exceeds half a sample.

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Accumulates real tape time and converts it to whole samples.
#[derive(Debug, Clone)]
pub struct SampleClock {
    /// Output sample rate in Hz
    rate: u32,
    /// Tape time consumed so far
    real_time_ns: u64,
    /// Samples emitted so far
    sample_time: u64,
}

impl SampleClock {
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            real_time_ns: 0,
            sample_time: 0,
        }
    }

    /// Advance by one pulse and return the length of the segment it covers.
    ///
    /// A result of 0 means the pulse was shorter than the remaining fraction of
    /// a sample; its time is carried into the next pulse.
    pub fn advance(&mut self, ns: u64) -> usize {
        self.real_time_ns += ns;
        let new_sample_time = self.sample_at(self.real_time_ns);
        let length = new_sample_time.saturating_sub(self.sample_time);
        self.sample_time = new_sample_time;
        length as usize
    }

    /// Sample index of a tape position, rounded half up
    pub fn sample_at(&self, real_time_ns: u64) -> u64 {
        ((real_time_ns as u128 * self.rate as u128 + NANOS_PER_SECOND / 2) / NANOS_PER_SECOND)
            as u64
    }

    /// Rewind to tape position zero
    pub fn reset(&mut self) {
        self.real_time_ns = 0;
        self.sample_time = 0;
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn real_time_ns(&self) -> u64 {
        self.real_time_ns
    }

    pub fn sample_time(&self) -> u64 {
        self.sample_time
    }
}
