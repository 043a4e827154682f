//! Signal generation for tape playback.
//!
//! Everything here is free of I/O: the synthesizer turns segment lengths into
//! sample buffers and the clock turns pulse durations into segment lengths.
//! The playback interpreter stitches the two together.

/// Sample-accurate conversion of pulse durations.
pub mod clock;
/// Cached half-cycle buffers and shared silence.
pub mod wavelet;

pub use clock::SampleClock;
pub use wavelet::{EdgeShape, Segment, WaveletCache};
