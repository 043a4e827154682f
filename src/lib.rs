pub mod control; // Transport commands and progress side channel
pub mod dsp; // Wavelet synthesis and sample timing
pub mod io; // Audio output sinks
pub mod playback; // Block interpreter producing audio segments
pub mod tape; // Tape image model, parsers and pulse encoder

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// ZX Spectrum 48K Z80 clock.
pub const DEFAULT_CPU_FREQ: u32 = 3_500_000;
/// Length of the shared all-zero buffer used for gaps between edges.
pub const SILENCE_CHUNK: usize = 1024;
