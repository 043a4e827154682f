//! Audio output sinks for rendered segments.

#[cfg(feature = "rtrb")]
pub mod device;

use thiserror::Error;

#[cfg(feature = "rtrb")]
pub use device::DeviceSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("no default output device available")]
    NoDevice,
    #[error("failed to fetch default output config")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build output stream")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream")]
    Play(#[from] cpal::PlayStreamError),
    #[error("audio device stopped consuming samples")]
    Stalled,
}

/// Destination for mono f32 samples.
///
/// `write` may block until there is room; that wait is what paces playback
/// to real time.
pub trait SampleSink {
    fn write(&mut self, samples: &[f32]) -> Result<(), SinkError>;

    /// Wait until everything written has been played
    fn drain(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Collects samples in memory (offline rendering, tests)
#[derive(Debug, Default)]
pub struct MemorySink {
    pub samples: Vec<f32>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleSink for MemorySink {
    fn write(&mut self, samples: &[f32]) -> Result<(), SinkError> {
        self.samples.extend_from_slice(samples);
        Ok(())
    }
}

impl<S: SampleSink + ?Sized> SampleSink for &mut S {
    fn write(&mut self, samples: &[f32]) -> Result<(), SinkError> {
        (**self).write(samples)
    }

    fn drain(&mut self) -> Result<(), SinkError> {
        (**self).drain()
    }
}
