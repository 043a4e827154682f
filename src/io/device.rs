//! Live output through cpal.
//!
//! The player runs on the caller's thread and pushes into an rtrb ring; the
//! cpal callback pops one sample per frame and copies it to every channel.
//! A full ring makes `write` sleep, which keeps generation at real time.

use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use tracing::{debug, error};

use super::{SampleSink, SinkError};

/// Sleep between attempts while the ring is full
const WRITE_BACKOFF: Duration = Duration::from_millis(5);
/// Give up when the device has not taken a sample for this long
const STALL_TIMEOUT: Duration = Duration::from_secs(2);
/// Extra wait after the ring empties so the device buffer plays out
const DRAIN_TAIL: Duration = Duration::from_millis(150);

pub struct DeviceSink {
    producer: Producer<f32>,
    capacity: usize,
    /// Kept alive for the duration of playback
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: u16,
}

impl DeviceSink {
    /// Open the default output device at `sample_rate`.
    ///
    /// The ring holds half a second of audio.
    pub fn open(sample_rate: u32) -> Result<Self, SinkError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SinkError::NoDevice)?;
        let default_config = device.default_output_config()?;

        let channels = default_config.channels();
        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = (sample_rate / 2).max(1) as usize;
        let (producer, mut consumer) = RingBuffer::<f32>::new(capacity);
        let frame_len = channels.max(1) as usize;

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Underruns play as silence
                for frame in data.chunks_mut(frame_len) {
                    let sample = consumer.pop().unwrap_or(0.0);
                    frame.fill(sample);
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;
        stream.play()?;

        debug!(
            "Audio stream started: {} Hz, {} channel(s)",
            sample_rate, channels
        );

        Ok(Self {
            producer,
            capacity,
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples written but not yet played
    fn queued(&self) -> usize {
        self.capacity.saturating_sub(self.producer.slots())
    }
}

/// Copy as many leading samples as fit into the ring, returning the count
fn push(producer: &mut Producer<f32>, samples: &[f32]) -> usize {
    let n = producer.slots().min(samples.len());
    if n == 0 {
        return 0;
    }
    match producer.write_chunk_uninit(n) {
        Ok(chunk) => chunk.fill_from_iter(samples[..n].iter().copied()),
        Err(_) => 0,
    }
}

impl SampleSink for DeviceSink {
    fn write(&mut self, samples: &[f32]) -> Result<(), SinkError> {
        let mut rest = samples;
        let mut last_progress = Instant::now();

        while !rest.is_empty() {
            let written = push(&mut self.producer, rest);
            if written == 0 {
                if last_progress.elapsed() > STALL_TIMEOUT {
                    return Err(SinkError::Stalled);
                }
                thread::sleep(WRITE_BACKOFF);
                continue;
            }
            rest = &rest[written..];
            last_progress = Instant::now();
        }

        Ok(())
    }

    fn drain(&mut self) -> Result<(), SinkError> {
        let mut queued = self.queued();
        let mut last_progress = Instant::now();

        while queued > 0 {
            thread::sleep(WRITE_BACKOFF);
            let now_queued = self.queued();
            if now_queued < queued {
                last_progress = Instant::now();
            } else if last_progress.elapsed() > STALL_TIMEOUT {
                return Err(SinkError::Stalled);
            }
            queued = now_queued;
        }

        thread::sleep(DRAIN_TAIL);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_stops_at_ring_capacity() {
        let (mut producer, mut consumer) = RingBuffer::<f32>::new(4);
        let samples = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];

        assert_eq!(push(&mut producer, &samples), 4);
        // Full ring takes nothing and loses nothing
        assert_eq!(push(&mut producer, &samples[4..]), 0);

        assert_eq!(consumer.pop(), Ok(0.1));
        assert_eq!(consumer.pop(), Ok(0.2));
        assert_eq!(push(&mut producer, &samples[4..]), 2);

        let drained: Vec<f32> = std::iter::from_fn(|| consumer.pop().ok()).collect();
        assert_eq!(drained, vec![0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_push_empty_slice() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(4);
        assert_eq!(push(&mut producer, &[]), 0);
        assert!(consumer.is_empty());
    }
}
