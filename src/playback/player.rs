use std::fmt;
use std::thread;

use tracing::{debug, info};

use super::{PlaybackConfig, PlaybackError, StreamError};
use crate::{
    control::{Command, ControlChannel},
    dsp::{SampleClock, Segment, WaveletCache},
    io::SampleSink,
    tape::{Block, Encoder, Pulses},
};

/*
Playback State Machine
======================

The player is a tiny interpreter: the block list is the program, `pc` is the
program counter, and each `next()` call runs until it has one segment of audio
to hand back.

    ┌────────────────────────────────────────────────────────────┐
    │                                                            │
    │  ┌────────────┐  data block   ┌────────────┐  pulse ┌─────┐ │
    │  │ Block step │ ────────────→ │ Edge step  │ ─────→ │ out │ │
    │  └────────────┘               └────────────┘        └─────┘ │
    │     ↑   │  loop / jump            │      │                 │
    │     │   └──── (no audio) ─┐       │      │ pulses exhausted│
    │     │                     ↓       │      │ or rewind       │
    │     └─────────────────────┴───────┴──────┘                 │
    │                                                            │
    └────────────────────────────────────────────────────────────┘

Both steps start by polling the control channel, so a stop, pause or rewind
lands within one pulse even in the middle of a long data block.

Block step:
  1. publish `pc`, poll control
  2. fetch the block, `pc += 1`
  3. control-flow blocks adjust `pc` / the loop frame and produce nothing;
     stop conditions end playback; anything else starts its pulse stream

Edge step:
  1. poll control
  2. take one pulse, toggle the level, advance the sample clock
  3. level changed since the last emitted segment → one wavelet;
     level unchanged (a pause) → silence in SILENCE_CHUNK pieces

Loops
-----

Only one loop frame exists. A LoopStart inside an open loop replaces the
outer frame instead of nesting, matching how these images have always been
played back. Images that really nest loops will repeat only the inner one.

Pausing
-------

While paused the player sleeps `pause_poll` between polls without taking a
pulse, so the pending pulse is played unchanged after `resume` and the tape
clock never sees the wall-clock time spent paused.
*/

/// Start and remaining repetitions of the open loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// Index of the first block after LoopStart
    pub start: usize,
    pub remaining: u16,
}

/// Pulse stream of the block being played
struct Edges<'a> {
    pulses: Pulses<'a>,
    level: bool,
    last_level: bool,
}

enum Step {
    Emit(Segment),
    Continue,
    Finished,
}

enum Flow {
    Proceed,
    Restart,
    Stop,
}

/// Lazy block interpreter yielding audio segments.
///
/// Borrows the block sequence and never modifies it. Ends after the last
/// block, on a `stop` command, or at a stop block the config honours. An
/// out-of-range jump is yielded once as an error, then the iterator ends.
pub struct Player<'a, C> {
    blocks: &'a [Block],
    config: PlaybackConfig,
    encoder: Encoder,
    control: C,
    wavelets: WaveletCache,
    clock: SampleClock,
    pc: usize,
    loop_frame: Option<LoopFrame>,
    paused: bool,
    edges: Option<Edges<'a>>,
    /// Samples of silence still owed from the last pulse
    pending_silence: usize,
    finished: bool,
}

impl<'a, C: ControlChannel> Player<'a, C> {
    /// Start a session; publishes the last block index right away
    pub fn new(blocks: &'a [Block], config: PlaybackConfig, mut control: C) -> Self {
        control.publish_total(blocks.len().saturating_sub(1));

        Self {
            blocks,
            encoder: Encoder::new(config.cpu_freq),
            wavelets: WaveletCache::new(config.shape),
            clock: SampleClock::new(config.sample_rate),
            config,
            control,
            pc: 0,
            loop_frame: None,
            paused: false,
            edges: None,
            pending_silence: 0,
            finished: false,
        }
    }

    /// Next block to be fetched
    pub fn position(&self) -> usize {
        self.pc
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn loop_frame(&self) -> Option<LoopFrame> {
        self.loop_frame
    }

    /// Tape time consumed since start or the last rewind
    pub fn elapsed_ns(&self) -> u64 {
        self.clock.real_time_ns()
    }

    /// Samples emitted since start or the last rewind
    pub fn samples_emitted(&self) -> u64 {
        self.clock.sample_time()
    }

    pub fn wavelets(&self) -> &WaveletCache {
        &self.wavelets
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Drive the whole session into a sink, returning the samples written.
    ///
    /// The sink is drained before returning, also when playback fails.
    pub fn play_into<S: SampleSink>(self, sink: &mut S) -> Result<u64, StreamError> {
        let mut written = 0u64;
        let mut result = Ok(());

        for segment in self {
            match segment {
                Ok(segment) => {
                    if let Err(err) = sink.write(&segment) {
                        result = Err(err.into());
                        break;
                    }
                    written += segment.len() as u64;
                }
                Err(err) => {
                    result = Err(err.into());
                    break;
                }
            }
        }

        sink.drain()?;
        result.map(|()| written)
    }

    fn apply_control(&mut self) -> Flow {
        match self.control.poll() {
            Some(Command::Pause) => {
                if !self.paused {
                    info!("Paused at block {}", self.pc);
                }
                self.paused = true;
            }
            Some(Command::Resume) => {
                if self.paused {
                    info!("Resumed at block {}", self.pc);
                }
                self.paused = false;
            }
            Some(Command::Stop) => {
                info!("Playback stopped at block {}", self.pc);
                return Flow::Stop;
            }
            Some(Command::Rewind(block)) => {
                self.rewind(block);
                return Flow::Restart;
            }
            None => {}
        }

        if self.paused {
            thread::sleep(self.config.pause_poll);
            return Flow::Restart;
        }
        Flow::Proceed
    }

    fn rewind(&mut self, block: usize) {
        info!("Rewinding to block {}", block);
        self.pc = block;
        self.clock.reset();
        self.edges = None;
        self.pending_silence = 0;
    }

    fn step_block(&mut self) -> Result<Step, PlaybackError> {
        if self.pc >= self.blocks.len() {
            info!("Playback finished successfully.");
            return Ok(Step::Finished);
        }

        self.control.publish_position(self.pc);
        match self.apply_control() {
            Flow::Proceed => {}
            Flow::Restart => return Ok(Step::Continue),
            Flow::Stop => return Ok(Step::Finished),
        }

        let blocks = self.blocks;
        let index = self.pc;
        let block = &blocks[index];
        self.trace(index, block);
        self.pc += 1;

        match block {
            Block::LoopStart { repeats } => {
                self.loop_frame = Some(LoopFrame {
                    start: self.pc,
                    remaining: *repeats,
                });
            }
            Block::LoopEnd => {
                if let Some(frame) = self.loop_frame.as_mut() {
                    frame.remaining = frame.remaining.saturating_sub(1);
                    if frame.remaining > 0 {
                        self.pc = frame.start;
                    } else {
                        self.loop_frame = None;
                    }
                }
            }
            Block::JumpTo { relative } => {
                let target = self.pc as i64 + *relative as i64 - 1;
                if target < 0 || target >= blocks.len() as i64 {
                    return Err(PlaybackError::JumpOutOfRange {
                        block: index,
                        target,
                    });
                }
                self.pc = target as usize;
            }
            Block::Pause { .. } if block.stops_tape() && self.config.stop_always => {
                info!("Tape stopped at block {}", index);
                return Ok(Step::Finished);
            }
            Block::StopTape48k if self.config.stop_48k => {
                info!("Tape stopped at block {} (48K mode)", index);
                return Ok(Step::Finished);
            }
            Block::StandardSpeed { .. }
            | Block::TurboSpeed { .. }
            | Block::PureTone { .. }
            | Block::PulseSequence { .. }
            | Block::PureData { .. }
            | Block::Pause { .. }
            | Block::StopTape48k
            | Block::GroupStart { .. }
            | Block::GroupEnd
            | Block::Text { .. }
            | Block::Message { .. }
            | Block::ArchiveInfo { .. }
            | Block::Hardware { .. }
            | Block::Glue
            | Block::Unsupported { .. } => {
                // Both levels start low for every block
                self.edges = Some(Edges {
                    pulses: block.pulses(&self.encoder),
                    level: false,
                    last_level: false,
                });
            }
        }

        Ok(Step::Continue)
    }

    fn step_edge(&mut self) -> Step {
        match self.apply_control() {
            Flow::Proceed => {}
            Flow::Restart => return Step::Continue,
            Flow::Stop => return Step::Finished,
        }

        let Some(edges) = self.edges.as_mut() else {
            return Step::Continue;
        };
        let Some(ns) = edges.pulses.next() else {
            self.edges = None;
            return Step::Continue;
        };

        edges.level = !edges.level;
        if ns <= 0 {
            return Step::Continue;
        }

        let length = self.clock.advance(ns as u64);
        if length == 0 {
            return Step::Continue;
        }

        let level = edges.level;
        let changed = level != edges.last_level;
        edges.last_level = level;

        if changed {
            Step::Emit(self.wavelets.segment(length, level))
        } else {
            self.pending_silence = length;
            Step::Continue
        }
    }

    fn trace(&self, index: usize, block: &Block) {
        let time = TapeTime(self.clock.real_time_ns());
        if self.config.verbose {
            info!("{} {:3} {:<30} {}", time, index, block.kind(), block);
        } else {
            debug!("{} {:3} {:<30} {}", time, index, block.kind(), block);
        }
    }
}

impl<'a, C: ControlChannel> Iterator for Player<'a, C> {
    type Item = Result<Segment, PlaybackError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.pending_silence > 0 {
                let segment = self.wavelets.silence(self.pending_silence);
                self.pending_silence -= segment.len();
                return Some(Ok(segment));
            }

            let step = if self.edges.is_some() {
                Ok(self.step_edge())
            } else {
                self.step_block()
            };

            match step {
                Ok(Step::Emit(segment)) => return Some(Ok(segment)),
                Ok(Step::Continue) => {}
                Ok(Step::Finished) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<'a, C: ControlChannel> std::iter::FusedIterator for Player<'a, C> {}

/// `mm:ss.mmm` tape position
struct TapeTime(u64);

impl fmt::Display for TapeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0 / 1_000_000;
        write!(
            f,
            "{:02}:{:02}.{:03}",
            millis / 60_000,
            millis / 1000 % 60,
            millis % 1000
        )
    }
}
