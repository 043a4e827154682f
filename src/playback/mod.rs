//! Block playback interpreter.
//!
//! [`Player`] walks a block sequence and yields output audio one segment at a
//! time, on demand. Pulling is the only thing that drives it: there is no
//! thread and no internal buffering beyond a single block's pulse stream.
//!
//! # Example
//!
//! ```
//! use tzxplay::control::NoControl;
//! use tzxplay::playback::{PlaybackConfig, Player};
//! use tzxplay::tape::Block;
//!
//! let blocks = vec![Block::PureTone { pulse_len: 2168, count: 4 }];
//! let player = Player::new(&blocks, PlaybackConfig::default(), NoControl);
//! let samples: usize = player.map(|segment| segment.unwrap().len()).sum();
//! // 4 x 619.429us at 44.1kHz, rounded once at the end
//! assert_eq!(samples, 109);
//! ```

mod config;
mod player;

use thiserror::Error;

use crate::io::SinkError;

pub use config::PlaybackConfig;
pub use player::{LoopFrame, Player};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("jump at block {block} to non-existing block {target}")]
    JumpOutOfRange { block: usize, target: i64 },
}

/// Anything that can end a streaming session early
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
