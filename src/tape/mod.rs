//! Tape images and their pulse streams.
//!
//! Parsing produces an immutable `Vec<Block>`; the encoder turns any block
//! into the nanosecond pulse durations the playback interpreter consumes.

pub mod block;
pub mod encoder;
pub mod tap;
pub mod tzx;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use block::{Block, BlockKind};
pub use encoder::{Encoder, Pulses};

#[derive(Debug, Error)]
pub enum TapeError {
    #[error("not a TZX image (missing \"ZXTape!\" signature)")]
    BadSignature,
    #[error("truncated {context} at offset {offset}: need {needed} bytes, {available} remain")]
    Truncated {
        context: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("unknown block ID {id:02X} at offset {offset} with no length field")]
    UnknownBlock { id: u8, offset: usize },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a tape image, TZX if it carries the signature and TAP otherwise
pub fn parse(data: &[u8]) -> Result<Vec<Block>, TapeError> {
    if data.starts_with(tzx::SIGNATURE) {
        Ok(tzx::parse(data)?.blocks)
    } else {
        tap::parse(data)
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<Vec<Block>, TapeError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| TapeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&data)
}
