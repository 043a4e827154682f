use std::fmt;

use super::encoder::{Encoder, Pulses};

/// One block of a tape image.
///
/// Data variants carry everything the encoder needs to regenerate their
/// pulses. Control-flow variants steer the playback interpreter; the
/// informational ones are kept so block indices line up with the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// ID 10: ROM-timed data with pilot and sync
    StandardSpeed { pause_ms: u16, data: Vec<u8> },
    /// ID 11: data with custom pilot, sync and bit timings
    TurboSpeed {
        pilot_pulse: u16,
        sync1: u16,
        sync2: u16,
        zero_pulse: u16,
        one_pulse: u16,
        pilot_count: u16,
        used_bits: u8,
        pause_ms: u16,
        data: Vec<u8>,
    },
    /// ID 12: `count` pulses of equal length
    PureTone { pulse_len: u16, count: u16 },
    /// ID 13: arbitrary pulse lengths
    PulseSequence { pulses: Vec<u16> },
    /// ID 14: data bits only, no pilot or sync
    PureData {
        zero_pulse: u16,
        one_pulse: u16,
        used_bits: u8,
        pause_ms: u16,
        data: Vec<u8>,
    },
    /// ID 20: silence, or "stop the tape" when `millis` is zero
    Pause { millis: u16 },
    /// ID 21
    GroupStart { name: String },
    /// ID 22
    GroupEnd,
    /// ID 23: relative jump, counted from this block
    JumpTo { relative: i16 },
    /// ID 24
    LoopStart { repeats: u16 },
    /// ID 25
    LoopEnd,
    /// ID 2A: stop the tape when emulating a 48K machine
    StopTape48k,
    /// ID 30
    Text { text: String },
    /// ID 31
    Message { seconds: u8, text: String },
    /// ID 32: (field id, value) pairs
    ArchiveInfo { entries: Vec<(u8, String)> },
    /// ID 33: (type, id, info) triples
    Hardware { entries: Vec<[u8; 3]> },
    /// ID 5A: marks where two images were concatenated
    Glue,
    /// Recognised but not rendered (direct recording, CSW, call/select, ...)
    Unsupported { id: u8 },
}

/// Block discriminant, used for tracing and matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    StandardSpeed,
    TurboSpeed,
    PureTone,
    PulseSequence,
    PureData,
    Pause,
    GroupStart,
    GroupEnd,
    JumpTo,
    LoopStart,
    LoopEnd,
    StopTape48k,
    Text,
    Message,
    ArchiveInfo,
    Hardware,
    Glue,
    Unsupported,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::StandardSpeed => "Standard Speed Data Block",
            BlockKind::TurboSpeed => "Turbo Speed Data Block",
            BlockKind::PureTone => "Pure Tone",
            BlockKind::PulseSequence => "Sequence of Pulses",
            BlockKind::PureData => "Pure Data Block",
            BlockKind::Pause => "Pause (silence) or Stop the Tape",
            BlockKind::GroupStart => "Group Start",
            BlockKind::GroupEnd => "Group End",
            BlockKind::JumpTo => "Jump to Block",
            BlockKind::LoopStart => "Loop Start",
            BlockKind::LoopEnd => "Loop End",
            BlockKind::StopTape48k => "Stop the Tape if in 48K Mode",
            BlockKind::Text => "Text Description",
            BlockKind::Message => "Message Block",
            BlockKind::ArchiveInfo => "Archive Info",
            BlockKind::Hardware => "Hardware Type",
            BlockKind::Glue => "Glue Block",
            BlockKind::Unsupported => "Unsupported Block",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::StandardSpeed { .. } => BlockKind::StandardSpeed,
            Block::TurboSpeed { .. } => BlockKind::TurboSpeed,
            Block::PureTone { .. } => BlockKind::PureTone,
            Block::PulseSequence { .. } => BlockKind::PulseSequence,
            Block::PureData { .. } => BlockKind::PureData,
            Block::Pause { .. } => BlockKind::Pause,
            Block::GroupStart { .. } => BlockKind::GroupStart,
            Block::GroupEnd => BlockKind::GroupEnd,
            Block::JumpTo { .. } => BlockKind::JumpTo,
            Block::LoopStart { .. } => BlockKind::LoopStart,
            Block::LoopEnd => BlockKind::LoopEnd,
            Block::StopTape48k => BlockKind::StopTape48k,
            Block::Text { .. } => BlockKind::Text,
            Block::Message { .. } => BlockKind::Message,
            Block::ArchiveInfo { .. } => BlockKind::ArchiveInfo,
            Block::Hardware { .. } => BlockKind::Hardware,
            Block::Glue => BlockKind::Glue,
            Block::Unsupported { .. } => BlockKind::Unsupported,
        }
    }

    /// A zero-length pause means "stop the tape"
    pub fn stops_tape(&self) -> bool {
        matches!(self, Block::Pause { millis: 0 })
    }

    /// Pulse durations this block produces, in nanoseconds.
    ///
    /// Non-audio blocks yield nothing.
    pub fn pulses<'a>(&'a self, encoder: &Encoder) -> Pulses<'a> {
        let enc = *encoder;
        match self {
            Block::StandardSpeed { pause_ms, data } => {
                // Headers (flag < 0x80) get the long pilot so the ROM has time to sync
                let pilot_count = match data.first() {
                    Some(&flag) if flag >= 0x80 => DATA_PILOT_COUNT,
                    _ => HEADER_PILOT_COUNT,
                };
                Box::new(
                    enc.tone(PILOT_PULSE, pilot_count)
                        .chain(enc.sequence([SYNC1_PULSE, SYNC2_PULSE]))
                        .chain(enc.data(ZERO_PULSE, ONE_PULSE, data, 8))
                        .chain(enc.pause(*pause_ms)),
                )
            }
            Block::TurboSpeed {
                pilot_pulse,
                sync1,
                sync2,
                zero_pulse,
                one_pulse,
                pilot_count,
                used_bits,
                pause_ms,
                data,
            } => Box::new(
                enc.tone(*pilot_pulse, *pilot_count)
                    .chain(enc.sequence([*sync1, *sync2]))
                    .chain(enc.data(*zero_pulse, *one_pulse, data, *used_bits))
                    .chain(enc.pause(*pause_ms)),
            ),
            Block::PureTone { pulse_len, count } => Box::new(enc.tone(*pulse_len, *count)),
            Block::PulseSequence { pulses } => Box::new(enc.sequence(pulses.iter().copied())),
            Block::PureData {
                zero_pulse,
                one_pulse,
                used_bits,
                pause_ms,
                data,
            } => Box::new(
                enc.data(*zero_pulse, *one_pulse, data, *used_bits)
                    .chain(enc.pause(*pause_ms)),
            ),
            Block::Pause { millis } => Box::new(enc.pause(*millis)),
            Block::GroupStart { .. }
            | Block::GroupEnd
            | Block::JumpTo { .. }
            | Block::LoopStart { .. }
            | Block::LoopEnd
            | Block::StopTape48k
            | Block::Text { .. }
            | Block::Message { .. }
            | Block::ArchiveInfo { .. }
            | Block::Hardware { .. }
            | Block::Glue
            | Block::Unsupported { .. } => Box::new(std::iter::empty()),
        }
    }
}

// ROM loader timings, in T-states
const PILOT_PULSE: u16 = 2168;
const SYNC1_PULSE: u16 = 667;
const SYNC2_PULSE: u16 = 735;
const ZERO_PULSE: u16 = 855;
const ONE_PULSE: u16 = 1710;
const HEADER_PILOT_COUNT: u16 = 8063;
const DATA_PILOT_COUNT: u16 = 3223;

/// Short human-readable summary, shown in playback traces.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::StandardSpeed { data, .. } => describe_rom_data(f, data),
            Block::TurboSpeed { data, .. } | Block::PureData { data, .. } => {
                write!(f, "{} bytes", data.len())
            }
            Block::PureTone { pulse_len, count } => {
                write!(f, "{} x {} T-states", count, pulse_len)
            }
            Block::PulseSequence { pulses } => write!(f, "{} pulses", pulses.len()),
            Block::Pause { millis: 0 } => f.write_str("stop the tape"),
            Block::Pause { millis } => write!(f, "{} ms", millis),
            Block::GroupStart { name } => f.write_str(name),
            Block::JumpTo { relative } => write!(f, "{:+}", relative),
            Block::LoopStart { repeats } => write!(f, "{} times", repeats),
            Block::Text { text } | Block::Message { text, .. } => f.write_str(text),
            Block::ArchiveInfo { entries } => {
                // Title is field 0
                match entries.iter().find(|(id, _)| *id == 0) {
                    Some((_, title)) => f.write_str(title),
                    None => write!(f, "{} entries", entries.len()),
                }
            }
            Block::Hardware { entries } => write!(f, "{} entries", entries.len()),
            Block::Unsupported { id } => write!(f, "ID {:02X}", id),
            Block::GroupEnd | Block::LoopEnd | Block::StopTape48k | Block::Glue => Ok(()),
        }
    }
}

fn describe_rom_data(f: &mut fmt::Formatter<'_>, data: &[u8]) -> fmt::Result {
    // 19-byte blocks with flag 0 are ROM headers: flag, type, name[10], ...
    if data.len() == 19 && data[0] == 0x00 {
        let kind = match data[1] {
            0 => "Program",
            1 => "Number array",
            2 => "Character array",
            3 => "Bytes",
            _ => "Header",
        };
        let name = String::from_utf8_lossy(&data[2..12]);
        return write!(f, "{}: {}", kind, name.trim_end());
    }
    write!(f, "Data: {} bytes", data.len())
}
