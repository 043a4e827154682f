//! Transport control side channel.
//!
//! A controller (usually another process) pauses, resumes, stops or rewinds a
//! running playback by leaving a single command for the player to pick up,
//! and follows progress through two advisory counters. There is no queue and
//! no acknowledgement: a command is consumed by the first poll that sees it
//! and a newer command replaces an unread one.

pub mod file;
pub mod interrupt;
pub mod mailbox;

use std::fmt;

pub use file::FileControl;
pub use interrupt::{InterruptHandle, Interruptible};
pub use mailbox::{mailbox, Mailbox, MailboxHandle};

/// A transport command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Stop,
    /// Restart from a block index, with tape time back at zero
    Rewind(usize),
}

impl Command {
    /// Parse the wire form: `pause`, `resume`, `stop` or `rewind:<block>`.
    ///
    /// A rewind whose target is missing or not a non-negative integer rewinds
    /// to block 0. Anything else is not a command.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        match text {
            "pause" => Some(Command::Pause),
            "resume" => Some(Command::Resume),
            "stop" => Some(Command::Stop),
            _ => {
                let rest = text.strip_prefix("rewind")?;
                let block = rest
                    .strip_prefix(':')
                    .and_then(|n| n.trim().parse().ok())
                    .unwrap_or(0);
                Some(Command::Rewind(block))
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pause => f.write_str("pause"),
            Command::Resume => f.write_str("resume"),
            Command::Stop => f.write_str("stop"),
            Command::Rewind(block) => write!(f, "rewind:{}", block),
        }
    }
}

/// Player side of a control channel.
///
/// `poll` is called once per block and once per pulse edge, so it must be
/// cheap when nothing is pending. Publishing is best effort and never fails.
pub trait ControlChannel {
    /// Take the pending command, if any
    fn poll(&mut self) -> Option<Command>;

    /// Block about to be processed (0-based)
    fn publish_position(&mut self, block: usize);

    /// Index of the last block, published once at start
    fn publish_total(&mut self, last_index: usize);
}

/// Playback without a controller
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControl;

impl ControlChannel for NoControl {
    fn poll(&mut self) -> Option<Command> {
        None
    }

    fn publish_position(&mut self, _block: usize) {}

    fn publish_total(&mut self, _last_index: usize) {}
}

impl<C: ControlChannel + ?Sized> ControlChannel for &mut C {
    fn poll(&mut self) -> Option<Command> {
        (**self).poll()
    }

    fn publish_position(&mut self, block: usize) {
        (**self).publish_position(block)
    }

    fn publish_total(&mut self, last_index: usize) {
        (**self).publish_total(last_index)
    }
}

/// Allow boxed channels to be chosen at runtime
impl ControlChannel for Box<dyn ControlChannel + Send> {
    fn poll(&mut self) -> Option<Command> {
        (**self).poll()
    }

    fn publish_position(&mut self, block: usize) {
        (**self).publish_position(block)
    }

    fn publish_total(&mut self, last_index: usize) {
        (**self).publish_total(last_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("pause"), Some(Command::Pause));
        assert_eq!(Command::parse("resume\n"), Some(Command::Resume));
        assert_eq!(Command::parse("  stop "), Some(Command::Stop));
        assert_eq!(Command::parse("rewind:12"), Some(Command::Rewind(12)));
    }

    #[test]
    fn test_malformed_rewind_goes_to_start() {
        assert_eq!(Command::parse("rewind"), Some(Command::Rewind(0)));
        assert_eq!(Command::parse("rewind:"), Some(Command::Rewind(0)));
        assert_eq!(Command::parse("rewind:abc"), Some(Command::Rewind(0)));
        assert_eq!(Command::parse("rewind:-3"), Some(Command::Rewind(0)));
    }

    #[test]
    fn test_unknown_text_is_ignored() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("play"), None);
        assert_eq!(Command::parse("PAUSE"), None);
    }

    #[test]
    fn test_display_round_trips() {
        for cmd in [
            Command::Pause,
            Command::Resume,
            Command::Stop,
            Command::Rewind(7),
        ] {
            assert_eq!(Command::parse(&cmd.to_string()), Some(cmd));
        }
    }
}
