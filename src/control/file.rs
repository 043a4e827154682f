//! File-based control channel.
//!
//! Three files in a shared directory (the system temp dir by default):
//!
//! - `tzx_control.txt`   written by the controller, deleted by the player on read
//! - `current_block.txt` rewritten by the player before every block
//! - `total_blocks.txt`  written once at start with the last block index
//!
//! Nothing is locked. A write can race a read; a missed command is simply
//! seen on the next poll, and progress is advisory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Command, ControlChannel};

pub const COMMAND_FILE: &str = "tzx_control.txt";
pub const CURRENT_BLOCK_FILE: &str = "current_block.txt";
pub const TOTAL_BLOCKS_FILE: &str = "total_blocks.txt";

/// Progress as last published by the player
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current_block: Option<usize>,
    pub last_block: Option<usize>,
}

/// Both ends of the file channel: the player polls and publishes, the
/// controller sends and reads progress.
#[derive(Debug, Clone)]
pub struct FileControl {
    command: PathBuf,
    current_block: PathBuf,
    total_blocks: PathBuf,
}

impl FileControl {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            command: dir.join(COMMAND_FILE),
            current_block: dir.join(CURRENT_BLOCK_FILE),
            total_blocks: dir.join(TOTAL_BLOCKS_FILE),
        }
    }

    /// Channel in the system temporary directory
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Remove progress left behind by an earlier session
    pub fn clear_progress(&self) {
        for path in [&self.current_block, &self.total_blocks] {
            remove_if_present(path);
        }
    }

    /// Leave a command for the player, replacing any unread one.
    ///
    /// Written to a side file and renamed so the player never reads a
    /// half-written command.
    pub fn send(&self, command: Command) -> io::Result<()> {
        let staging = self.command.with_extension("tmp");
        fs::write(&staging, command.to_string())?;
        fs::rename(&staging, &self.command)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current_block: read_index(&self.current_block),
            last_block: read_index(&self.total_blocks),
        }
    }

    fn publish(&self, path: &Path, value: usize) {
        if let Err(err) = fs::write(path, value.to_string()) {
            warn!("failed to write {}: {}", path.display(), err);
        }
    }
}

impl ControlChannel for FileControl {
    fn poll(&mut self) -> Option<Command> {
        let text = match fs::read_to_string(&self.command) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("failed to read {}: {}", self.command.display(), err);
                return None;
            }
        };
        remove_if_present(&self.command);

        let command = Command::parse(&text);
        if command.is_none() {
            debug!("ignoring unrecognised control command {:?}", text.trim());
        }
        command
    }

    fn publish_position(&mut self, block: usize) {
        self.publish(&self.current_block, block);
    }

    fn publish_total(&mut self, last_index: usize) {
        self.publish(&self.total_blocks, last_index);
    }
}

fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("failed to remove {}: {}", path.display(), err),
    }
}

fn read_index(path: &Path) -> Option<usize> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_consumes_command_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = FileControl::new(dir.path());

        assert_eq!(control.poll(), None);

        control.send(Command::Pause).unwrap();
        assert_eq!(control.poll(), Some(Command::Pause));
        assert_eq!(control.poll(), None);
        assert!(!dir.path().join(COMMAND_FILE).exists());
    }

    #[test]
    fn test_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = FileControl::new(dir.path());

        control.send(Command::Pause).unwrap();
        control.send(Command::Rewind(3)).unwrap();
        assert_eq!(control.poll(), Some(Command::Rewind(3)));
        assert_eq!(control.poll(), None);
    }

    #[test]
    fn test_external_writer_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = FileControl::new(dir.path());

        fs::write(dir.path().join(COMMAND_FILE), "rewind:bogus\r\n").unwrap();
        assert_eq!(control.poll(), Some(Command::Rewind(0)));

        // Garbage is consumed but not acted on
        fs::write(dir.path().join(COMMAND_FILE), "fast-forward").unwrap();
        assert_eq!(control.poll(), None);
        assert!(!dir.path().join(COMMAND_FILE).exists());
    }

    #[test]
    fn test_progress_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = FileControl::new(dir.path());

        assert_eq!(control.progress(), Progress::default());

        control.publish_total(41);
        control.publish_position(7);
        assert_eq!(
            fs::read_to_string(dir.path().join(CURRENT_BLOCK_FILE)).unwrap(),
            "7"
        );
        assert_eq!(
            control.progress(),
            Progress {
                current_block: Some(7),
                last_block: Some(41),
            }
        );

        control.clear_progress();
        assert_eq!(control.progress(), Progress::default());
    }

    #[test]
    fn test_publish_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = FileControl::new(dir.path().join("missing"));
        control.publish_position(1);
        control.publish_total(2);
        assert_eq!(control.poll(), None);
    }
}
