//! In-process control channel.
//!
//! Same contract as the file channel (one pending command, last write wins,
//! consumed once) without touching the filesystem. Used when the controller
//! lives in the same process, and by tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{Command, ControlChannel};

const UNPUBLISHED: usize = usize::MAX;

struct Shared {
    command: Mutex<Option<Command>>,
    current_block: AtomicUsize,
    last_block: AtomicUsize,
}

/// Player end
pub struct Mailbox {
    shared: Arc<Shared>,
}

/// Controller end, cheap to clone and `Send`
#[derive(Clone)]
pub struct MailboxHandle {
    shared: Arc<Shared>,
}

/// Create a connected mailbox and handle
pub fn mailbox() -> (Mailbox, MailboxHandle) {
    let shared = Arc::new(Shared {
        command: Mutex::new(None),
        current_block: AtomicUsize::new(UNPUBLISHED),
        last_block: AtomicUsize::new(UNPUBLISHED),
    });
    (
        Mailbox {
            shared: shared.clone(),
        },
        MailboxHandle { shared },
    )
}

impl Shared {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Command>> {
        self.command.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MailboxHandle {
    /// Leave a command, replacing any unread one
    pub fn send(&self, command: Command) {
        *self.shared.slot() = Some(command);
    }

    /// Whether a sent command has not been picked up yet
    pub fn is_pending(&self) -> bool {
        self.shared.slot().is_some()
    }

    pub fn current_block(&self) -> Option<usize> {
        published(&self.shared.current_block)
    }

    pub fn last_block(&self) -> Option<usize> {
        published(&self.shared.last_block)
    }
}

impl ControlChannel for Mailbox {
    fn poll(&mut self) -> Option<Command> {
        self.shared.slot().take()
    }

    fn publish_position(&mut self, block: usize) {
        self.shared.current_block.store(block, Ordering::Relaxed);
    }

    fn publish_total(&mut self, last_index: usize) {
        self.shared.last_block.store(last_index, Ordering::Relaxed);
    }
}

fn published(value: &AtomicUsize) -> Option<usize> {
    match value.load(Ordering::Relaxed) {
        UNPUBLISHED => None,
        v => Some(v),
    }
}
