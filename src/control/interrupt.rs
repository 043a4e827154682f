//! Turns an external interrupt (Ctrl-C) into a `stop` command.
//!
//! The signal handler only sets a flag; the player sees it on its next poll,
//! so playback ends through the normal stop path and the sink is drained.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use super::{Command, ControlChannel};

/// Control channel that reports `stop` once interrupted, and otherwise
/// forwards to the wrapped channel.
pub struct Interruptible<C> {
    inner: C,
    interrupted: Arc<AtomicBool>,
    logged: bool,
}

/// Signal-handler side, cheap to clone and `Send`
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    interrupted: Arc<AtomicBool>,
}

impl<C: ControlChannel> Interruptible<C> {
    pub fn new(inner: C) -> (Self, InterruptHandle) {
        let interrupted = Arc::new(AtomicBool::new(false));
        (
            Self {
                inner,
                interrupted: interrupted.clone(),
                logged: false,
            },
            InterruptHandle { interrupted },
        )
    }
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl<C: ControlChannel> ControlChannel for Interruptible<C> {
    fn poll(&mut self) -> Option<Command> {
        if self.interrupted.load(Ordering::SeqCst) {
            if !self.logged {
                info!("Interrupted, stopping playback");
                self.logged = true;
            }
            return Some(Command::Stop);
        }
        self.inner.poll()
    }

    fn publish_position(&mut self, block: usize) {
        self.inner.publish_position(block);
    }

    fn publish_total(&mut self, last_index: usize) {
        self.inner.publish_total(last_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::mailbox;

    #[test]
    fn test_forwards_until_interrupted() {
        let (mailbox, handle) = mailbox();
        let (mut control, interrupt) = Interruptible::new(mailbox);

        handle.send(Command::Pause);
        assert_eq!(control.poll(), Some(Command::Pause));
        assert_eq!(control.poll(), None);

        control.publish_total(9);
        control.publish_position(4);
        assert_eq!(handle.last_block(), Some(9));
        assert_eq!(handle.current_block(), Some(4));
        assert!(!interrupt.is_interrupted());
    }

    #[test]
    fn test_interrupt_wins_over_pending_command() {
        let (mailbox, handle) = mailbox();
        let (mut control, interrupt) = Interruptible::new(mailbox);

        handle.send(Command::Resume);
        interrupt.clone().interrupt();
        assert!(interrupt.is_interrupted());
        assert_eq!(control.poll(), Some(Command::Stop));
        assert_eq!(control.poll(), Some(Command::Stop));
        // The wrapped channel was never asked
        assert!(handle.is_pending());
    }
}
