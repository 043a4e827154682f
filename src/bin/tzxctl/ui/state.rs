//! Controller state and key bindings, kept free of terminal types

use crossterm::event::KeyCode;

use tzxplay::control::{file::Progress, Command};

/// What a key press asks the UI loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Send(Command),
    Quit,
    Nothing,
}

#[derive(Debug, Default, Clone)]
pub struct ControllerState {
    /// Latest progress read from the player
    pub progress: Progress,
    /// Rewind target
    pub selected: usize,
    /// Pause state as far as this controller knows; the player does not report it
    pub paused: bool,
    /// Last command handed to the player
    pub last_sent: Option<Command>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_progress(&mut self, progress: Progress) {
        self.progress = progress;
        if let Some(last) = progress.last_block {
            self.selected = self.selected.min(last);
        }
    }

    /// No player has published a block count yet
    pub fn is_idle(&self) -> bool {
        self.progress.last_block.is_none()
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
                self.send(if self.paused {
                    Command::Pause
                } else {
                    Command::Resume
                })
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.paused = false;
                self.send(Command::Stop)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.send(Command::Rewind(self.selected)),
            KeyCode::Left => {
                self.selected = self.selected.saturating_sub(1);
                Action::Nothing
            }
            KeyCode::Right => {
                let last = self.progress.last_block.unwrap_or(usize::MAX);
                self.selected = (self.selected + 1).min(last);
                Action::Nothing
            }
            KeyCode::Home => {
                self.selected = 0;
                Action::Nothing
            }
            // Jump the selection to the block being played
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if let Some(current) = self.progress.current_block {
                    self.selected = current;
                }
                Action::Nothing
            }
            _ => Action::Nothing,
        }
    }

    fn send(&mut self, command: Command) -> Action {
        self.last_sent = Some(command);
        Action::Send(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_last(last: usize) -> ControllerState {
        let mut state = ControllerState::new();
        state.update_progress(Progress {
            current_block: Some(0),
            last_block: Some(last),
        });
        state
    }

    #[test]
    fn test_space_toggles_pause() {
        let mut state = state_with_last(5);
        assert_eq!(state.handle_key(KeyCode::Char(' ')), Action::Send(Command::Pause));
        assert!(state.paused);
        assert_eq!(state.handle_key(KeyCode::Char(' ')), Action::Send(Command::Resume));
        assert!(!state.paused);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut state = state_with_last(2);
        state.handle_key(KeyCode::Left);
        assert_eq!(state.selected, 0);
        for _ in 0..5 {
            state.handle_key(KeyCode::Right);
        }
        assert_eq!(state.selected, 2);

        // A shorter tape in a new session pulls the selection back
        state.update_progress(Progress {
            current_block: Some(0),
            last_block: Some(1),
        });
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn test_rewind_uses_selection_and_keeps_pause() {
        let mut state = state_with_last(9);
        state.handle_key(KeyCode::Char(' '));
        state.handle_key(KeyCode::Right);
        state.handle_key(KeyCode::Right);
        assert_eq!(state.handle_key(KeyCode::Char('r')), Action::Send(Command::Rewind(2)));
        assert!(state.paused);
        assert_eq!(state.last_sent, Some(Command::Rewind(2)));
    }

    #[test]
    fn test_select_current_block() {
        let mut state = state_with_last(9);
        state.update_progress(Progress {
            current_block: Some(7),
            last_block: Some(9),
        });
        assert_eq!(state.handle_key(KeyCode::Char('c')), Action::Nothing);
        assert_eq!(state.selected, 7);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = ControllerState::new();
        assert_eq!(state.handle_key(KeyCode::Char('q')), Action::Quit);
        assert_eq!(state.handle_key(KeyCode::Esc), Action::Quit);
        assert!(state.is_idle());
    }
}
