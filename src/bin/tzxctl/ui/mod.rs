//! TUI module for tzxctl
//!
//! Polls the player's progress files and turns key presses into control
//! commands.

mod state;
mod transport;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use tzxplay::control::FileControl;

pub use state::{Action, ControllerState};

use transport::{render_progress, render_transport};

/// How often the progress files are re-read
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

pub struct ControllerApp {
    control: FileControl,
    state: ControllerState,
    last_refresh: Option<Instant>,
    /// Send failure shown in the help bar
    error: Option<String>,
    should_quit: bool,
}

impl ControllerApp {
    pub fn new(control: FileControl) -> Self {
        Self {
            control,
            state: ControllerState::new(),
            last_refresh: None,
            error: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.refresh();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let action = self.state.handle_key(key.code);
                        self.apply(action);
                    }
                }
            }
        }

        Ok(())
    }

    fn refresh(&mut self) {
        let due = self
            .last_refresh
            .map_or(true, |at| at.elapsed() >= PROGRESS_INTERVAL);
        if due {
            self.state.update_progress(self.control.progress());
            self.last_refresh = Some(Instant::now());
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Send(command) => match self.control.send(command) {
                Ok(()) => self.error = None,
                Err(err) => self.error = Some(format!("failed to send {}: {}", command, err)),
            },
            Action::Quit => self.should_quit = true,
            Action::Nothing => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status
                Constraint::Length(3), // Progress
                Constraint::Min(0),
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_transport(frame, chunks[0], &self.state);
        render_progress(frame, chunks[1], &self.state);

        let help = match &self.error {
            Some(error) => Paragraph::new(format!(" {}", error)).style(Style::default().fg(Color::Red)),
            None => Paragraph::new(
                " [Space] Pause/Resume  [S] Stop  [←/→] Select  [C] Current  [R] Rewind  [Q] Quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(help, chunks[3]);
    }
}
