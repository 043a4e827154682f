//! Transport widgets - play state, block position and rewind target

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::ControllerState;

/// Render the status bar
pub fn render_transport(frame: &mut Frame, area: Rect, state: &ControllerState) {
    let block = Block::default().title(" tzxctl ").borders(Borders::ALL);

    let (symbol, label, color) = if state.is_idle() {
        ("■", "No player", Color::DarkGray)
    } else if state.paused {
        ("⏸", "Paused", Color::Yellow)
    } else {
        ("▶", "Playing", Color::Green)
    };

    let position = match (state.progress.current_block, state.progress.last_block) {
        (Some(current), Some(last)) => format!("Block {} / {}  ", current, last),
        (None, Some(last)) => format!("Block - / {}  ", last),
        _ => "Block - / -  ".to_string(),
    };

    let last_sent = state
        .last_sent
        .map(|command| format!("Sent: {}", command))
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", symbol, label),
            Style::default().fg(color),
        ),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            format!("Rewind to: {}  ", state.selected),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(last_sent, Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

/// Render block progress as a gauge
pub fn render_progress(frame: &mut Frame, area: Rect, state: &ControllerState) {
    let current = state.progress.current_block.unwrap_or(0);
    let last = state.progress.last_block.unwrap_or(0);
    let ratio = if last == 0 {
        0.0
    } else {
        (current as f64 / last as f64).clamp(0.0, 1.0)
    };

    let gauge = Gauge::default()
        .block(Block::default().title(" Tape ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0));
    frame.render_widget(gauge, area);
}
