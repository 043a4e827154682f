//! tzxctl - terminal remote for a running tzxplay session
//!
//! Run with: cargo run --bin tzxctl
//!
//! Talks to the player through the control files only, so it can be started
//! and quit at any time without affecting playback.

mod ui;

use std::path::PathBuf;

use clap::Parser;

use tzxplay::control::FileControl;
use ui::ControllerApp;

#[derive(Parser)]
#[command(name = "tzxctl")]
#[command(author, version, about = "Pause, resume, stop or rewind a running tzxplay")]
struct Args {
    /// Directory of the control files (system temp dir by default)
    #[arg(long)]
    control_dir: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let control = match args.control_dir {
        Some(dir) => FileControl::new(dir),
        None => FileControl::in_temp_dir(),
    };

    let mut terminal = ratatui::init();
    let result = ControllerApp::new(control).run(&mut terminal);
    ratatui::restore();
    result
}
