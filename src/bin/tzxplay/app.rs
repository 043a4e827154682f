//! TzxPlay - loads a tape image and streams it to the audio device

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::{error, info};

use tzxplay::{
    control::{FileControl, Interruptible},
    io::DeviceSink,
    playback::{PlaybackConfig, Player},
    tape::{self, Block},
};

pub struct TzxPlay {
    path: PathBuf,
    blocks: Vec<Block>,
    config: PlaybackConfig,
    control_dir: Option<PathBuf>,
}

impl TzxPlay {
    /// Load and parse the tape image
    pub fn open(path: &Path) -> EyreResult<Self> {
        let blocks =
            tape::load(path).wrap_err_with(|| format!("failed to load {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            blocks,
            config: PlaybackConfig::default(),
            control_dir: None,
        })
    }

    pub fn config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    /// Use control files in `dir` instead of the system temp dir
    pub fn control_dir(mut self, dir: PathBuf) -> Self {
        self.control_dir = Some(dir);
        self
    }

    pub fn list(&self) {
        for (index, block) in self.blocks.iter().enumerate() {
            println!("{:3} {:<30} {}", index, block.kind(), block);
        }
    }

    /// Play to the end, a stop command or a stop block.
    ///
    /// Errors during playback are logged, not returned; only setup failures
    /// (no audio device) make this fail. Ctrl-C stops playback the same way a
    /// `stop` command does.
    pub fn run(self) -> EyreResult<()> {
        let control = match &self.control_dir {
            Some(dir) => FileControl::new(dir),
            None => FileControl::in_temp_dir(),
        };
        control.clear_progress();

        // Ctrl-C becomes a stop so the loop exits normally and the sink drains
        let (control, interrupt) = Interruptible::new(control);
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.interrupt())
            .wrap_err("failed to install Ctrl-C handler")?;

        let mut sink = DeviceSink::open(self.config.sample_rate)
            .wrap_err("failed to open audio output")?;

        println!("=== tzxplay ===");
        println!("Tape: {}", self.path.display());
        println!("Blocks: {}", self.blocks.len());
        println!(
            "Sample rate: {} Hz ({} channel(s))",
            sink.sample_rate(),
            sink.channels()
        );
        println!();

        let player = Player::new(&self.blocks, self.config, control);
        match player.play_into(&mut sink) {
            Ok(samples) => info!(
                "{} samples written ({:.1}s)",
                samples,
                samples as f64 / sink.sample_rate() as f64
            ),
            Err(err) => error!("Playback aborted: {}", err),
        }
        if interrupt.is_interrupted() {
            println!("\nPlayback stopped.");
        }

        Ok(())
    }
}
