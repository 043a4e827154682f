//! tzxplay - play a TZX/TAP tape image through the sound card
//!
//! Run with: cargo run --bin tzxplay -- game.tzx
//!
//! Control a running session from another terminal with `tzxctl`, or by
//! writing `pause`, `resume`, `stop` or `rewind:N` to `tzx_control.txt` in the
//! control directory.

mod app;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::TzxPlay;
use tzxplay::{dsp::EdgeShape, playback::PlaybackConfig, DEFAULT_CPU_FREQ, DEFAULT_SAMPLE_RATE};

#[derive(Parser)]
#[command(name = "tzxplay")]
#[command(author, version, about = "Play ZX Spectrum tape images as audio")]
struct Args {
    /// Tape image (.tzx or .tap)
    file: PathBuf,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    rate: u32,

    /// End playback at a "stop the tape" pause block
    #[arg(long)]
    stop_always: bool,

    /// End playback at a "stop the tape if in 48K mode" block
    #[arg(long = "stop48k")]
    stop_48k: bool,

    /// Half-sine edges instead of square ones
    #[arg(long)]
    sine: bool,

    /// CPU clock the tape timings are based on, in Hz
    #[arg(long, default_value_t = DEFAULT_CPU_FREQ)]
    cpu_freq: u32,

    /// Log every block as it starts
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Directory of the control files (system temp dir by default)
    #[arg(long)]
    control_dir: Option<PathBuf>,

    /// Print the block list and exit
    #[arg(long)]
    list: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let shape = if args.sine {
        EdgeShape::Shaped
    } else {
        EdgeShape::Flat
    };
    let config = PlaybackConfig::new()
        .sample_rate(args.rate)
        .stop_always(args.stop_always)
        .stop_48k(args.stop_48k)
        .shape(shape)
        .cpu_freq(args.cpu_freq)
        .verbose(args.verbose);

    let app = TzxPlay::open(&args.file)?.config(config);
    if args.list {
        app.list();
        return Ok(());
    }

    let app = match args.control_dir {
        Some(dir) => app.control_dir(dir),
        None => app,
    };
    app.run()
}
