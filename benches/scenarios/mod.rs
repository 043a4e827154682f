mod playback;

pub use playback::bench_playback;
