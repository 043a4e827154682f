mod clock;
mod wavelet;

pub use clock::bench_clock;
pub use wavelet::bench_wavelet;
