//! Display and formula constants shared by the synthesis pipeline

/// Display sample rate in Hz
pub const SAMPLE_RATE: f64 = 48_000.0;

/// Samples synthesized per run (also the analysis window)
pub const SAMPLE_COUNT: usize = 4096;

/// Bins in the main spectrum view
pub const SPECTRUM_BINS: usize = 1024;

/// Bins in the lower-resolution preview
pub const PREVIEW_BINS: usize = 768;

/// RRC kernel span in symbol periods; the kernel has `SPAN_SYMBOLS * sps + 1` taps
pub const SPAN_SYMBOLS: usize = 8;

/// Lower bound on samples per symbol after integer division of the rates
pub const MIN_SAMPLES_PER_SYMBOL: usize = 2;

/// Lower bound on the number of symbols drawn per run
pub const MIN_SYMBOL_COUNT: usize = 64;

/// Absolute tolerance used to detect the RRC removable singularities
pub const SINGULARITY_TOLERANCE: f64 = 1e-8;

/// Total amplitude budget of the clutter tones, split as `TONE_AMPLITUDE / sqrt(density)`
pub const TONE_AMPLITUDE: f64 = 0.08;

/// Minimum half-width of the band the clutter tones are spread over
pub const MIN_TONE_HALF_BANDWIDTH_HZ: f64 = 200.0;

/// Signal power assumed for an all-zero signal when calibrating noise
pub const MIN_SIGNAL_POWER: f64 = 1e-9;

/// Upper bound on RRC kernel length; larger requests are rejected, not allocated
pub const MAX_KERNEL_TAPS: usize = 1 << 24;
