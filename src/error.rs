use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SynthesisError {
    /// Modulation label is not one of the recognized formats
    #[snafu(display("unsupported modulation format \"{label}\""))]
    UnsupportedFormat { label: String },

    /// Roll-off outside [0, 1], or a zero samples-per-symbol or span
    #[snafu(display(
        "invalid filter parameters: roll_off={roll_off}, samples_per_symbol={samples_per_symbol}, span_symbols={span_symbols}"
    ))]
    InvalidFilterParameters {
        roll_off: f64,
        samples_per_symbol: usize,
        span_symbols: usize,
    },

    /// Non-positive sample rate or empty output window
    #[snafu(display(
        "invalid synthesis parameters: sample_rate={sample_rate}, sample_count={sample_count}"
    ))]
    InvalidSynthesisParameters { sample_rate: f64, sample_count: usize },

    /// Gaussian noise deviation could not be formed from the requested SNR
    #[snafu(display("noise distribution could not be built"))]
    NoiseDistribution { source: rand_distr::NormalError },
}
