//! Waveform synthesis
//!
//! Turns a modulation format and the display dials into a real-valued
//! sampled signal.
//!
//! **Process**:
//! 1. Pick samples per symbol and a symbol count that covers the window
//! 2. Map random symbols (see [`crate::modulation`])
//! 3. Zero-stuff I and Q into impulse trains at `k * sps`
//! 4. Convolve each rail with the RRC kernel (full linear convolution)
//! 5. Cut a centered window of `sample_count` samples
//! 6. Upconvert: `I·cos(2πf_c t) − Q·sin(2πf_c t)`
//! 7. Optionally add narrow clutter tones across the occupied band
//! 8. Add noise calibrated to the requested SNR
//!
//! Random draws happen in that order (symbols, tone phases, noise), so a
//! seeded generator reproduces the waveform bit for bit.

use std::f64::consts::PI;

use rand::Rng;
use snafu::ensure;
use tracing::{debug, instrument, trace};

use crate::constants::{
    MIN_SAMPLES_PER_SYMBOL, MIN_SYMBOL_COUNT, MIN_TONE_HALF_BANDWIDTH_HZ, SAMPLE_COUNT, SAMPLE_RATE,
    SPAN_SYMBOLS,
};
use crate::error::{InvalidSynthesisParametersSnafu, SynthesisError};
use crate::modulation::{map_with, ModulationFormat, NonSquareMapping, SymbolStream};
use crate::pulse;
use crate::simulation::{add_noise_for_snr, add_tone_clutter, NoiseModel};

/// Dials for one synthesis run
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    pub format: ModulationFormat,
    /// Symbol rate in baud
    ///
    /// Convolution is direct, so cost grows with the square of
    /// `sample_rate / symbol_rate`. Below about 100 Bd at 48 kHz a run takes
    /// seconds; at 1 Bd (sps 48000, 384001 taps) it is impractical.
    pub symbol_rate: f64,
    /// RRC roll-off α in [0, 1]
    pub roll_off: f64,
    /// Carrier frequency in Hz (meaningful below `sample_rate / 2`)
    pub carrier: f64,
    /// Number of clutter tones; 0 and 1 disable them
    pub tone_density: usize,
    /// Signal-to-noise ratio in dB
    pub snr_db: f64,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Output length in samples
    pub sample_count: usize,
    pub noise_model: NoiseModel,
    pub non_square: NonSquareMapping,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            format: ModulationFormat::Qpsk,
            symbol_rate: 2000.0,
            roll_off: 0.2,
            carrier: 8000.0,
            tone_density: 60,
            snr_db: 30.0,
            sample_rate: SAMPLE_RATE,
            sample_count: SAMPLE_COUNT,
            noise_model: NoiseModel::default(),
            non_square: NonSquareMapping::default(),
        }
    }
}

impl SynthesisParams {
    pub fn with_format(mut self, format: ModulationFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_symbol_rate(mut self, symbol_rate: f64) -> Self {
        self.symbol_rate = symbol_rate;
        self
    }

    pub fn with_roll_off(mut self, roll_off: f64) -> Self {
        self.roll_off = roll_off;
        self
    }

    pub fn with_carrier(mut self, carrier: f64) -> Self {
        self.carrier = carrier;
        self
    }

    pub fn with_tone_density(mut self, tone_density: usize) -> Self {
        self.tone_density = tone_density;
        self
    }

    pub fn with_snr_db(mut self, snr_db: f64) -> Self {
        self.snr_db = snr_db;
        self
    }

    pub fn with_noise_model(mut self, noise_model: NoiseModel) -> Self {
        self.noise_model = noise_model;
        self
    }

    pub fn with_non_square(mut self, non_square: NonSquareMapping) -> Self {
        self.non_square = non_square;
        self
    }

    /// Samples per symbol used for upsampling
    pub fn samples_per_symbol(&self) -> usize {
        samples_per_symbol(self.sample_rate, self.symbol_rate)
    }

    /// Number of symbols drawn per run
    pub fn symbol_count(&self) -> usize {
        symbol_count(self.sample_count, self.samples_per_symbol())
    }

    /// Approximate occupied bandwidth `Rs·(1+α)` in Hz
    pub fn occupied_bandwidth(&self) -> f64 {
        occupied_bandwidth(self.symbol_rate, self.roll_off)
    }
}

/// Real-valued sampled signal
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Waveform {
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Self {
        Self { samples, sample_rate }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// `max(2, floor(sample_rate / max(1, symbol_rate)))`
pub fn samples_per_symbol(sample_rate: f64, symbol_rate: f64) -> usize {
    let ratio = (sample_rate / symbol_rate.max(1.0)).floor();
    // a NaN ratio casts to 0 and is clamped below
    (ratio as usize).max(MIN_SAMPLES_PER_SYMBOL)
}

/// `max(64, ceil(sample_count / sps))`
pub fn symbol_count(sample_count: usize, samples_per_symbol: usize) -> usize {
    sample_count
        .div_ceil(samples_per_symbol.max(1))
        .max(MIN_SYMBOL_COUNT)
}

/// Approximate occupied bandwidth `Rs·(1+α)` in Hz
pub fn occupied_bandwidth(symbol_rate: f64, roll_off: f64) -> f64 {
    symbol_rate * (1.0 + roll_off)
}

/// Zero-stuffed I and Q impulse trains, one symbol every `sps` samples
///
/// # Panics
/// If `symbols.len() * samples_per_symbol` overflows `usize`;
/// [`synthesize`] rejects such parameters before calling this.
pub fn upsample(symbols: &SymbolStream, samples_per_symbol: usize) -> (Vec<f64>, Vec<f64>) {
    let len = symbols.len() * samples_per_symbol;
    let mut i_rail = vec![0.0f64; len];
    let mut q_rail = vec![0.0f64; len];
    for (k, symbol) in symbols.iter().enumerate() {
        i_rail[k * samples_per_symbol] = symbol.re;
        q_rail[k * samples_per_symbol] = symbol.im;
    }
    (i_rail, q_rail)
}

/// Start index of a window of `count` samples centered in `len` samples
///
/// Negative when the window is longer than the signal.
pub fn centered_start(len: usize, count: usize) -> i64 {
    (len as i64 - count as i64).div_euclid(2)
}

/// `count` samples of `signal` starting at `start`, zero outside the signal
pub fn window(signal: &[f64], start: i64, count: usize) -> Vec<f64> {
    (0..count as i64)
        .map(|n| {
            usize::try_from(start + n)
                .ok()
                .and_then(|idx| signal.get(idx).copied())
                .unwrap_or(0.0)
        })
        .collect()
}

/// Mix the I/Q pair onto a real carrier: `I·cos(ωt) − Q·sin(ωt)`
pub fn upconvert(i_rail: &[f64], q_rail: &[f64], carrier: f64, sample_rate: f64) -> Vec<f64> {
    i_rail
        .iter()
        .zip(q_rail.iter())
        .enumerate()
        .map(|(n, (&i, &q))| {
            let phase = 2.0 * PI * carrier * (n as f64 / sample_rate);
            i * phase.cos() - q * phase.sin()
        })
        .collect()
}

/// Synthesize one display waveform
///
/// # Arguments
/// * `params` - Format and dials for this run
/// * `rng` - Source for symbols, tone phases and noise
///
/// # Returns
/// Exactly `params.sample_count` samples at `params.sample_rate`
///
/// # Example
/// ```
/// use bandform::synthesize::{synthesize, SynthesisParams};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let waveform = synthesize(&SynthesisParams::default(), &mut rng)?;
/// assert_eq!(waveform.len(), 4096);
/// # Ok::<(), bandform::SynthesisError>(())
/// ```
#[instrument(level = "debug", skip(rng), fields(format = %params.format))]
pub fn synthesize<R: Rng + ?Sized>(
    params: &SynthesisParams,
    rng: &mut R,
) -> Result<Waveform, SynthesisError> {
    let sample_rate = params.sample_rate;
    let sample_count = params.sample_count;
    ensure!(
        sample_rate.is_finite() && sample_rate > 0.0 && sample_count >= 1,
        InvalidSynthesisParametersSnafu {
            sample_rate,
            sample_count,
        }
    );

    let sps = params.samples_per_symbol();
    let nsym = params.symbol_count();

    // Kernel first so a bad roll-off fails before any random draws
    let kernel = pulse::design(params.roll_off, sps, SPAN_SYMBOLS)?;
    debug!(sps, nsym, taps = kernel.len(), "designed pulse");

    ensure!(
        nsym.checked_mul(sps).is_some(),
        InvalidSynthesisParametersSnafu {
            sample_rate,
            sample_count,
        }
    );

    let symbols = map_with(params.format, params.non_square, nsym, rng);
    let (i_up, q_up) = upsample(&symbols, sps);

    let i_filtered = kernel.apply(&i_up);
    let q_filtered = kernel.apply(&q_up);

    let start = centered_start(i_filtered.len(), sample_count);
    trace!(filtered_len = i_filtered.len(), start, "windowing");
    let i_win = window(&i_filtered, start, sample_count);
    let q_win = window(&q_filtered, start, sample_count);

    let mut signal = upconvert(&i_win, &q_win, params.carrier, sample_rate);

    if params.tone_density > 1 {
        let half_bw = (params.occupied_bandwidth() / 2.0).max(MIN_TONE_HALF_BANDWIDTH_HZ);
        add_tone_clutter(
            &mut signal,
            sample_rate,
            params.carrier,
            half_bw,
            params.tone_density,
            rng,
        );
        debug!(density = params.tone_density, half_bw, "added tone clutter");
    }

    let noise_power = add_noise_for_snr(&mut signal, params.snr_db, params.noise_model, rng)?;
    debug!(snr_db = params.snr_db, noise_power, "added noise");

    Ok(Waveform::new(signal, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::mean_power;
    use num::Complex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sps_clamps_to_two() {
        assert_eq!(samples_per_symbol(48000.0, 24000.0), 2);
        assert_eq!(samples_per_symbol(48000.0, 30000.0), 2);
        assert_eq!(samples_per_symbol(48000.0, 2000.0), 24);
        assert_eq!(samples_per_symbol(48000.0, 0.0), 48000);
        assert_eq!(samples_per_symbol(48000.0, 7000.0), 6);
    }

    #[test]
    fn symbol_count_covers_window() {
        assert_eq!(symbol_count(4096, 24), 171);
        assert_eq!(symbol_count(4096, 2), 2048);
        assert_eq!(symbol_count(4096, 4800), 64);
    }

    #[test]
    fn occupied_bandwidth_formula() {
        assert!((occupied_bandwidth(2000.0, 0.2) - 2400.0).abs() < 1e-9);
        assert_eq!(SynthesisParams::default().occupied_bandwidth(), occupied_bandwidth(2000.0, 0.2));
    }

    #[test]
    fn upsample_is_an_impulse_train() {
        let mut rng = StdRng::seed_from_u64(31);
        let symbols = map_with(ModulationFormat::Qpsk, NonSquareMapping::default(), 4, &mut rng);
        let (i, q) = upsample(&symbols, 3);
        assert_eq!(i.len(), 12);
        for (n, (&iv, &qv)) in i.iter().zip(q.iter()).enumerate() {
            if n % 3 == 0 {
                assert_eq!(Complex::new(iv, qv), symbols[n / 3]);
            } else {
                assert_eq!((iv, qv), (0.0, 0.0));
            }
        }
    }

    #[test]
    fn window_is_centered_and_zero_padded() {
        let signal = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(centered_start(5, 3), 1);
        assert_eq!(window(&signal, 1, 3), vec![2.0, 3.0, 4.0]);
        // window longer than the signal
        assert_eq!(centered_start(3, 6), -2);
        assert_eq!(window(&signal[..3], -2, 6), vec![0.0, 0.0, 1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn upconvert_mixes_quadrature_rails() {
        let fs = 48000.0;
        let fc = 12000.0; // quarter of fs: cos/sin cycle through 1, 0, -1, 0
        let out = upconvert(&[1.0; 4], &[1.0; 4], fc, fs);
        let expected = [1.0, -1.0, -1.0, 1.0];
        for (o, e) in out.iter().zip(expected.iter()) {
            assert!((o - e).abs() < 1e-12, "{:?}", out);
        }
    }

    #[test]
    fn output_length_is_exact() {
        for rate in [1000.0, 2000.0, 7000.0, 24000.0, 48000.0] {
            for count in [1, 100, 4096] {
                let params = SynthesisParams {
                    symbol_rate: rate,
                    sample_count: count,
                    tone_density: 0,
                    ..SynthesisParams::default()
                };
                let mut rng = StdRng::seed_from_u64(32);
                let waveform = synthesize(&params, &mut rng).unwrap();
                assert_eq!(waveform.len(), count, "rate={} count={}", rate, count);
                assert!(waveform.samples().iter().all(|s| s.is_finite()));
            }
        }
    }

    #[test]
    fn rejects_invalid_rate_and_count() {
        let mut rng = StdRng::seed_from_u64(33);
        for (rate, count) in [
            (0.0, 4096),
            (-48000.0, 4096),
            (f64::NAN, 4096),
            (f64::INFINITY, 4096),
            (48000.0, 0),
        ] {
            let params = SynthesisParams {
                sample_rate: rate,
                sample_count: count,
                ..SynthesisParams::default()
            };
            assert!(matches!(
                synthesize(&params, &mut rng),
                Err(SynthesisError::InvalidSynthesisParameters { .. })
            ));
        }
    }

    #[test]
    fn huge_finite_rate_is_rejected_without_panicking() {
        // sps saturates, so the kernel cannot be built
        let mut rng = StdRng::seed_from_u64(38);
        let params = SynthesisParams {
            sample_rate: 1e300,
            ..SynthesisParams::default()
        };
        assert!(matches!(
            synthesize(&params, &mut rng),
            Err(SynthesisError::InvalidFilterParameters { .. })
        ));
    }

    #[test]
    fn bad_roll_off_propagates_filter_error() {
        let mut rng = StdRng::seed_from_u64(34);
        let params = SynthesisParams::default().with_roll_off(1.5);
        assert!(matches!(
            synthesize(&params, &mut rng),
            Err(SynthesisError::InvalidFilterParameters { .. })
        ));
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let params = SynthesisParams::default().with_format(ModulationFormat::Qam64);
        let a = synthesize(&params, &mut StdRng::seed_from_u64(35)).unwrap();
        let b = synthesize(&params, &mut StdRng::seed_from_u64(35)).unwrap();
        assert_eq!(a, b);
        let c = synthesize(&params, &mut StdRng::seed_from_u64(36)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn high_snr_noise_is_negligible() {
        let clean = SynthesisParams::default().with_tone_density(0).with_snr_db(200.0);
        let noisy = clean.clone().with_snr_db(60.0);
        let a = synthesize(&clean, &mut StdRng::seed_from_u64(37)).unwrap();
        let b = synthesize(&noisy, &mut StdRng::seed_from_u64(37)).unwrap();
        let diff: Vec<f64> = a.samples().iter().zip(b.samples()).map(|(x, y)| x - y).collect();
        assert!(mean_power(&diff) < 1e-5 * mean_power(a.samples()));
    }

    #[test]
    fn default_params_match_display_constants() {
        let params = SynthesisParams::default();
        assert_eq!(params.sample_rate, SAMPLE_RATE);
        assert_eq!(params.sample_count, SAMPLE_COUNT);
        assert_eq!(params.samples_per_symbol(), 24);
        assert_eq!(params.symbol_count(), 171);
    }
}
