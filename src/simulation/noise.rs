//! Additive noise calibrated against the signal's own power
//!
//! Power is measured once on the clean signal (carrier plus any clutter
//! tones), then noise is scaled so the ratio matches the requested SNR in dB.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use snafu::ResultExt;

use crate::constants::MIN_SIGNAL_POWER;
use crate::error::{NoiseDistributionSnafu, SynthesisError};

/// Distribution of the additive noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseModel {
    /// `(u - 0.5) * sqrt(noise_power)` with `u` uniform on [0, 1).
    ///
    /// A crude stand-in for white noise: its actual power is
    /// `noise_power / 12`, so the realized SNR sits about 10.8 dB above the
    /// requested one.
    #[default]
    Uniform,
    /// Zero-mean Gaussian with variance `noise_power`
    Gaussian,
}

/// Mean-square power of a signal, 0 for an empty one
pub fn mean_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f64>() / signal.len() as f64
}

/// Compute RMS (Root Mean Square) amplitude of a signal
pub fn rms(signal: &[f64]) -> f64 {
    mean_power(signal).sqrt()
}

/// Noise power that puts `signal_power` at `snr_db` above it
pub fn noise_power_for_snr(signal_power: f64, snr_db: f64) -> f64 {
    signal_power / 10f64.powf(snr_db / 10.0)
}

/// Add noise calibrated against the current power of `signal`
///
/// The power is measured once, before any noise is added. An all-zero signal
/// is treated as having [`MIN_SIGNAL_POWER`].
///
/// # Returns
/// The noise power the samples were scaled for
pub fn add_noise_for_snr<R: Rng + ?Sized>(
    signal: &mut [f64],
    snr_db: f64,
    model: NoiseModel,
    rng: &mut R,
) -> Result<f64, SynthesisError> {
    let mut signal_power = mean_power(signal);
    if signal_power == 0.0 {
        signal_power = MIN_SIGNAL_POWER;
    }
    let noise_power = noise_power_for_snr(signal_power, snr_db);
    let scale = noise_power.sqrt();

    match model {
        NoiseModel::Uniform => {
            for sample in signal.iter_mut() {
                *sample += (rng.random::<f64>() - 0.5) * scale;
            }
        }
        NoiseModel::Gaussian => {
            let normal = Normal::new(0.0, scale).context(NoiseDistributionSnafu)?;
            for sample in signal.iter_mut() {
                *sample += normal.sample(rng);
            }
        }
    }

    Ok(noise_power)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn mean_power_of_unit_sine_is_half() {
        let n = 4800;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / 48000.0).sin())
            .collect();
        assert!((mean_power(&signal) - 0.5).abs() < 1e-9);
        assert!((rms(&signal) - 0.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn empty_signal_has_no_power() {
        assert_eq!(mean_power(&[]), 0.0);
    }

    #[test]
    fn snr_conversion() {
        assert!((noise_power_for_snr(1.0, 10.0) - 0.1).abs() < 1e-12);
        assert!((noise_power_for_snr(2.0, 0.0) - 2.0).abs() < 1e-12);
        assert!((noise_power_for_snr(1.0, -10.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_noise_is_bounded_by_half_deviation() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut signal = vec![1.0f64; 10_000];
        let noise_power = add_noise_for_snr(&mut signal, 0.0, NoiseModel::Uniform, &mut rng).unwrap();
        assert!((noise_power - 1.0).abs() < 1e-12);
        let bound = 0.5 * noise_power.sqrt();
        assert!(signal.iter().all(|&s| (s - 1.0).abs() <= bound));
        // variance of U[-0.5, 0.5] is 1/12
        let noise: Vec<f64> = signal.iter().map(|s| s - 1.0).collect();
        assert!((mean_power(&noise) - 1.0 / 12.0).abs() < 0.01);
    }

    #[test]
    fn gaussian_noise_has_requested_power() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut signal = vec![1.0f64; 50_000];
        add_noise_for_snr(&mut signal, 3.0, NoiseModel::Gaussian, &mut rng).unwrap();
        let noise: Vec<f64> = signal.iter().map(|s| s - 1.0).collect();
        let expected = noise_power_for_snr(1.0, 3.0);
        assert!((mean_power(&noise) - expected).abs() / expected < 0.05);
    }

    #[test]
    fn silent_signal_gets_floor_noise() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut signal = vec![0.0f64; 64];
        let noise_power = add_noise_for_snr(&mut signal, 0.0, NoiseModel::Uniform, &mut rng).unwrap();
        assert_eq!(noise_power, MIN_SIGNAL_POWER);
        assert!(signal.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn gaussian_rejects_non_finite_deviation() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut signal = vec![1.0f64; 8];
        let result = add_noise_for_snr(&mut signal, f64::NAN, NoiseModel::Gaussian, &mut rng);
        assert!(matches!(result, Err(SynthesisError::NoiseDistribution { .. })));
    }
}
