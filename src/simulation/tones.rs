//! Narrow spectral tones spread across the occupied band
//!
//! Gives the spectrum view a "line-dense" look. The tones model display
//! clutter, not a physical impairment.

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::constants::TONE_AMPLITUDE;

/// `count` frequencies evenly spaced over `[center - half_bw, center + half_bw]`
///
/// Both band edges are included when `count > 1`.
pub fn tone_frequencies(center: f64, half_bw: f64, count: usize) -> Vec<f64> {
    let spacing = 2.0 * half_bw / count.saturating_sub(1).max(1) as f64;
    (0..count)
        .map(|k| center - half_bw + k as f64 * spacing)
        .collect()
}

/// Sum `density` random-phase sinusoids into `signal`
///
/// Each tone has amplitude `TONE_AMPLITUDE / sqrt(density)` and a phase drawn
/// uniformly from [0, 2π). Densities of 0 and 1 leave the signal untouched.
pub fn add_tone_clutter<R: Rng + ?Sized>(
    signal: &mut [f64],
    sample_rate: f64,
    center: f64,
    half_bw: f64,
    density: usize,
    rng: &mut R,
) {
    if density <= 1 {
        return;
    }

    let amplitude = TONE_AMPLITUDE / (density as f64).sqrt();
    for freq in tone_frequencies(center, half_bw, density) {
        let phase = rng.random::<f64>() * TAU;
        let step = 2.0 * PI * freq / sample_rate;
        for (n, sample) in signal.iter_mut().enumerate() {
            *sample += amplitude * (step * n as f64 + phase).sin();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn frequencies_cover_band_edges() {
        let freqs = tone_frequencies(8000.0, 1200.0, 5);
        assert_eq!(freqs, vec![6800.0, 7400.0, 8000.0, 8600.0, 9200.0]);
    }

    #[test]
    fn single_tone_sits_at_lower_edge() {
        assert_eq!(tone_frequencies(1000.0, 200.0, 1), vec![800.0]);
        assert!(tone_frequencies(1000.0, 200.0, 0).is_empty());
    }

    #[test]
    fn low_density_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut signal = vec![0.0f64; 128];
        add_tone_clutter(&mut signal, 48000.0, 8000.0, 1200.0, 1, &mut rng);
        assert!(signal.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn clutter_amplitude_is_bounded() {
        let mut rng = StdRng::seed_from_u64(22);
        let density = 16;
        let mut signal = vec![0.0f64; 4096];
        add_tone_clutter(&mut signal, 48000.0, 8000.0, 1200.0, density, &mut rng);
        let bound = TONE_AMPLITUDE * (density as f64).sqrt();
        assert!(signal.iter().all(|s| s.abs() <= bound + 1e-12));
        assert!(signal.iter().any(|&s| s != 0.0));
    }
}
