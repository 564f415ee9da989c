//! Root-raised-cosine pulse shaping
//!
//! Builds the FIR kernel used to shape the upsampled I/Q impulse trains and
//! provides the linear convolution that applies it.
//!
//! **Impulse response** (t in symbol periods, α the roll-off):
//! - `t = 0`: `1 - α + 4α/π`
//! - `|4αt| = 1`: `(α/√2)·[(1+2/π)·sin(π/4α) + (1-2/π)·cos(π/4α)]`
//! - otherwise: `[sin(πt(1-α)) + 4αt·cos(πt(1+α))] / [πt·(1 - (4αt)²)]`
//!
//! Both special points are removable singularities of the general formula
//! and are matched with [`SINGULARITY_TOLERANCE`] rather than exact equality.
//!
//! The kernel is DC-normalized (taps sum to 1), so an isolated symbol keeps
//! its amplitude through the filter up to the sum of overlapping tails.

use std::f64::consts::{PI, SQRT_2};

use snafu::ensure;

use crate::constants::{MAX_KERNEL_TAPS, SINGULARITY_TOLERANCE};
use crate::error::{InvalidFilterParametersSnafu, SynthesisError};

/// DC-normalized RRC impulse response
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    taps: Vec<f64>,
    roll_off: f64,
    samples_per_symbol: usize,
    span_symbols: usize,
}

impl FilterKernel {
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Index of the tap at t = 0
    pub fn center(&self) -> usize {
        self.taps.len() / 2
    }

    pub fn roll_off(&self) -> f64 {
        self.roll_off
    }

    pub fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    pub fn span_symbols(&self) -> usize {
        self.span_symbols
    }

    /// Full linear convolution of `signal` with this kernel
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        convolve(signal, &self.taps)
    }
}

/// Un-normalized RRC impulse response at `t` symbol periods from center
///
/// # Example
/// ```
/// use bandform::pulse::rrc_tap;
///
/// assert_eq!(rrc_tap(0.0, 0.0), 1.0);
/// assert!(rrc_tap(0.25, 1.0).is_finite());
/// ```
pub fn rrc_tap(roll_off: f64, t: f64) -> f64 {
    if t.abs() < SINGULARITY_TOLERANCE {
        return 1.0 - roll_off + 4.0 * roll_off / PI;
    }

    let four_alpha_t = 4.0 * roll_off * t;
    if (four_alpha_t.abs() - 1.0).abs() < SINGULARITY_TOLERANCE {
        let arg = PI / (4.0 * roll_off);
        return (roll_off / SQRT_2)
            * ((1.0 + 2.0 / PI) * arg.sin() + (1.0 - 2.0 / PI) * arg.cos());
    }

    let pi_t = PI * t;
    let num = (pi_t * (1.0 - roll_off)).sin() + four_alpha_t * (pi_t * (1.0 + roll_off)).cos();
    let den = pi_t * (1.0 - four_alpha_t * four_alpha_t);
    num / den
}

/// Design an RRC kernel of `span_symbols * samples_per_symbol + 1` taps
///
/// # Arguments
/// * `roll_off` - Excess bandwidth α, must lie in [0, 1]
/// * `samples_per_symbol` - Upsampling factor, at least 1
/// * `span_symbols` - Kernel length in symbol periods, at least 1
///
/// The tap count must stay within [`MAX_KERNEL_TAPS`].
///
/// # Example
/// ```
/// use bandform::pulse;
///
/// let kernel = pulse::design(0.2, 24, 8)?;
/// assert_eq!(kernel.len(), 8 * 24 + 1);
/// assert!((kernel.taps().iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// # Ok::<(), bandform::SynthesisError>(())
/// ```
pub fn design(
    roll_off: f64,
    samples_per_symbol: usize,
    span_symbols: usize,
) -> Result<FilterKernel, SynthesisError> {
    ensure!(
        (0.0..=1.0).contains(&roll_off) && samples_per_symbol >= 1 && span_symbols >= 1,
        InvalidFilterParametersSnafu {
            roll_off,
            samples_per_symbol,
            span_symbols,
        }
    );

    let len = span_symbols
        .checked_mul(samples_per_symbol)
        .and_then(|n| n.checked_add(1))
        .filter(|&n| n <= MAX_KERNEL_TAPS);
    let Some(len) = len else {
        return InvalidFilterParametersSnafu {
            roll_off,
            samples_per_symbol,
            span_symbols,
        }
        .fail();
    };
    let mid = (len - 1) as f64 / 2.0;
    let sps = samples_per_symbol as f64;

    let mut taps: Vec<f64> = (0..len)
        .map(|n| rrc_tap(roll_off, (n as f64 - mid) / sps))
        .collect();

    let sum: f64 = taps.iter().sum();
    for tap in taps.iter_mut() {
        *tap /= sum;
    }

    Ok(FilterKernel {
        taps,
        roll_off,
        samples_per_symbol,
        span_symbols,
    })
}

/// Full (non-circular) linear convolution
///
/// Output has `signal.len() + kernel.len() - 1` samples, or none if either
/// input is empty.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let n = signal.len();
    let m = kernel.len();
    let mut out = vec![0.0f64; n + m - 1];

    for (i, acc) in out.iter_mut().enumerate() {
        let k_min = i.saturating_sub(n - 1);
        let k_max = i.min(m - 1);
        *acc = (k_min..=k_max).map(|k| kernel[k] * signal[i - k]).sum();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_finite(kernel: &FilterKernel) {
        assert!(
            kernel.taps().iter().all(|t| t.is_finite()),
            "non-finite tap for alpha={} sps={}",
            kernel.roll_off(),
            kernel.samples_per_symbol()
        );
    }

    fn tap_sum(kernel: &FilterKernel) -> f64 {
        kernel.taps().iter().sum()
    }

    #[test]
    fn kernel_length_is_span_times_sps_plus_one() {
        let kernel = design(0.35, 4, 8).unwrap();
        assert_eq!(kernel.len(), 33);
        assert_eq!(kernel.center(), 16);
    }

    #[test]
    fn kernel_is_symmetric() {
        let kernel = design(0.2, 24, 8).unwrap();
        let taps = kernel.taps();
        let len = taps.len();
        for i in 0..len / 2 {
            assert!(
                (taps[i] - taps[len - 1 - i]).abs() < 1e-12,
                "asymmetric at {}: {} vs {}",
                i,
                taps[i],
                taps[len - 1 - i]
            );
        }
    }

    #[test]
    fn kernel_sums_to_one_across_roll_off() {
        for step in 0..=20 {
            let alpha = step as f64 / 20.0;
            for sps in [2, 3, 4, 8, 24] {
                let kernel = design(alpha, sps, 8).unwrap();
                assert_finite(&kernel);
                assert!((tap_sum(&kernel) - 1.0).abs() < 1e-9, "alpha={} sps={}", alpha, sps);
            }
        }
    }

    #[test]
    fn singular_points_hit_exactly_stay_finite() {
        // |4αt| = 1 lands on a tap: α=0.25 at t=±1, α=0.5 at t=±0.5, α=1 at t=±0.25
        for (alpha, sps) in [(0.25, 2), (0.25, 7), (0.5, 2), (0.5, 10), (1.0, 4), (1.0, 8)] {
            let kernel = design(alpha, sps, 8).unwrap();
            assert_finite(&kernel);
            assert!((tap_sum(&kernel) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn singular_branch_is_continuous_with_general_formula() {
        let alpha = 0.25;
        let exact = rrc_tap(alpha, 1.0);
        let near = rrc_tap(alpha, 1.0 + 1e-5);
        assert!((exact - near).abs() < 1e-4, "{} vs {}", exact, near);
    }

    #[test]
    fn center_tap_formula() {
        assert_eq!(rrc_tap(0.0, 0.0), 1.0);
        let alpha = 0.5;
        assert!((rrc_tap(alpha, 0.0) - (1.0 - alpha + 4.0 * alpha / PI)).abs() < 1e-15);
    }

    #[test]
    fn zero_roll_off_is_sinc_with_nyquist_zeros() {
        let sps = 8;
        let kernel = design(0.0, sps, 8).unwrap();
        let taps = kernel.taps();
        let c = kernel.center();
        for k in 1..=4 {
            assert!(taps[c + k * sps].abs() < 1e-12);
            assert!(taps[c - k * sps].abs() < 1e-12);
        }
        // center tap is the largest
        assert!(taps.iter().all(|&t| t <= taps[c]));
    }

    #[test]
    fn full_roll_off_is_finite() {
        for sps in 1..=16 {
            assert_finite(&design(1.0, sps, 8).unwrap());
        }
    }

    #[test]
    fn rejects_out_of_domain_parameters() {
        for (alpha, sps, span) in [(-0.1, 4, 8), (1.01, 4, 8), (f64::NAN, 4, 8), (0.2, 0, 8), (0.2, 4, 0)] {
            assert!(
                matches!(design(alpha, sps, span), Err(SynthesisError::InvalidFilterParameters { .. })),
                "alpha={} sps={} span={}",
                alpha,
                sps,
                span
            );
        }
    }

    #[test]
    fn rejects_oversized_kernels() {
        for (sps, span) in [(usize::MAX / 4, 8), (usize::MAX, 1), (MAX_KERNEL_TAPS, 8)] {
            assert!(
                matches!(design(0.2, sps, span), Err(SynthesisError::InvalidFilterParameters { .. })),
                "sps={} span={}",
                sps,
                span
            );
        }
        // the largest display kernel (1 baud at 48 kHz) is still accepted
        assert_eq!(design(0.2, 48_000, 8).unwrap().len(), 384_001);
    }

    #[test]
    fn single_sample_per_symbol_is_allowed() {
        let kernel = design(0.3, 1, 8).unwrap();
        assert_eq!(kernel.len(), 9);
        assert_finite(&kernel);
    }

    #[test]
    fn convolve_output_length() {
        let out = convolve(&[1.0, 2.0, 3.0], &[1.0, 1.0]);
        assert_eq!(out, vec![1.0, 3.0, 5.0, 3.0]);
    }

    #[test]
    fn convolve_with_impulse_reproduces_kernel() {
        let kernel = [0.25, 0.5, 0.25];
        let out = convolve(&[0.0, 1.0, 0.0, 0.0], &kernel);
        assert_eq!(out, vec![0.0, 0.25, 0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn convolve_empty_inputs() {
        assert!(convolve(&[], &[1.0]).is_empty());
        assert!(convolve(&[1.0], &[]).is_empty());
    }

    #[test]
    fn apply_matches_convolve() {
        let kernel = design(0.5, 4, 4).unwrap();
        let signal = [1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0];
        assert_eq!(kernel.apply(&signal), convolve(&signal, kernel.taps()));
    }
}
