//! Direct-evaluation magnitude spectrum
//!
//! Evaluates the DTFT of the whole signal at `bins` frequencies spread over
//! [0, fs/2), with no windowing and no FFT. Cost is `bins * len` complex
//! rotations, which is fine for the fixed display sizes (4096 samples,
//! 1024 or 768 bins). Bin `b` sits at `b / bins * fs / 2`, so it lines up
//! with FFT bin `b` only when `len == 2 * bins`.

use std::f64::consts::PI;

use tracing::{instrument, trace};

use crate::synthesize::Waveform;

/// Peak-normalized magnitude spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumEstimate {
    bins: Vec<f64>,
    sample_rate: f64,
}

impl SpectrumEstimate {
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Spacing between bins in Hz
    pub fn resolution(&self) -> f64 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.sample_rate / 2.0 / self.bins.len() as f64
    }

    /// Frequency of bin `b` in Hz
    pub fn bin_frequency(&self, b: usize) -> f64 {
        b as f64 * self.resolution()
    }

    /// Index of the bin nearest to `freq`
    pub fn bin_for_frequency(&self, freq: f64) -> usize {
        let resolution = self.resolution();
        if resolution == 0.0 {
            return 0;
        }
        let b = (freq / resolution).round().max(0.0) as usize;
        b.min(self.bins.len().saturating_sub(1))
    }

    /// First bin holding the maximum magnitude
    pub fn peak_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (b, &m) in self.bins.iter().enumerate() {
            match best {
                Some((_, top)) if m <= top => {}
                _ => best = Some((b, m)),
            }
        }
        best.map(|(b, _)| b)
    }

    /// Indices of bins strictly above `threshold`
    pub fn bins_above(&self, threshold: f64) -> Vec<usize> {
        self.bins
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m > threshold)
            .map(|(b, _)| b)
            .collect()
    }

    /// Hz between the first and last bin above `threshold`, 0 if none
    pub fn occupied_span_hz(&self, threshold: f64) -> f64 {
        let above = self.bins_above(threshold);
        match (above.first(), above.last()) {
            (Some(&first), Some(&last)) => (last - first) as f64 * self.resolution(),
            _ => 0.0,
        }
    }

    /// Median magnitude, 0 when empty
    pub fn median(&self) -> f64 {
        median(&self.bins)
    }

    pub fn into_bins(self) -> Vec<f64> {
        self.bins
    }
}

/// Median of a slice of magnitudes, 0 when empty
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Magnitude spectrum of a waveform at `bins` frequencies
pub fn analyze(waveform: &Waveform, bins: usize) -> SpectrumEstimate {
    analyze_samples(waveform.samples(), waveform.sample_rate(), bins)
}

/// Magnitude spectrum of raw samples taken at `sample_rate`
///
/// # Example
/// ```
/// use bandform::spectrum::analyze_samples;
///
/// let fs = 48000.0;
/// let tone: Vec<f64> = (0..480)
///     .map(|n| (2.0 * std::f64::consts::PI * 6000.0 * n as f64 / fs).cos())
///     .collect();
/// let spectrum = analyze_samples(&tone, fs, 240);
/// assert_eq!(spectrum.peak_bin(), Some(60));
/// ```
#[instrument(level = "debug", skip(signal), fields(len = signal.len()))]
pub fn analyze_samples(signal: &[f64], sample_rate: f64, bins: usize) -> SpectrumEstimate {
    let fmax = sample_rate / 2.0;
    let mut mags = Vec::with_capacity(bins);

    for b in 0..bins {
        let freq = (b as f64 / bins as f64) * fmax;
        let mut re = 0.0;
        let mut im = 0.0;
        for (n, &v) in signal.iter().enumerate() {
            let angle = -2.0 * PI * freq * (n as f64 / sample_rate);
            re += v * angle.cos();
            im += v * angle.sin();
        }
        mags.push((re * re + im * im).sqrt());
    }

    let max = mags.iter().copied().fold(0.0f64, f64::max);
    let divisor = if max > 0.0 { max } else { 1.0 };
    trace!(max, "normalizing spectrum");
    for m in mags.iter_mut() {
        *m /= divisor;
    }

    SpectrumEstimate {
        bins: mags,
        sample_rate,
    }
}
