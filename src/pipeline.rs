//! One full pass: symbols, pulse shaping, carrier, impairments, spectrum
//!
//! Each call owns its buffers and its random source, so runs never share
//! state. A caller that re-runs on every dial change simply keeps the most
//! recent output.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::SynthesisError;
use crate::spectrum::{analyze, SpectrumEstimate};
use crate::synthesize::{synthesize, SynthesisParams, Waveform};

/// Waveform and its spectrum from one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub waveform: Waveform,
    pub spectrum: SpectrumEstimate,
}

/// Synthesize a waveform and estimate its spectrum at `bins` frequencies
pub fn run<R: Rng + ?Sized>(
    params: &SynthesisParams,
    bins: usize,
    rng: &mut R,
) -> Result<PipelineOutput, SynthesisError> {
    let waveform = synthesize(params, rng)?;
    let spectrum = analyze(&waveform, bins);
    debug!(peak_bin = ?spectrum.peak_bin(), "pipeline run complete");
    Ok(PipelineOutput { waveform, spectrum })
}

/// [`run`] with a [`StdRng`] seeded from `seed`; identical seeds give identical output
pub fn run_seeded(
    params: &SynthesisParams,
    bins: usize,
    seed: u64,
) -> Result<PipelineOutput, SynthesisError> {
    let mut rng = StdRng::seed_from_u64(seed);
    run(params, bins, &mut rng)
}

/// [`run`] with the thread-local generator; every call differs
pub fn run_unseeded(params: &SynthesisParams, bins: usize) -> Result<PipelineOutput, SynthesisError> {
    let mut rng = rand::rng();
    run(params, bins, &mut rng)
}
