//! Signal synthesis and spectral analysis for the band-formation demo
//!
//! Builds a pulse-shaped, carrier-modulated display waveform from a
//! modulation format and a handful of dials, then estimates its magnitude
//! spectrum by direct evaluation.
//!
//! ```
//! use bandform::{pipeline, SynthesisParams, SPECTRUM_BINS};
//!
//! let params = SynthesisParams::default().with_tone_density(0);
//! let out = pipeline::run_seeded(&params, SPECTRUM_BINS, 42)?;
//! assert_eq!(out.waveform.len(), 4096);
//! assert_eq!(out.spectrum.len(), 1024);
//! # Ok::<(), bandform::SynthesisError>(())
//! ```

pub mod constants;
pub mod error;
pub mod modulation;
pub mod pipeline;
pub mod pulse;
pub mod simulation;
pub mod spectrum;
pub mod synthesize;
pub mod tracing_init;
pub mod wav;

pub use constants::{PREVIEW_BINS, SAMPLE_COUNT, SAMPLE_RATE, SPECTRUM_BINS};
pub use error::SynthesisError;
pub use modulation::{ModulationFormat, NonSquareMapping, SymbolStream};
pub use pipeline::{run, run_seeded, PipelineOutput};
pub use pulse::{design, FilterKernel};
pub use simulation::NoiseModel;
pub use spectrum::{analyze, analyze_samples, SpectrumEstimate};
pub use synthesize::{synthesize, SynthesisParams, Waveform};
