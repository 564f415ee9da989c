//! Signal impairments layered on top of the shaped carrier

pub mod noise;
pub mod tones;

pub use noise::{add_noise_for_snr, mean_power, noise_power_for_snr, rms, NoiseModel};
pub use tones::{add_tone_clutter, tone_frequencies};
