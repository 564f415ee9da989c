//! WAV export of synthesized waveforms
//!
//! **WAV Format**:
//! - 16-bit PCM (signed integer samples)
//! - Mono channel
//! - Sample rate taken from the waveform (48 kHz for display runs)
//!
//! Display waveforms are not bounded to [-1, 1] (the clutter tones and noise
//! ride on top of the shaped carrier), so samples are peak-normalized to
//! [`HEADROOM`] before conversion.

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use snafu::{ResultExt, Snafu};

use crate::synthesize::Waveform;

/// Peak level after normalization
pub const HEADROOM: f64 = 0.9;

#[derive(Debug, Snafu)]
pub enum WavExportError {
    /// Sample rate cannot be stored in a WAV header
    #[snafu(display("sample rate {sample_rate} Hz is not a valid WAV rate"))]
    InvalidSampleRate { sample_rate: f64 },

    /// Output file could not be created
    #[snafu(display("failed to create {}", path.display()))]
    CreateFile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    /// Encoder error
    #[snafu(display("failed to write WAV data"))]
    Encode { source: hound::Error },
}

fn wav_spec(sample_rate: f64) -> Result<WavSpec, WavExportError> {
    let rounded = sample_rate.round();
    if !(rounded >= 1.0 && rounded <= u32::MAX as f64) {
        return Err(WavExportError::InvalidSampleRate { sample_rate });
    }
    Ok(WavSpec {
        channels: 1,
        sample_rate: rounded as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    })
}

/// Scale factor that brings the largest magnitude to [`HEADROOM`]
fn peak_gain(samples: &[f64]) -> f64 {
    let peak = samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        HEADROOM / peak
    } else {
        1.0
    }
}

/// Convert a sample in [-1.0, 1.0] to 16-bit PCM, clamping outside values
fn to_i16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f64) as i16
}

fn write_samples<W: Write + Seek>(writer: W, waveform: &Waveform) -> Result<(), WavExportError> {
    let spec = wav_spec(waveform.sample_rate())?;
    let mut wav = WavWriter::new(writer, spec).context(EncodeSnafu)?;
    let gain = peak_gain(waveform.samples());
    for &sample in waveform.samples() {
        wav.write_sample(to_i16(sample * gain)).context(EncodeSnafu)?;
    }
    wav.finalize().context(EncodeSnafu)
}

/// Encode a waveform as a complete WAV file in memory
///
/// # Example
/// ```
/// use bandform::synthesize::Waveform;
/// use bandform::wav;
///
/// let waveform = Waveform::new(vec![0.0; 480], 48000.0);
/// let bytes = wav::generate_wav_bytes(&waveform)?;
/// assert_eq!(&bytes[0..4], b"RIFF");
/// # Ok::<(), wav::WavExportError>(())
/// ```
pub fn generate_wav_bytes(waveform: &Waveform) -> Result<Vec<u8>, WavExportError> {
    let mut bytes = Vec::new();
    write_samples(Cursor::new(&mut bytes), waveform)?;
    Ok(bytes)
}

/// Write a waveform to a WAV file at `path`
pub fn write_wav_file<P: AsRef<Path>>(path: P, waveform: &Waveform) -> Result<(), WavExportError> {
    let path = path.as_ref();
    let file = File::create(path).context(CreateFileSnafu { path })?;
    write_samples(BufWriter::new(file), waveform)
}
