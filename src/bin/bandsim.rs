//! Band-formation simulator
//!
//! Synthesizes one display waveform, estimates its spectrum and writes the
//! result to disk:
//! - WAV file of the waveform (always)
//! - CSV of the spectrum, one `frequency,magnitude` row per bin (optional)
//! - SVG plot of the spectrum (optional)
//!
//! Usage:
//!   cargo run --bin bandsim -- [OPTIONS] <output.wav>
//!
//! Options:
//!   -m, --format <name>     BPSK, QPSK, 8QAM, 16QAM, 32QAM, 64QAM (default: QPSK)
//!   -r, --rate <baud>       Symbol rate (default: 2000)
//!   -a, --rolloff <alpha>   RRC roll-off in [0, 1] (default: 0.2)
//!   -c, --carrier <Hz>      Carrier frequency (default: 8000)
//!   -d, --density <n>       Clutter tones (default: 60)
//!   -s, --snr <dB>          Signal-to-noise ratio (default: 30)
//!   -b, --bins <n>          Spectrum bins (default: 1024)
//!       --seed <n>          Seed for a reproducible run
//!   -g, --gaussian          Gaussian instead of uniform noise
//!       --reference         Reference points for 8QAM/32QAM
//!       --csv <path>        Write the spectrum as CSV
//!       --plot <path>       Write the spectrum as an SVG plot
//!   -h, --help              Show this help message
//!
//! Examples:
//!   bandsim out.wav
//!   bandsim -m 16QAM -r 4000 -a 0.35 -d 0 --seed 7 --plot spectrum.svg out.wav

use std::fs::File;
use std::io::{BufWriter, Write};

use bandform::modulation::ModulationFormat;
use bandform::simulation::rms;
use bandform::{pipeline, tracing_init, wav, NoiseModel, NonSquareMapping, SpectrumEstimate, SynthesisParams, SPECTRUM_BINS};
use plotters::prelude::*;
use tracing::info;

struct SimConfig {
    params: SynthesisParams,
    bins: usize,
    seed: Option<u64>,
    output_path: String,
    csv_path: Option<String>,
    plot_path: Option<String>,
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = args
        .get(i)
        .ok_or_else(|| format!("Missing value for {}", flag))?;
    raw.parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, raw))
}

/// Anything starting with `-` is an option; a negative number here is a misplaced value
fn is_positional(arg: &str) -> bool {
    !arg.starts_with('-')
}

impl SimConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut params = SynthesisParams::default();
        let mut bins = SPECTRUM_BINS;
        let mut seed = None;
        let mut output_path = None;
        let mut csv_path = None;
        let mut plot_path = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-m" | "--format" => {
                    i += 1;
                    let label: String = parse_value(&args, i, "--format")?;
                    params.format = label
                        .parse::<ModulationFormat>()
                        .map_err(|e| e.to_string())?;
                }
                "-r" | "--rate" => {
                    i += 1;
                    params.symbol_rate = parse_value(&args, i, "--rate")?;
                }
                "-a" | "--rolloff" => {
                    i += 1;
                    params.roll_off = parse_value(&args, i, "--rolloff")?;
                }
                "-c" | "--carrier" => {
                    i += 1;
                    params.carrier = parse_value(&args, i, "--carrier")?;
                }
                "-d" | "--density" => {
                    i += 1;
                    params.tone_density = parse_value(&args, i, "--density")?;
                }
                "-s" | "--snr" => {
                    i += 1;
                    params.snr_db = parse_value(&args, i, "--snr")?;
                }
                "-b" | "--bins" => {
                    i += 1;
                    bins = parse_value(&args, i, "--bins")?;
                }
                "--seed" => {
                    i += 1;
                    seed = Some(parse_value(&args, i, "--seed")?);
                }
                "-g" | "--gaussian" => {
                    params.noise_model = NoiseModel::Gaussian;
                }
                "--reference" => {
                    params.non_square = NonSquareMapping::Reference;
                }
                "--csv" => {
                    i += 1;
                    csv_path = Some(parse_value(&args, i, "--csv")?);
                }
                "--plot" => {
                    i += 1;
                    plot_path = Some(parse_value(&args, i, "--plot")?);
                }
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg if is_positional(arg) => {
                    if output_path.is_none() {
                        output_path = Some(arg.to_string());
                    } else {
                        return Err(format!("Unexpected argument: {}", arg));
                    }
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        let output_path = output_path.ok_or("Missing output file argument")?;

        Ok(SimConfig {
            params,
            bins,
            seed,
            output_path,
            csv_path,
            plot_path,
        })
    }
}

fn print_help(program: &str) {
    eprintln!("Band-formation simulator");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <output.wav>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -m, --format <name>     BPSK, QPSK, 8QAM, 16QAM, 32QAM, 64QAM (default: QPSK)");
    eprintln!("  -r, --rate <baud>       Symbol rate (default: 2000)");
    eprintln!("  -a, --rolloff <alpha>   RRC roll-off in [0, 1] (default: 0.2)");
    eprintln!("  -c, --carrier <Hz>      Carrier frequency (default: 8000)");
    eprintln!("  -d, --density <n>       Clutter tones (default: 60)");
    eprintln!("  -s, --snr <dB>          Signal-to-noise ratio (default: 30)");
    eprintln!("  -b, --bins <n>          Spectrum bins (default: 1024)");
    eprintln!("      --seed <n>          Seed for a reproducible run");
    eprintln!("  -g, --gaussian          Gaussian instead of uniform noise");
    eprintln!("      --reference         Reference points for 8QAM/32QAM");
    eprintln!("      --csv <path>        Write the spectrum as CSV");
    eprintln!("      --plot <path>       Write the spectrum as an SVG plot");
    eprintln!("  -h, --help              Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} out.wav", program);
    eprintln!("  {} -m 16QAM -r 4000 -a 0.35 -d 0 --seed 7 --plot spectrum.svg out.wav", program);
}

fn write_csv(path: &str, spectrum: &SpectrumEstimate) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    let mut out = BufWriter::new(file);
    let write_err = |e: std::io::Error| format!("Failed to write '{}': {}", path, e);

    writeln!(out, "frequency_hz,magnitude").map_err(write_err)?;
    for (b, m) in spectrum.bins().iter().enumerate() {
        writeln!(out, "{:.3},{:.6}", spectrum.bin_frequency(b), m).map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}

fn write_plot(path: &str, spectrum: &SpectrumEstimate, params: &SynthesisParams) -> Result<(), String> {
    let plot_err = |e: &dyn std::fmt::Display| format!("Failed to plot '{}': {}", path, e);
    let nyquist = spectrum.sample_rate() / 2.0;

    let root = SVGBackend::new(path, (1024, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(&e))?;

    let caption = format!(
        "{} at {} Bd, alpha {}, approx BW {:.0} Hz",
        params.format,
        params.symbol_rate,
        params.roll_off,
        params.occupied_bandwidth()
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..nyquist, 0f64..1.05f64)
        .map_err(|e| plot_err(&e))?;

    chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("Normalized magnitude")
        .draw()
        .map_err(|e| plot_err(&e))?;

    let points = spectrum
        .bins()
        .iter()
        .enumerate()
        .map(|(b, &m)| (spectrum.bin_frequency(b), m));
    chart
        .draw_series(LineSeries::new(points, &GREEN))
        .map_err(|e| plot_err(&e))?;

    // carrier marker
    chart
        .draw_series(LineSeries::new(
            vec![(params.carrier, 0.0), (params.carrier, 1.05)],
            &RED,
        ))
        .map_err(|e| plot_err(&e))?;

    root.present().map_err(|e| plot_err(&e))
}

fn main() -> Result<(), String> {
    tracing_init::init_tracing();
    let config = SimConfig::parse_args()?;
    let params = &config.params;

    println!("Band-formation Simulator");
    println!("========================");
    println!("Format:       {}", params.format);
    println!("Symbol rate:  {:.1} Bd", params.symbol_rate);
    println!("Roll-off:     {:.2}", params.roll_off);
    println!("Carrier:      {:.1} Hz", params.carrier);
    println!("Density:      {} tones", params.tone_density);
    println!("SNR:          {:.1} dB", params.snr_db);
    println!(
        "Seed:         {}",
        config.seed.map_or("none".to_string(), |s| s.to_string())
    );
    println!();

    let out = match config.seed {
        Some(seed) => pipeline::run_seeded(params, config.bins, seed),
        None => pipeline::run_unseeded(params, config.bins),
    }
    .map_err(|e| e.to_string())?;

    info!(samples = out.waveform.len(), bins = out.spectrum.len(), "pipeline finished");

    println!("Samples/symbol: {}", params.samples_per_symbol());
    println!("Symbols:        {}", params.symbol_count());
    println!("Approx BW:      {:.0} Hz", params.occupied_bandwidth());
    println!("RMS level:      {:.4}", rms(out.waveform.samples()));
    if let Some(peak) = out.spectrum.peak_bin() {
        println!(
            "Peak bin:       {} ({:.1} Hz)",
            peak,
            out.spectrum.bin_frequency(peak)
        );
    }
    println!(
        "-6 dB span:     {:.0} Hz",
        out.spectrum.occupied_span_hz(0.5)
    );

    wav::write_wav_file(&config.output_path, &out.waveform).map_err(|e| e.to_string())?;
    println!("  ✓ Waveform written to: {}", config.output_path);

    if let Some(path) = &config.csv_path {
        write_csv(path, &out.spectrum)?;
        println!("  ✓ Spectrum CSV written to: {}", path);
    }

    if let Some(path) = &config.plot_path {
        write_plot(path, &out.spectrum, params)?;
        println!("  ✓ Spectrum plot written to: {}", path);
    }

    Ok(())
}
