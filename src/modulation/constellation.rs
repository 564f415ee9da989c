//! Reference constellations for display
//!
//! These are the ideal points the constellation view draws, scaled to
//! roughly [-1, 1] per axis. They are not energy-normalized; the mapper
//! rescales them when [`NonSquareMapping::Reference`](super::NonSquareMapping)
//! is selected.

use num::Complex;

use super::ModulationFormat;

const QPSK_LEVEL: f64 = 0.7;
const QAM8_INNER: f64 = 0.5;
const QAM8_OUTER: f64 = 1.2;

/// Corner cut-off for the 32QAM cross taken out of a 6x6 grid
const QAM32_CORNER: f64 = 0.8;

/// Square grid of `side * side` points spanning [-1, 1] on both axes
pub fn square_grid(side: usize) -> Vec<Complex<f64>> {
    if side < 2 {
        return vec![Complex::new(0.0, 0.0); side * side];
    }
    let offset = side as f64 - 1.0;
    let mut points = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            points.push(Complex::new(
                (2.0 * i as f64 - offset) / offset,
                (2.0 * j as f64 - offset) / offset,
            ));
        }
    }
    points
}

/// Ideal constellation points for `format`
pub fn reference_points(format: ModulationFormat) -> Vec<Complex<f64>> {
    match format {
        ModulationFormat::Bpsk => vec![Complex::new(-1.0, 0.0), Complex::new(1.0, 0.0)],
        ModulationFormat::Qpsk => vec![
            Complex::new(-QPSK_LEVEL, QPSK_LEVEL),
            Complex::new(QPSK_LEVEL, QPSK_LEVEL),
            Complex::new(QPSK_LEVEL, -QPSK_LEVEL),
            Complex::new(-QPSK_LEVEL, -QPSK_LEVEL),
        ],
        ModulationFormat::Qam8 => vec![
            Complex::new(QAM8_INNER, QAM8_INNER),
            Complex::new(-QAM8_INNER, QAM8_INNER),
            Complex::new(-QAM8_INNER, -QAM8_INNER),
            Complex::new(QAM8_INNER, -QAM8_INNER),
            Complex::new(QAM8_OUTER, 0.0),
            Complex::new(-QAM8_OUTER, 0.0),
            Complex::new(0.0, QAM8_OUTER),
            Complex::new(0.0, -QAM8_OUTER),
        ],
        ModulationFormat::Qam16 => square_grid(4),
        ModulationFormat::Qam32 => square_grid(6)
            .into_iter()
            .filter(|p| !(p.re.abs() > QAM32_CORNER && p.im.abs() > QAM32_CORNER))
            .collect(),
        ModulationFormat::Qam64 => square_grid(8),
    }
}

/// Raw line rate for a dual-polarization carrier at `baud` symbols per second
pub fn raw_capacity(baud: f64, format: ModulationFormat) -> f64 {
    baud * format.bits_per_symbol() as f64 * 2.0
}
