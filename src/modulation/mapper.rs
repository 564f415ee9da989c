//! Random symbol generation with unit average energy

use std::f64::consts::{FRAC_1_SQRT_2, TAU};
use std::ops::Deref;

use num::Complex;
use rand::Rng;

use super::constellation::reference_points;
use super::{ModulationFormat, NonSquareMapping};
use crate::error::SynthesisError;

/// Complex symbols in transmission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolStream(Vec<Complex<f64>>);

impl SymbolStream {
    pub fn into_inner(self) -> Vec<Complex<f64>> {
        self.0
    }

    /// Mean of `i^2 + q^2` over the stream, 0 when empty
    pub fn average_energy(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().map(|s| s.norm_sqr()).sum::<f64>() / self.0.len() as f64
    }
}

impl Deref for SymbolStream {
    type Target = [Complex<f64>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Draw `count` symbols of `format`, using the placeholder for non-square orders
pub fn map<R: Rng + ?Sized>(format: ModulationFormat, count: usize, rng: &mut R) -> SymbolStream {
    map_with(format, NonSquareMapping::default(), count, rng)
}

/// Parse `label` and draw `count` symbols
pub fn map_label<R: Rng + ?Sized>(
    label: &str,
    count: usize,
    rng: &mut R,
) -> Result<SymbolStream, SynthesisError> {
    let format: ModulationFormat = label.parse()?;
    Ok(map(format, count, rng))
}

/// Draw `count` symbols of `format` with an explicit non-square strategy
pub fn map_with<R: Rng + ?Sized>(
    format: ModulationFormat,
    non_square: NonSquareMapping,
    count: usize,
    rng: &mut R,
) -> SymbolStream {
    let symbols = match format {
        ModulationFormat::Bpsk => (0..count)
            .map(|_| Complex::new(random_sign(rng), 0.0))
            .collect(),
        ModulationFormat::Qpsk => (0..count)
            .map(|_| {
                let i = random_sign(rng) * FRAC_1_SQRT_2;
                let q = random_sign(rng) * FRAC_1_SQRT_2;
                Complex::new(i, q)
            })
            .collect(),
        _ => match format.square_side() {
            Some(side) => square_qam(side, count, rng),
            None => match non_square {
                NonSquareMapping::CircularPlaceholder => circular_placeholder(format.order(), count, rng),
                NonSquareMapping::Reference => from_reference(format, count, rng),
            },
        },
    };

    SymbolStream(symbols)
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.random_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

/// PAM levels `-(side-1), ..., -1, 1, ..., side-1` divided by the grid RMS
fn normalized_levels(side: usize) -> Vec<f64> {
    let start = -(side as f64 - 1.0);
    let levels: Vec<f64> = (0..side).map(|r| start + 2.0 * r as f64).collect();

    // mean of a^2 + b^2 over every (a, b) pair of the grid
    let mut energy = 0.0;
    for a in &levels {
        for b in &levels {
            energy += a * a + b * b;
        }
    }
    energy /= (side * side) as f64;
    let norm = energy.sqrt();

    levels.into_iter().map(|level| level / norm).collect()
}

fn square_qam<R: Rng + ?Sized>(side: usize, count: usize, rng: &mut R) -> Vec<Complex<f64>> {
    let levels = normalized_levels(side);
    (0..count)
        .map(|_| {
            let i = levels[rng.random_range(0..levels.len())];
            let q = levels[rng.random_range(0..levels.len())];
            Complex::new(i, q)
        })
        .collect()
}

fn circular_placeholder<R: Rng + ?Sized>(order: usize, count: usize, rng: &mut R) -> Vec<Complex<f64>> {
    let root = (order as f64).sqrt();
    (0..count)
        .map(|_| {
            let angle = rng.random::<f64>() * TAU;
            let radius = 1.0 + (rng.random::<f64>() * root).floor() / root;
            Complex::from_polar(radius, angle)
        })
        .collect()
}

fn from_reference<R: Rng + ?Sized>(format: ModulationFormat, count: usize, rng: &mut R) -> Vec<Complex<f64>> {
    let points = reference_points(format);
    let energy = points.iter().map(|p| p.norm_sqr()).sum::<f64>() / points.len() as f64;
    let norm = energy.sqrt();
    (0..count)
        .map(|_| points[rng.random_range(0..points.len())] / norm)
        .collect()
}
