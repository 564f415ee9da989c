//! Modulation formats and symbol mapping
//!
//! The six formats of the band-formation demo. BPSK, QPSK and the square QAM
//! orders map onto unit-energy grids; the non-square orders (8QAM, 32QAM)
//! default to a rough circular placeholder, see [`NonSquareMapping`].

use std::fmt::Display;
use std::str::FromStr;

use crate::error::SynthesisError;

pub mod constellation;
pub mod mapper;

pub use constellation::{raw_capacity, reference_points};
pub use mapper::{map, map_label, map_with, SymbolStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModulationFormat {
    Bpsk,
    Qpsk,
    Qam8,
    Qam16,
    Qam32,
    Qam64,
}

/// How non-square QAM orders are mapped to symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonSquareMapping {
    /// Random angle with radius `1 + floor(u * sqrt(M)) / sqrt(M)`.
    ///
    /// Matches what the display has always shown. It is not a real cross or
    /// star constellation and its average energy is above 1.
    #[default]
    CircularPlaceholder,
    /// Uniform draw from [`reference_points`], scaled to unit average energy
    Reference,
}

impl ModulationFormat {
    pub const ALL: [ModulationFormat; 6] = [
        ModulationFormat::Bpsk,
        ModulationFormat::Qpsk,
        ModulationFormat::Qam8,
        ModulationFormat::Qam16,
        ModulationFormat::Qam32,
        ModulationFormat::Qam64,
    ];

    /// Number of constellation points
    pub fn order(&self) -> usize {
        1 << self.bits_per_symbol()
    }

    pub fn bits_per_symbol(&self) -> u32 {
        match self {
            ModulationFormat::Bpsk => 1,
            ModulationFormat::Qpsk => 2,
            ModulationFormat::Qam8 => 3,
            ModulationFormat::Qam16 => 4,
            ModulationFormat::Qam32 => 5,
            ModulationFormat::Qam64 => 6,
        }
    }

    /// Levels per axis for square QAM orders, `None` for everything else
    pub fn square_side(&self) -> Option<usize> {
        match self {
            ModulationFormat::Qam16 => Some(4),
            ModulationFormat::Qam64 => Some(8),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModulationFormat::Bpsk => "BPSK",
            ModulationFormat::Qpsk => "QPSK",
            ModulationFormat::Qam8 => "8QAM",
            ModulationFormat::Qam16 => "16QAM",
            ModulationFormat::Qam32 => "32QAM",
            ModulationFormat::Qam64 => "64QAM",
        }
    }
}

impl Display for ModulationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ModulationFormat {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ModulationFormat::ALL
            .iter()
            .copied()
            .find(|format| format.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SynthesisError::UnsupportedFormat {
                label: s.to_string(),
            })
    }
}

impl TryFrom<&str> for ModulationFormat {
    type Error = SynthesisError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
