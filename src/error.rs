//! Error types for mdobs.

use thiserror::Error;

/// Errors reported by the observable engines.
///
/// Configuration errors are detected before any computation starts; no
/// partially aggregated result is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum ObservablesError {
    #[error(
        "cutoff {r_cut} exceeds half the shortest box length ({half_box}): \
         the minimum image of a pair is no longer unique"
    )]
    CutoffBeyondHalfBox { r_cut: f64, half_box: f64 },

    #[error("bin width must be positive, got {dr}")]
    NonPositiveBinWidth { dr: f64 },

    #[error("cutoff {r_cut} admits no complete bin of width {dr}")]
    EmptyHistogramDomain { r_cut: f64, dr: f64 },

    #[error("at least two atoms are required to form pairs, got {atoms}")]
    TooFewAtoms { atoms: usize },

    #[error("trajectory contains no frames")]
    NoFrames,

    #[error("box length must be positive, got {length}")]
    NonPositiveBoxLength { length: f64 },

    #[error("time step must be positive, got {time_step}")]
    NonPositiveTimeStep { time_step: f64 },

    #[error("positions must have 3 spatial components per atom, got {dims}")]
    WrongSpatialDimensions { dims: usize },

    #[error("non-finite coordinate at frame {frame}, atom {atom}")]
    NonFiniteCoordinate { frame: usize, atom: usize },
}

pub type Result<T> = std::result::Result<T, ObservablesError>;
