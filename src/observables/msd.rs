use crate::error::Result;
use crate::trajectory::ensure_finite;
use log::debug;
use ndarray::ArrayView3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One point of a mean-squared-displacement curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MsdPoint {
    /// Time lag in frames.
    pub lag: usize,
    /// Squared displacement averaged over all time origins and atoms.
    pub value: f64,
    /// Number of time origins averaged over at this lag. The last lag
    /// has a single origin and is the statistically noisiest point.
    pub origins: usize,
}

/// Mean squared displacement per time lag, in increasing lag order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsdCurve {
    points: Vec<MsdPoint>,
}

impl MsdCurve {
    /// The curve points, ordered by lag starting at 0.
    pub fn points(&self) -> &[MsdPoint] {
        &self.points
    }

    /// `true` if the trajectory was too short for any lag.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The curve on a physical time axis: `(lag * time_step, value)`.
    pub fn timed(&self, time_step: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points
            .iter()
            .map(move |p| (p.lag as f64 * time_step, p.value))
    }
}

/// Computes the time- and ensemble-averaged mean squared displacement.
///
/// For each lag `m` the squared Euclidean displacement over `m` frames
/// is averaged over every valid time origin and every atom. Coordinates
/// must be unwrapped: no periodic folding is applied, so an atom that
/// diffused across the cell keeps its full displacement.
///
/// Lag 0 is included as a sanity anchor and is exactly zero.
///
/// # Arguments
/// * `positions` - Array of shape `(frames, atoms, dims)` in absolute,
///   unwrapped coordinates.
///
/// # Returns
/// An [`MsdCurve`] with one point per lag in `[0, frames - 1]`. Fewer
/// than two frames (or zero atoms) yield an empty curve: no lag is
/// computable, which is degenerate but not an error.
///
/// # Errors
/// Fails if any coordinate is non-finite.
pub fn mean_squared_displacement(positions: ArrayView3<'_, f64>) -> Result<MsdCurve> {
    ensure_finite(&positions)?;
    let n_frames = positions.shape()[0];
    let n_atoms = positions.shape()[1];
    if n_frames < 2 || n_atoms == 0 {
        debug!(
            "MSD degenerate input ({} frames, {} atoms), returning empty curve",
            n_frames, n_atoms
        );
        return Ok(MsdCurve { points: Vec::new() });
    }

    debug!(
        "computing MSD for {} lags ({} atoms, {} frames)",
        n_frames, n_atoms, n_frames
    );

    // Lags are independent; each worker owns its private sum and the
    // per-lag points are collected in order.
    let points: Vec<MsdPoint> = (0..n_frames)
        .into_par_iter()
        .map(|lag| displacement_at_lag(&positions, lag))
        .collect();

    Ok(MsdCurve { points })
}

/// Squared displacement at one lag, averaged over origins and atoms.
///
/// Sums in f64 before a single division, keeping the accumulation
/// numerically stable over long trajectories.
fn displacement_at_lag(positions: &ArrayView3<'_, f64>, lag: usize) -> MsdPoint {
    let n_frames = positions.shape()[0];
    let n_atoms = positions.shape()[1];
    let n_dims = positions.shape()[2];
    let origins = n_frames - lag;

    let mut sum = 0.0;
    for origin in 0..origins {
        for atom in 0..n_atoms {
            for dim in 0..n_dims {
                let dx = positions[[origin + lag, atom, dim]] - positions[[origin, atom, dim]];
                sum += dx * dx;
            }
        }
    }

    MsdPoint {
        lag,
        value: sum / (origins * n_atoms) as f64,
        origins,
    }
}
