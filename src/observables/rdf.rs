use crate::error::{ObservablesError, Result};
use crate::space::periodic_box::PeriodicBox;
use crate::trajectory::ensure_finite;
use log::debug;
use ndarray::{ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One point of a radial distribution function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RdfPoint {
    /// Midpoint distance of the bin.
    pub r: f64,
    /// Pair density at `r` relative to an ideal gas at the same bulk
    /// density; approaches 1 at large `r` for a disordered system.
    pub g: f64,
}

/// Radial distribution function g(r), one point per bin, in increasing
/// `r` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfCurve {
    points: Vec<RdfPoint>,
}

impl RdfCurve {
    /// The curve points, ordered by bin midpoint.
    pub fn points(&self) -> &[RdfPoint] {
        &self.points
    }
}

/// Histograms minimum-image pair distances, frame by frame.
///
/// The engine is configured once with the cell geometry and the
/// histogram domain, then applied per frame. Each unordered pair
/// `{i, j}` within the cutoff increments its bin by two, once per
/// direction, matching the convention that g(r) is evaluated around
/// every atom; the normalization in [`normalize_histogram`] assumes
/// this double count.
#[derive(Debug)]
pub struct PairHistogramEngine {
    cell: PeriodicBox<3>,
    r_cut: f64,
    r_cut_sq: f64,
    dr: f64,
    n_bins: usize,
}

impl PairHistogramEngine {
    /// Creates an engine for the given cell and histogram domain.
    ///
    /// The domain `[0, r_cut)` is split into `floor(r_cut / dr)` bins
    /// of width `dr`. Distances at or beyond the last complete bin are
    /// discarded.
    ///
    /// # Errors
    /// Fails if `dr` is not positive, if `r_cut` exceeds half the
    /// shortest cell length (the minimum image of a pair would no
    /// longer be unique), or if the domain holds no complete bin.
    pub fn new(cell: PeriodicBox<3>, r_cut: f64, dr: f64) -> Result<Self> {
        if dr <= 0.0 {
            return Err(ObservablesError::NonPositiveBinWidth { dr });
        }
        let half_box = cell.shortest_length() / 2.0;
        if r_cut > half_box {
            return Err(ObservablesError::CutoffBeyondHalfBox { r_cut, half_box });
        }
        let n_bins = (r_cut / dr).floor() as usize;
        if n_bins == 0 {
            return Err(ObservablesError::EmptyHistogramDomain { r_cut, dr });
        }
        if (n_bins as f64) * dr < r_cut {
            debug!(
                "histogram domain truncated to {} complete bins ({:.6} of cutoff {:.6})",
                n_bins,
                n_bins as f64 * dr,
                r_cut
            );
        }
        Ok(Self {
            cell,
            r_cut,
            r_cut_sq: r_cut * r_cut,
            dr,
            n_bins,
        })
    }

    /// Number of histogram bins.
    pub fn bins(&self) -> usize {
        self.n_bins
    }

    /// Bin width.
    pub fn bin_width(&self) -> f64 {
        self.dr
    }

    /// The cell the engine wraps distances in.
    pub fn cell(&self) -> &PeriodicBox<3> {
        &self.cell
    }

    /// Histograms the minimum-image pair distances of a single frame.
    ///
    /// # Arguments
    /// * `frame` - Positions of shape `(atoms, 3)`.
    ///
    /// # Returns
    /// Raw, unnormalized bin counts for this frame.
    pub fn frame_histogram(&self, frame: ArrayView2<'_, f64>) -> Vec<u64> {
        let mut counts = vec![0u64; self.n_bins];
        self.accumulate_frame(frame, &mut counts);
        counts
    }

    /// Adds one frame's pair counts into an existing histogram.
    fn accumulate_frame(&self, frame: ArrayView2<'_, f64>, counts: &mut [u64]) {
        let n_atoms = frame.nrows();
        for i in 0..n_atoms {
            let r_i = frame.row(i);
            // j > i: r_ji is the mirror of r_ij, so each unordered pair
            // is visited once and counted twice.
            for j in (i + 1)..n_atoms {
                let d_sq = self.cell.distance_squared(frame.row(j), r_i);
                if d_sq < self.r_cut_sq {
                    let bin = (d_sq.sqrt() / self.dr) as usize;
                    if bin < counts.len() {
                        counts[bin] += 2;
                    }
                }
            }
        }
    }

    /// Histograms every frame of a trajectory and merges the per-frame
    /// counts into a single running total.
    ///
    /// Frames are independent, so the work is split across threads;
    /// each worker fills a private partial histogram and the partials
    /// are merged once by elementwise addition. Counts are integers,
    /// so the merge order cannot change the result.
    ///
    /// # Arguments
    /// * `positions` - Array of shape `(frames, atoms, 3)`.
    pub fn accumulate(&self, positions: ArrayView3<'_, f64>) -> Vec<u64> {
        let n_frames = positions.shape()[0];
        (0..n_frames)
            .into_par_iter()
            .fold(
                || vec![0u64; self.n_bins],
                |mut partial, frame| {
                    self.accumulate_frame(positions.index_axis(Axis(0), frame), &mut partial);
                    partial
                },
            )
            .reduce(|| vec![0u64; self.n_bins], merge_histograms)
    }
}

fn merge_histograms(mut left: Vec<u64>, right: Vec<u64>) -> Vec<u64> {
    for (a, b) in left.iter_mut().zip(&right) {
        *a += b;
    }
    left
}

/// Converts an aggregated raw pair-count histogram into g(r).
///
/// Each bin count is divided by the count an ideal gas at the same bulk
/// density would produce in the same spherical shell, summed over all
/// atoms and frames: `atoms * frames * density * 4 pi r_mid^2 * dr`,
/// with `r_mid = (bin + 0.5) * dr`. The factor matches the
/// double-direction pair count of [`PairHistogramEngine`].
///
/// # Errors
/// Fails if `frames` or `atoms` is zero.
pub fn normalize_histogram(
    counts: &[u64],
    frames: usize,
    atoms: usize,
    cell: &PeriodicBox<3>,
    dr: f64,
) -> Result<RdfCurve> {
    if atoms == 0 {
        return Err(ObservablesError::TooFewAtoms { atoms });
    }
    if frames == 0 {
        return Err(ObservablesError::NoFrames);
    }
    let density = atoms as f64 / cell.volume();
    let points = counts
        .iter()
        .enumerate()
        .map(|(bin, &count)| {
            let r = (bin as f64 + 0.5) * dr;
            let shell = 4.0 * PI * r * r * dr;
            let expected = (atoms * frames) as f64 * density * shell;
            RdfPoint {
                r,
                g: count as f64 / expected,
            }
        })
        .collect();
    Ok(RdfCurve { points })
}

/// Computes the time- and ensemble-averaged radial distribution
/// function of a trajectory in a cubic periodic box.
///
/// Distances are evaluated under the minimum image convention, pair
/// counts are accumulated over all frames without intermediate
/// normalization, and the total is normalized once against the
/// ideal-gas expectation.
///
/// # Arguments
/// * `positions` - Array of shape `(frames, atoms, 3)`; wrapped and
///   unwrapped coordinates give identical results.
/// * `box_length` - Side length of the cubic cell.
/// * `r_cut` - Outer cutoff distance, at most `box_length / 2`.
/// * `dr` - Histogram bin width.
///
/// # Returns
/// An [`RdfCurve`] with one point per bin, in increasing `r` order.
///
/// # Errors
/// Fails fast, before any pair work, on a non-positive `box_length`,
/// fewer than two atoms, zero frames, a non-finite coordinate, or an
/// invalid histogram domain (see [`PairHistogramEngine::new`]).
pub fn radial_distribution_function(
    positions: ArrayView3<'_, f64>,
    box_length: f64,
    r_cut: f64,
    dr: f64,
) -> Result<RdfCurve> {
    if box_length <= 0.0 {
        return Err(ObservablesError::NonPositiveBoxLength { length: box_length });
    }
    let dims = positions.shape()[2];
    if dims != 3 {
        return Err(ObservablesError::WrongSpatialDimensions { dims });
    }
    let n_frames = positions.shape()[0];
    let n_atoms = positions.shape()[1];
    if n_atoms < 2 {
        return Err(ObservablesError::TooFewAtoms { atoms: n_atoms });
    }
    if n_frames == 0 {
        return Err(ObservablesError::NoFrames);
    }
    ensure_finite(&positions)?;

    let engine = PairHistogramEngine::new(PeriodicBox::cubic(box_length), r_cut, dr)?;
    debug!(
        "computing RDF over {} frames ({} atoms, {} bins of width {:.6})",
        n_frames,
        n_atoms,
        engine.bins(),
        dr
    );
    let counts = engine.accumulate(positions);
    normalize_histogram(&counts, n_frames, n_atoms, engine.cell(), dr)
}
