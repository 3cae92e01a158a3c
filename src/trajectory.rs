use crate::error::{ObservablesError, Result};
use crate::observables::msd::{mean_squared_displacement, MsdCurve};
use crate::observables::rdf::{radial_distribution_function, RdfCurve};
use crate::space::periodic_box::PeriodicBox;
use ndarray::{s, Array3, ArrayView1, ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};

/// An in-memory molecular-dynamics trajectory in a cubic periodic box.
///
/// Positions are stored as a dense 3D array indexed by
/// `[frame, atom, dimension]`, in absolute (unwrapped) coordinates. The
/// atom count is constant across frames by construction of the array,
/// and the box side and time step are constant scalars. Reading a
/// trajectory file into this shape is the caller's job.
///
/// # Example
/// ```
/// use mdobs::trajectory::Trajectory;
/// use ndarray::Array3;
///
/// // 2 frames, 2 atoms, at rest
/// let positions = Array3::zeros((2, 2, 3));
/// let traj = Trajectory::new(positions, 10.0, 0.005).unwrap();
/// assert_eq!(traj.frames(), 2);
/// assert_eq!(traj.atoms(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Positions indexed by (frame, atom, spatial dimension).
    positions: Array3<f64>,
    /// Cubic box side length.
    box_length: f64,
    /// Constant time step between consecutive frames.
    time_step: f64,
}

impl Trajectory {
    /// Creates a trajectory from a dense position array.
    ///
    /// # Arguments
    /// * `positions` - Array of shape `(frames, atoms, 3)` holding
    ///   absolute, unwrapped coordinates.
    /// * `box_length` - Side length of the cubic simulation cell.
    /// * `time_step` - Time elapsed between consecutive frames.
    ///
    /// # Errors
    /// Returns a configuration error if `box_length` or `time_step` is
    /// not positive, if the last axis does not hold 3 components, or if
    /// any coordinate is non-finite.
    pub fn new(positions: Array3<f64>, box_length: f64, time_step: f64) -> Result<Self> {
        if box_length <= 0.0 {
            return Err(ObservablesError::NonPositiveBoxLength { length: box_length });
        }
        if time_step <= 0.0 {
            return Err(ObservablesError::NonPositiveTimeStep { time_step });
        }
        let dims = positions.shape()[2];
        if dims != 3 {
            return Err(ObservablesError::WrongSpatialDimensions { dims });
        }
        ensure_finite(&positions.view())?;
        Ok(Self {
            positions,
            box_length,
            time_step,
        })
    }

    /// Number of frames in the trajectory.
    pub fn frames(&self) -> usize {
        self.positions.shape()[0]
    }

    /// Number of atoms per frame.
    pub fn atoms(&self) -> usize {
        self.positions.shape()[1]
    }

    /// Side length of the cubic simulation cell.
    pub fn box_length(&self) -> f64 {
        self.box_length
    }

    /// Time elapsed between consecutive frames.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// The periodic cell the trajectory was generated in.
    pub fn periodic_box(&self) -> PeriodicBox<3> {
        PeriodicBox::cubic(self.box_length)
    }

    /// Read-only view of the full position array.
    pub fn positions(&self) -> ArrayView3<'_, f64> {
        self.positions.view()
    }

    /// Gets a view of all atom positions in one frame.
    ///
    /// # Panics
    /// Panics if the frame index is out of bounds.
    pub fn frame(&self, frame: usize) -> ArrayView2<'_, f64> {
        assert!(
            frame < self.frames(),
            "Frame index out of bounds: frame={}, max allowed={}",
            frame,
            self.frames() - 1
        );
        self.positions.slice(s![frame, .., ..])
    }

    /// Gets a view of the position of a specific atom in a specific frame.
    ///
    /// # Panics
    /// Panics if the frame or atom indices are out of bounds.
    pub fn position(&self, frame: usize, atom: usize) -> ArrayView1<'_, f64> {
        assert!(
            frame < self.frames(),
            "Frame index out of bounds: frame={}, max allowed={}",
            frame,
            self.frames() - 1
        );
        assert!(
            atom < self.atoms(),
            "Atom index out of bounds: atom={}, max allowed={}",
            atom,
            self.atoms() - 1
        );
        self.positions.slice(s![frame, atom, ..])
    }

    /// Computes the time- and ensemble-averaged mean squared
    /// displacement of this trajectory.
    ///
    /// See [`mean_squared_displacement`] for the contract.
    pub fn msd(&self) -> Result<MsdCurve> {
        mean_squared_displacement(self.positions.view())
    }

    /// Computes the time- and ensemble-averaged radial distribution
    /// function of this trajectory.
    ///
    /// See [`radial_distribution_function`] for the contract.
    ///
    /// # Arguments
    /// * `r_cut` - Outer cutoff distance, at most half the box side.
    /// * `dr` - Histogram bin width.
    pub fn rdf(&self, r_cut: f64, dr: f64) -> Result<RdfCurve> {
        radial_distribution_function(self.positions.view(), self.box_length, r_cut, dr)
    }
}

/// Fails with the offending (frame, atom) location if any coordinate is
/// NaN or infinite. The engines run this before touching the data so a
/// stray non-finite value cannot propagate through the averages.
pub(crate) fn ensure_finite(positions: &ArrayView3<'_, f64>) -> Result<()> {
    for ((frame, atom, _), &x) in positions.indexed_iter() {
        if !x.is_finite() {
            return Err(ObservablesError::NonFiniteCoordinate { frame, atom });
        }
    }
    Ok(())
}
