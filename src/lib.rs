//! Time- and ensemble-averaged observables for molecular-dynamics
//! trajectories in periodic boxes.
//!
//! The crate post-processes a trajectory (a time-ordered sequence of
//! per-atom position snapshots in a fixed cubic cell) into two standard
//! structural and dynamical descriptors:
//!
//! - the mean squared displacement (MSD) over time lag, computed on
//!   unwrapped coordinates ([`observables::msd`]);
//! - the radial distribution function g(r) over pair distance, computed
//!   with the minimum image convention ([`observables::rdf`]).
//!
//! Trajectory file parsing, plotting and persistence are left to the
//! caller; the engines operate on in-memory [`ndarray`] arrays indexed
//! as `[frame, atom, dimension]`, either directly or through the
//! [`trajectory::Trajectory`] container.

pub mod error;
pub mod observables;
pub mod space;
pub mod trajectory;
