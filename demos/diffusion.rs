//! Computes the MSD and RDF of a synthetic freely-diffusing gas.
//!
//! Run with `cargo run --example diffusion`.

use env_logger::Builder;
use log::info;
use mdobs::trajectory::Trajectory;
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const N: usize = 64;
const FRAMES: usize = 400;
const BOX_SIDE: f64 = 12.0;
const TIME_STEP: f64 = 0.005;
const STEP_SIGMA: f64 = 0.05;

const R_CUT: f64 = 6.0;
const DR: f64 = 0.2;

fn main() {
    // Programmatically set the logging level
    Builder::new().filter_level(log::LevelFilter::Info).init();
    info!("N = {}", N);
    info!("FRAMES = {}", FRAMES);
    info!("BOX_SIDE = {}", BOX_SIDE);

    let mut rng = StdRng::seed_from_u64(2024);
    let step = Normal::new(0.0, STEP_SIGMA).expect("valid step width");

    // Uniform initial configuration, then independent Gaussian steps
    // per atom and frame. Coordinates stay unwrapped.
    let mut positions = Array3::zeros((FRAMES, N, 3));
    for atom in 0..N {
        for dim in 0..3 {
            positions[[0, atom, dim]] = rng.gen_range(0.0..BOX_SIDE);
        }
    }
    for frame in 1..FRAMES {
        for atom in 0..N {
            for dim in 0..3 {
                positions[[frame, atom, dim]] =
                    positions[[frame - 1, atom, dim]] + step.sample(&mut rng);
            }
        }
    }

    let trajectory =
        Trajectory::new(positions, BOX_SIDE, TIME_STEP).expect("valid synthetic trajectory");

    let msd = trajectory.msd().expect("finite coordinates");
    println!("# MSD: time, msd, origins");
    for ((time, value), point) in msd.timed(trajectory.time_step()).zip(msd.points()) {
        println!("{:10.4} {:12.6} {:6}", time, value, point.origins);
    }

    let rdf = trajectory.rdf(R_CUT, DR).expect("valid RDF configuration");
    println!("# RDF: r, g");
    for point in rdf.points() {
        println!("{:10.4} {:12.6}", point.r, point.g);
    }

    // For free diffusion the curve should grow like 3 sigma^2 m.
    let last = msd.points().last().expect("at least one lag");
    info!(
        "MSD at final lag {}: {:.4} (theory ~ {:.4})",
        last.lag,
        last.value,
        3.0 * STEP_SIGMA * STEP_SIGMA * last.lag as f64
    );
}
