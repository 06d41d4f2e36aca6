//! Optimizer driver.
//!
//! Binds a [`BatchProblem`](crate::problem::BatchProblem) to the annealing
//! engine, applies default parameters, and reports the best solution with
//! its decoded schedule and run statistics.

mod params;
mod runner;

pub use params::OptimizerParams;
pub use runner::{
    optimize, optimize_from, optimize_multi_start, optimize_with_cancel, optimize_with_rng,
    OptimizeResult,
};
