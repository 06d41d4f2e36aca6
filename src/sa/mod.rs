//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod config;
mod engine;
mod types;

pub use config::{AnnealingParams, CoolingSchedule};
pub use engine::{
    acceptance_probability, AnnealingEngine, AnnealingOutcome, Phase, SearchState,
    TEMPERATURE_EPSILON,
};
pub use types::AnnealProblem;
