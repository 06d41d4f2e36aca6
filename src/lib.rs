//! Simulated annealing optimizer for batch scheduling.
//!
//! Jobs are grouped into capacity-limited, single-family batches; batches
//! run on identical machines in sequence order. The optimizer searches
//! batchings and sequences to minimize a scheduling objective (total
//! weighted completion time, makespan, or total weighted tardiness).
//!
//! # Modules
//!
//! - **`problem`**: `Job`, `BatchProblem` (validation, pure cost function,
//!   timed decode)
//! - **`solution`**: `Batch`, `Solution`, initial construction and
//!   neighbor moves (swap, relocate, reverse)
//! - **`sa`**: generic annealing engine: cooling schedule, Metropolis
//!   acceptance, best-solution tracking, cancellation
//! - **`driver`**: `optimize(problem, params)`, warm starts and multi-start
//!
//! # Example
//!
//! ```
//! use batch_anneal::{optimize, BatchProblem, Job, OptimizerParams};
//!
//! let jobs = vec![
//!     Job::new("a", 4.0).with_weight(2.0),
//!     Job::new("b", 3.0),
//!     Job::new("c", 5.0).with_family(1),
//! ];
//! let problem = BatchProblem::new(jobs, 2).unwrap();
//! let params = OptimizerParams::default()
//!     .with_initial_temperature(50.0)
//!     .with_iterations_per_temp(100)
//!     .with_seed(1);
//!
//! let result = optimize(&problem, &params).unwrap();
//! assert!(result.solution.is_valid_for(&problem));
//! ```
//!
//! # Features
//!
//! - `serde`: (de)serialization for parameters, jobs and solutions
//! - `parallel`: multi-start runs on rayon

pub mod driver;
pub mod error;
pub mod problem;
pub mod random;
pub mod sa;
pub mod solution;

pub use driver::{optimize, OptimizeResult, OptimizerParams};
pub use error::OptimizeError;
pub use problem::{BatchProblem, Job};
