//! Candidate solutions and the search neighborhood.
//!
//! A [`Solution`] is an ordered list of [`Batch`]es that covers every job
//! exactly once. [`InitialStrategy`] builds the starting point;
//! [`generate_neighbor`] perturbs it with a weighted mix of local moves.
//!
//! # Reference
//! Mathirajan & Sivakumar (2006), "A literature review, classification and
//! simple meta-analysis on scheduling of batch processors in semiconductor",
//! *Int. J. Adv. Manuf. Technol.* 29, 990-1001.

mod construct;
mod moves;
mod types;

pub use construct::InitialStrategy;
pub use moves::{apply_move, generate_neighbor, Move, NeighborWeights};
pub use types::{Batch, Solution};
