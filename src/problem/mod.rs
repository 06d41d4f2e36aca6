//! Batch scheduling problem model.
//!
//! - **`Job`**: processing time, weight, due date and family.
//! - **`BatchProblem`**: validated instance (jobs, batch capacity,
//!   machine count, objective) with a pure cost function over
//!   [`Solution`](crate::solution::Solution)s.
//! - **`ScheduledBatch`**: a batch decoded onto a machine timeline.

mod job;
mod model;

pub use job::Job;
pub use model::{BatchMode, BatchProblem, Objective, ScheduledBatch};
