//! Batch scheduling instance and objective evaluation.
//!
//! # Timing
//!
//! A [`Solution`] is an ordered list of batches. Batches are dispatched in
//! that order to whichever identical machine becomes free first (lowest
//! index on ties). Every job in a batch completes when the batch ends.
//!
//! # Reference
//! Potts & Kovalyov (2000), "Scheduling with batching: A review",
//! *European Journal of Operational Research* 120(2), 228-249.

use std::collections::HashSet;

use super::Job;
use crate::error::OptimizeError;
use crate::solution::{Batch, Solution};

/// How a batch's processing time derives from its jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatchMode {
    /// Jobs run simultaneously: batch time is the longest job (burn-in ovens,
    /// autoclaves, diffusion furnaces).
    #[default]
    Parallel,
    /// Jobs run one after another: batch time is the sum of the jobs.
    Serial,
}

/// Scheduling objective. All objectives are minimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Objective {
    /// Sum of `weight * completion_time`.
    #[default]
    TotalWeightedCompletion,
    /// Latest batch completion (C_max).
    Makespan,
    /// Sum of `weight * max(0, completion_time - due_date)`.
    TotalWeightedTardiness,
}

/// A batch placed on a machine timeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledBatch {
    /// Machine index in `0..machines`.
    pub machine: usize,
    /// Job indices in batch order.
    pub jobs: Vec<usize>,
    /// Batch start time.
    pub start: f64,
    /// Batch end time (completion time of every job in it).
    pub end: f64,
}

/// A validated batch scheduling instance.
///
/// Immutable for the duration of a run. Construction fails with
/// [`OptimizeError::InvalidProblem`] when no feasible batching exists or
/// the job data is malformed.
#[derive(Debug, Clone)]
pub struct BatchProblem {
    jobs: Vec<Job>,
    batch_capacity: usize,
    machines: usize,
    objective: Objective,
    mode: BatchMode,
}

impl BatchProblem {
    /// Creates a single-machine instance with the default objective
    /// (total weighted completion time) and parallel batching.
    pub fn new(jobs: Vec<Job>, batch_capacity: usize) -> Result<Self, OptimizeError> {
        let problem = Self {
            jobs,
            batch_capacity,
            machines: 1,
            objective: Objective::default(),
            mode: BatchMode::default(),
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Sets the number of identical machines.
    pub fn with_machines(mut self, machines: usize) -> Result<Self, OptimizeError> {
        self.machines = machines;
        self.validate()?;
        Ok(self)
    }

    /// Sets the objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the batch processing mode.
    pub fn with_mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn batch_capacity(&self) -> usize {
        self.batch_capacity
    }

    pub fn machines(&self) -> usize {
        self.machines
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    /// Family of the job at `index`.
    #[inline]
    pub fn family_of(&self, index: usize) -> u32 {
        self.jobs[index].family
    }

    /// Checks the instance.
    ///
    /// Rejects: an empty job list, zero capacity, zero machines, duplicate
    /// job IDs, non-positive or non-finite processing times, negative or
    /// non-finite weights, non-finite due dates.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.jobs.is_empty() {
            return Err(OptimizeError::problem("job list is empty"));
        }
        if self.batch_capacity == 0 {
            return Err(OptimizeError::problem(
                "batch_capacity is 0, no job can be batched",
            ));
        }
        if self.machines == 0 {
            return Err(OptimizeError::problem("at least one machine is required"));
        }

        let mut ids = HashSet::new();
        for job in &self.jobs {
            if !ids.insert(job.id.as_str()) {
                return Err(OptimizeError::problem(format!(
                    "duplicate job ID: {}",
                    job.id
                )));
            }
            if !job.processing_time.is_finite() || job.processing_time <= 0.0 {
                return Err(OptimizeError::problem(format!(
                    "job '{}' has invalid processing time {}",
                    job.id, job.processing_time
                )));
            }
            if !job.weight.is_finite() || job.weight < 0.0 {
                return Err(OptimizeError::problem(format!(
                    "job '{}' has invalid weight {}",
                    job.id, job.weight
                )));
            }
            if let Some(due) = job.due_date {
                if !due.is_finite() {
                    return Err(OptimizeError::problem(format!(
                        "job '{}' has non-finite due date",
                        job.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Processing time of a batch under the configured [`BatchMode`].
    pub fn batch_time(&self, batch: &Batch) -> f64 {
        let times = batch.jobs().iter().map(|&j| self.jobs[j].processing_time);
        match self.mode {
            BatchMode::Parallel => times.fold(0.0, f64::max),
            BatchMode::Serial => times.sum(),
        }
    }

    /// Index of the machine that becomes free first.
    fn earliest_machine(free_at: &[f64]) -> usize {
        let mut best = 0;
        for (m, &t) in free_at.iter().enumerate().skip(1) {
            if t < free_at[best] {
                best = m;
            }
        }
        best
    }

    /// Decodes a solution into timed batches, in dispatch order.
    pub fn schedule(&self, solution: &Solution) -> Vec<ScheduledBatch> {
        let mut free_at = vec![0.0; self.machines];
        solution
            .batches()
            .iter()
            .map(|batch| {
                let machine = Self::earliest_machine(&free_at);
                let start = free_at[machine];
                let end = start + self.batch_time(batch);
                free_at[machine] = end;
                ScheduledBatch {
                    machine,
                    jobs: batch.jobs().to_vec(),
                    start,
                    end,
                }
            })
            .collect()
    }

    /// Completion time of every job, indexed like [`jobs`](Self::jobs).
    pub fn completion_times(&self, solution: &Solution) -> Vec<f64> {
        let mut completion = vec![0.0; self.jobs.len()];
        for sb in self.schedule(solution) {
            for j in sb.jobs {
                completion[j] = sb.end;
            }
        }
        completion
    }

    /// Objective value of a solution. Lower is better.
    ///
    /// A pure function of the solution's batches and their order.
    pub fn cost(&self, solution: &Solution) -> f64 {
        let mut free_at = vec![0.0; self.machines];
        let mut total = 0.0;
        let mut makespan: f64 = 0.0;

        for batch in solution.batches() {
            let machine = Self::earliest_machine(&free_at);
            let end = free_at[machine] + self.batch_time(batch);
            free_at[machine] = end;
            makespan = makespan.max(end);

            match self.objective {
                Objective::Makespan => {}
                Objective::TotalWeightedCompletion => {
                    let weight: f64 = batch.jobs().iter().map(|&j| self.jobs[j].weight).sum();
                    total += weight * end;
                }
                Objective::TotalWeightedTardiness => {
                    for &j in batch.jobs() {
                        let job = &self.jobs[j];
                        if let Some(due) = job.due_date {
                            total += job.weight * (end - due).max(0.0);
                        }
                    }
                }
            }
        }

        match self.objective {
            Objective::Makespan => makespan,
            _ => total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs(times: &[f64]) -> Vec<Job> {
        times
            .iter()
            .enumerate()
            .map(|(i, &p)| Job::new(format!("J{i}"), p))
            .collect()
    }

    fn solution(batches: &[&[usize]]) -> Solution {
        Solution::from_batches(batches.iter().map(|b| b.to_vec()).collect())
    }

    #[test]
    fn test_empty_jobs_rejected() {
        let err = BatchProblem::new(vec![], 2).unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidProblem(_)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = BatchProblem::new(jobs(&[1.0]), 0).unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidProblem(_)));
    }

    #[test]
    fn test_zero_machines_rejected() {
        let err = BatchProblem::new(jobs(&[1.0]), 1)
            .unwrap()
            .with_machines(0)
            .unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidProblem(_)));
    }

    #[test]
    fn test_bad_job_data_rejected() {
        assert!(BatchProblem::new(jobs(&[1.0, 0.0]), 2).is_err());
        assert!(BatchProblem::new(jobs(&[f64::NAN]), 2).is_err());
        assert!(BatchProblem::new(vec![Job::new("a", 1.0).with_weight(-1.0)], 2).is_err());
        assert!(BatchProblem::new(vec![Job::new("a", 1.0), Job::new("a", 2.0)], 2).is_err());
        assert!(
            BatchProblem::new(vec![Job::new("a", 1.0).with_due_date(f64::INFINITY)], 2).is_err()
        );
    }

    #[test]
    fn test_single_job_cost_is_processing_time() {
        let problem = BatchProblem::new(jobs(&[7.5]), 1).unwrap();
        let sol = solution(&[&[0]]);
        assert_eq!(problem.cost(&sol), 7.5);
        let problem = problem.with_objective(Objective::Makespan);
        assert_eq!(problem.cost(&sol), 7.5);
    }

    #[test]
    fn test_parallel_batch_time_is_max() {
        let problem = BatchProblem::new(jobs(&[3.0, 5.0, 2.0]), 3).unwrap();
        let sol = solution(&[&[0, 1], &[2]]);
        // batch 0 ends at 5 (two jobs), batch 1 ends at 7
        assert_eq!(problem.cost(&sol), 5.0 * 2.0 + 7.0);
        assert_eq!(problem.completion_times(&sol), vec![5.0, 5.0, 7.0]);
    }

    #[test]
    fn test_serial_batch_time_is_sum() {
        let problem = BatchProblem::new(jobs(&[3.0, 5.0, 2.0]), 3)
            .unwrap()
            .with_mode(BatchMode::Serial)
            .with_objective(Objective::Makespan);
        let sol = solution(&[&[0, 1], &[2]]);
        assert_eq!(problem.cost(&sol), 10.0);
    }

    #[test]
    fn test_weighted_completion_uses_weights() {
        let js = vec![
            Job::new("a", 2.0).with_weight(3.0),
            Job::new("b", 4.0).with_weight(1.0),
        ];
        let problem = BatchProblem::new(js, 1).unwrap();
        assert_eq!(problem.cost(&solution(&[&[0], &[1]])), 3.0 * 2.0 + 6.0);
        assert_eq!(problem.cost(&solution(&[&[1], &[0]])), 4.0 + 3.0 * 6.0);
    }

    #[test]
    fn test_tardiness() {
        let js = vec![
            Job::new("a", 4.0).with_due_date(3.0).with_weight(2.0),
            Job::new("b", 4.0).with_due_date(10.0),
            Job::new("c", 1.0),
        ];
        let problem = BatchProblem::new(js, 1)
            .unwrap()
            .with_objective(Objective::TotalWeightedTardiness);
        // a ends 4 (late by 1, weight 2), b ends 8 (on time), c has no due date
        assert_eq!(problem.cost(&solution(&[&[0], &[1], &[2]])), 2.0);
    }

    #[test]
    fn test_two_machines_dispatch_earliest_free() {
        let problem = BatchProblem::new(jobs(&[4.0, 1.0, 2.0]), 1)
            .unwrap()
            .with_machines(2)
            .unwrap()
            .with_objective(Objective::Makespan);
        let sol = solution(&[&[0], &[1], &[2]]);
        let sched = problem.schedule(&sol);
        assert_eq!(sched[0].machine, 0);
        assert_eq!(sched[1].machine, 1);
        assert_eq!(sched[2].machine, 1);
        assert_eq!(sched[2].start, 1.0);
        assert_eq!(problem.cost(&sol), 4.0);
    }

    #[test]
    fn test_cost_is_deterministic() {
        let problem = BatchProblem::new(jobs(&[3.0, 1.0, 4.0, 1.0, 5.0]), 2).unwrap();
        let sol = solution(&[&[4, 0], &[1, 3], &[2]]);
        assert_eq!(problem.cost(&sol), problem.cost(&sol.clone()));
    }
}
