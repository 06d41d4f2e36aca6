//! Initial solution construction.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::types::{Batch, Solution};
use crate::problem::BatchProblem;

/// How the starting solution is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitialStrategy {
    /// Shuffle the jobs, pack them first-fit into same-family batches,
    /// then shuffle the batch order.
    #[default]
    Random,
    /// Per family, sort jobs by WSPT and fill batches to capacity; then
    /// order batches by `batch_time / total_weight`.
    Greedy,
}

impl InitialStrategy {
    /// Builds a feasible starting solution for `problem`.
    pub fn build<R: Rng>(self, problem: &BatchProblem, rng: &mut R) -> Solution {
        match self {
            InitialStrategy::Random => random_batching(problem, rng),
            InitialStrategy::Greedy => greedy_batching(problem),
        }
    }
}

fn random_batching<R: Rng>(problem: &BatchProblem, rng: &mut R) -> Solution {
    let mut order: Vec<usize> = (0..problem.job_count()).collect();
    order.shuffle(rng);

    let capacity = problem.batch_capacity();
    let mut batches: Vec<Batch> = Vec::new();
    for j in order {
        let family = problem.family_of(j);
        let open = batches
            .iter_mut()
            .find(|b| b.len() < capacity && problem.family_of(b.jobs()[0]) == family);
        match open {
            Some(batch) => batch.jobs_mut().push(j),
            None => batches.push(Batch::new(vec![j])),
        }
    }

    batches.shuffle(rng);
    Solution::new(batches)
}

fn greedy_batching(problem: &BatchProblem) -> Solution {
    let jobs = problem.jobs();

    let mut by_family: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (j, job) in jobs.iter().enumerate() {
        by_family.entry(job.family).or_default().push(j);
    }

    let mut batches: Vec<Batch> = Vec::new();
    for (_, mut members) in by_family {
        members.sort_by(|&a, &b| jobs[a].wspt_ratio().total_cmp(&jobs[b].wspt_ratio()));
        batches.extend(
            members
                .chunks(problem.batch_capacity())
                .map(|chunk| Batch::new(chunk.to_vec())),
        );
    }

    let ratio = |batch: &Batch| {
        let weight: f64 = batch.jobs().iter().map(|&j| jobs[j].weight).sum();
        if weight > 0.0 {
            problem.batch_time(batch) / weight
        } else {
            f64::INFINITY
        }
    };
    batches.sort_by(|a, b| ratio(a).total_cmp(&ratio(b)));

    Solution::new(batches)
}
