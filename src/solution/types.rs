//! Batch and solution representation.

use crate::problem::BatchProblem;

/// An ordered group of jobs processed together.
///
/// Holds job indices into [`BatchProblem::jobs`]. Never empty inside a
/// [`Solution`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Batch {
    jobs: Vec<usize>,
}

impl Batch {
    pub fn new(jobs: Vec<usize>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &[usize] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut Vec<usize> {
        &mut self.jobs
    }
}

/// A candidate schedule: an ordered sequence of batches.
///
/// Every job of the problem appears in exactly one batch, exactly once.
/// Neighbor moves build a new `Solution` rather than editing one that
/// the search still refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    batches: Vec<Batch>,
}

impl Solution {
    /// Builds a solution from raw batches. Empty batches are dropped.
    pub fn from_batches(batches: Vec<Vec<usize>>) -> Self {
        Self::new(batches.into_iter().map(Batch::new).collect())
    }

    pub(crate) fn new(mut batches: Vec<Batch>) -> Self {
        batches.retain(|b| !b.is_empty());
        Self { batches }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total number of job slots across all batches.
    pub fn job_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    pub(crate) fn batches_mut(&mut self) -> &mut Vec<Batch> {
        &mut self.batches
    }

    /// Whether this solution is feasible for `problem`.
    ///
    /// Checks exactly-once coverage of every job, the batch capacity,
    /// and that no batch mixes families.
    pub fn is_valid_for(&self, problem: &BatchProblem) -> bool {
        let n = problem.job_count();
        let mut seen = vec![false; n];
        let mut covered = 0usize;

        for batch in &self.batches {
            if batch.len() > problem.batch_capacity() {
                return false;
            }
            let family = match batch.jobs.first() {
                Some(&j) if j < n => problem.family_of(j),
                _ => return false,
            };
            for &j in &batch.jobs {
                if j >= n || seen[j] || problem.family_of(j) != family {
                    return false;
                }
                seen[j] = true;
                covered += 1;
            }
        }
        covered == n
    }
}
