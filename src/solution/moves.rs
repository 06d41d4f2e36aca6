//! Neighbor moves.
//!
//! Every move clones the incoming solution and edits the clone, so the
//! caller's solution is never touched. Each move preserves feasibility:
//! exactly-once coverage, batch capacity and family homogeneity.
//!
//! | Move | Effect |
//! |------|--------|
//! | `Swap` | exchange two same-family jobs held by different batches |
//! | `Relocate` | move one job to another same-family batch with room, or to a new batch |
//! | `Reverse` | reverse a contiguous run of batches |

use rand::Rng;

use super::types::{Batch, Solution};
use crate::error::OptimizeError;
use crate::problem::BatchProblem;

/// Neighbor move kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Swap,
    Relocate,
    Reverse,
}

impl Move {
    const ALL: [Move; 3] = [Move::Swap, Move::Relocate, Move::Reverse];
}

/// Relative selection weights for the neighbor moves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborWeights {
    pub swap: f64,
    pub relocate: f64,
    pub reverse: f64,
}

impl Default for NeighborWeights {
    fn default() -> Self {
        Self {
            swap: 0.4,
            relocate: 0.3,
            reverse: 0.3,
        }
    }
}

impl NeighborWeights {
    fn weight(&self, mv: Move) -> f64 {
        match mv {
            Move::Swap => self.swap,
            Move::Relocate => self.relocate,
            Move::Reverse => self.reverse,
        }
    }

    /// Weights must be finite, non-negative, and not all zero.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        for mv in Move::ALL {
            let w = self.weight(mv);
            if !w.is_finite() || w < 0.0 {
                return Err(OptimizeError::parameter(format!(
                    "{mv:?} weight must be a non-negative number, got {w}"
                )));
            }
        }
        if self.swap + self.relocate + self.reverse <= 0.0 {
            return Err(OptimizeError::parameter(
                "at least one neighbor weight must be positive",
            ));
        }
        Ok(())
    }

    /// Roulette-wheel choice among the moves with positive weight.
    fn pick<R: Rng>(&self, rng: &mut R) -> Move {
        let total = self.swap + self.relocate + self.reverse;
        if total <= 0.0 {
            return Move::Swap;
        }
        let mut r = rng.random_range(0.0..total);
        for mv in Move::ALL {
            let w = self.weight(mv);
            if r < w {
                return mv;
            }
            r -= w;
        }
        // floating point leftovers land on the last positive weight
        Move::ALL
            .into_iter()
            .rev()
            .find(|&mv| self.weight(mv) > 0.0)
            .unwrap_or(Move::Reverse)
    }
}

/// Produces a neighbor of `solution`.
///
/// Picks a move by weight. If it does not apply to this solution (for
/// instance a single batch cannot be reversed), the other positively
/// weighted moves are tried in order. When nothing applies the result is
/// a copy of `solution`.
pub fn generate_neighbor<R: Rng>(
    problem: &BatchProblem,
    solution: &Solution,
    weights: &NeighborWeights,
    rng: &mut R,
) -> Solution {
    let first = weights.pick(rng);
    let start = Move::ALL.iter().position(|&m| m == first).unwrap_or(0);

    for k in 0..Move::ALL.len() {
        let mv = Move::ALL[(start + k) % Move::ALL.len()];
        if weights.weight(mv) <= 0.0 {
            continue;
        }
        if let Some(neighbor) = apply_move(problem, solution, mv, rng) {
            return neighbor;
        }
    }
    solution.clone()
}

/// Applies one move. Returns `None` when the move has no valid target.
pub fn apply_move<R: Rng>(
    problem: &BatchProblem,
    solution: &Solution,
    mv: Move,
    rng: &mut R,
) -> Option<Solution> {
    match mv {
        Move::Swap => swap(problem, solution, rng),
        Move::Relocate => relocate(problem, solution, rng),
        Move::Reverse => reverse(solution, rng),
    }
}

fn batch_family(problem: &BatchProblem, batch: &Batch) -> u32 {
    problem.family_of(batch.jobs()[0])
}

fn swap<R: Rng>(problem: &BatchProblem, solution: &Solution, rng: &mut R) -> Option<Solution> {
    let batches = solution.batches();
    if batches.len() < 2 {
        return None;
    }

    let a = rng.random_range(0..batches.len());
    let family = batch_family(problem, &batches[a]);
    let partners: Vec<usize> = (0..batches.len())
        .filter(|&b| b != a && batch_family(problem, &batches[b]) == family)
        .collect();
    if partners.is_empty() {
        return None;
    }
    let b = partners[rng.random_range(0..partners.len())];
    let i = rng.random_range(0..batches[a].len());
    let j = rng.random_range(0..batches[b].len());

    let mut next = solution.clone();
    let out = next.batches_mut();
    let (x, y) = (out[a].jobs()[i], out[b].jobs()[j]);
    out[a].jobs_mut()[i] = y;
    out[b].jobs_mut()[j] = x;
    Some(next)
}

fn relocate<R: Rng>(
    problem: &BatchProblem,
    solution: &Solution,
    rng: &mut R,
) -> Option<Solution> {
    let batches = solution.batches();
    if batches.is_empty() {
        return None;
    }
    let a = rng.random_range(0..batches.len());
    let family = batch_family(problem, &batches[a]);
    let targets: Vec<usize> = (0..batches.len())
        .filter(|&b| {
            b != a
                && batches[b].len() < problem.batch_capacity()
                && batch_family(problem, &batches[b]) == family
        })
        .collect();

    // Splitting a job off into its own batch only changes anything when
    // the source batch keeps other jobs.
    let can_split = batches[a].len() > 1;
    let options = targets.len() + usize::from(can_split);
    if options == 0 {
        return None;
    }

    let i = rng.random_range(0..batches[a].len());
    let choice = rng.random_range(0..options);

    let mut next = solution.clone();
    let out = next.batches_mut();
    let job = out[a].jobs_mut().remove(i);

    if choice < targets.len() {
        out[targets[choice]].jobs_mut().push(job);
        if out[a].is_empty() {
            out.remove(a);
        }
    } else {
        let pos = rng.random_range(0..=out.len());
        out.insert(pos, Batch::new(vec![job]));
    }
    Some(next)
}

fn reverse<R: Rng>(solution: &Solution, rng: &mut R) -> Option<Solution> {
    let len = solution.len();
    if len < 2 {
        return None;
    }
    let i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len - 1);
    if j >= i {
        j += 1;
    }
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };

    let mut next = solution.clone();
    next.batches_mut()[lo..=hi].reverse();
    Some(next)
}
