//! Optimization entry points.

use std::sync::atomic::AtomicBool;

use rand::Rng;

use super::params::OptimizerParams;
use crate::error::OptimizeError;
use crate::problem::{BatchProblem, ScheduledBatch};
use crate::random::{create_rng, rng_from_option};
use crate::sa::{AnnealProblem, AnnealingEngine};
use crate::solution::{generate_neighbor, InitialStrategy, NeighborWeights, Solution};

/// A [`BatchProblem`] paired with the search settings the engine needs.
struct BatchSearch<'a> {
    problem: &'a BatchProblem,
    initial_strategy: InitialStrategy,
    neighbor_weights: NeighborWeights,
    warm_start: Option<&'a Solution>,
}

impl AnnealProblem for BatchSearch<'_> {
    type Solution = Solution;

    fn validate(&self) -> Result<(), OptimizeError> {
        self.neighbor_weights.validate()?;
        self.problem.validate()?;
        match self.warm_start {
            Some(start) if !start.is_valid_for(self.problem) => Err(OptimizeError::problem(
                "initial solution must cover every job exactly once within capacity and family",
            )),
            _ => Ok(()),
        }
    }

    fn is_trivial(&self) -> bool {
        self.problem.job_count() == 1
    }

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Solution {
        match self.warm_start {
            Some(start) => start.clone(),
            None => self.initial_strategy.build(self.problem, rng),
        }
    }

    fn cost(&self, solution: &Solution) -> f64 {
        self.problem.cost(solution)
    }

    fn neighbor<R: Rng>(&self, solution: &Solution, rng: &mut R) -> Solution {
        generate_neighbor(self.problem, solution, &self.neighbor_weights, rng)
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    /// Best solution found.
    pub solution: Solution,

    /// Objective value of `solution`.
    pub cost: f64,

    /// Total neighbor evaluations.
    pub iterations: usize,

    /// Temperature levels completed.
    pub levels: usize,

    /// Accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Moves that lowered the current cost.
    pub improving_moves: usize,

    /// Whether the run stopped on a cancellation signal.
    pub cancelled: bool,

    /// Best cost after initialization and after every level.
    pub cost_history: Vec<f64>,

    /// `solution` decoded onto machine timelines.
    pub schedule: Vec<ScheduledBatch>,
}

impl OptimizeResult {
    /// `(solution, cost, iterations)`.
    pub fn into_parts(self) -> (Solution, f64, usize) {
        (self.solution, self.cost, self.iterations)
    }
}

/// Optimizes `problem` with `params`.
///
/// Uses `params.annealing.seed` when set, entropy otherwise.
///
/// # Examples
///
/// ```
/// use batch_anneal::driver::{optimize, OptimizerParams};
/// use batch_anneal::problem::{BatchProblem, Job};
///
/// let jobs = vec![Job::new("a", 3.0), Job::new("b", 1.0), Job::new("c", 2.0)];
/// let problem = BatchProblem::new(jobs, 2).unwrap();
/// let params = OptimizerParams::default()
///     .with_initial_temperature(10.0)
///     .with_iterations_per_temp(20)
///     .with_seed(42);
///
/// let result = optimize(&problem, &params).unwrap();
/// assert!(result.solution.is_valid_for(&problem));
/// ```
pub fn optimize(
    problem: &BatchProblem,
    params: &OptimizerParams,
) -> Result<OptimizeResult, OptimizeError> {
    optimize_with_cancel(problem, params, None)
}

/// Like [`optimize`], stopping early once `cancel` is set.
///
/// The flag is checked once per temperature level.
pub fn optimize_with_cancel(
    problem: &BatchProblem,
    params: &OptimizerParams,
    cancel: Option<&AtomicBool>,
) -> Result<OptimizeResult, OptimizeError> {
    let rng = rng_from_option(params.annealing.seed);
    optimize_with_rng(problem, params, rng, cancel)
}

/// Like [`optimize_with_cancel`] with a caller-supplied random source.
///
/// `params.annealing.seed` is ignored.
pub fn optimize_with_rng<R: Rng>(
    problem: &BatchProblem,
    params: &OptimizerParams,
    rng: R,
    cancel: Option<&AtomicBool>,
) -> Result<OptimizeResult, OptimizeError> {
    let search = BatchSearch {
        problem,
        initial_strategy: params.initial_strategy,
        neighbor_weights: params.neighbor_weights,
        warm_start: None,
    };
    anneal(&search, params, rng, cancel)
}

/// Optimizes `problem` starting from `initial` instead of a constructed
/// solution.
///
/// `params.initial_strategy` is ignored. Fails with
/// [`OptimizeError::InvalidProblem`] before any search work when `initial`
/// is not feasible for `problem`. Since the best solution only changes on
/// strict improvement, an optimal start is returned as given.
///
/// # Examples
///
/// ```
/// use batch_anneal::driver::{optimize_from, OptimizerParams};
/// use batch_anneal::problem::{BatchProblem, Job};
/// use batch_anneal::solution::Solution;
///
/// let jobs = vec![Job::new("a", 3.0), Job::new("b", 1.0), Job::new("c", 2.0)];
/// let problem = BatchProblem::new(jobs, 2).unwrap();
/// let start = Solution::from_batches(vec![vec![1, 2], vec![0]]);
/// let params = OptimizerParams::default()
///     .with_initial_temperature(10.0)
///     .with_iterations_per_temp(20)
///     .with_seed(42);
///
/// let result = optimize_from(&problem, &params, &start).unwrap();
/// assert!(result.cost <= problem.cost(&start));
/// ```
pub fn optimize_from(
    problem: &BatchProblem,
    params: &OptimizerParams,
    initial: &Solution,
) -> Result<OptimizeResult, OptimizeError> {
    let search = BatchSearch {
        problem,
        initial_strategy: params.initial_strategy,
        neighbor_weights: params.neighbor_weights,
        warm_start: Some(initial),
    };
    anneal(&search, params, rng_from_option(params.annealing.seed), None)
}

#[tracing::instrument(
    level = "debug",
    name = "optimize",
    skip_all,
    fields(jobs = search.problem.job_count(), warm_start = search.warm_start.is_some())
)]
fn anneal<R: Rng>(
    search: &BatchSearch<'_>,
    params: &OptimizerParams,
    rng: R,
    cancel: Option<&AtomicBool>,
) -> Result<OptimizeResult, OptimizeError> {
    let problem = search.problem;
    let engine = AnnealingEngine::new(search, &params.annealing, rng).inspect_err(|e| {
        tracing::warn!(error = %e, "optimizer setup rejected");
    })?;

    tracing::info!(
        jobs = problem.job_count(),
        machines = problem.machines(),
        batch_capacity = problem.batch_capacity(),
        initial_cost = engine.best_cost(),
        "annealing started"
    );

    let outcome = engine.run(cancel);

    tracing::info!(
        best_cost = outcome.best_cost,
        iterations = outcome.iterations,
        levels = outcome.levels,
        cancelled = outcome.cancelled,
        "annealing finished"
    );

    let schedule = problem.schedule(&outcome.best);
    Ok(OptimizeResult {
        solution: outcome.best,
        cost: outcome.best_cost,
        iterations: outcome.iterations,
        levels: outcome.levels,
        accepted_moves: outcome.accepted_moves,
        improving_moves: outcome.improving_moves,
        cancelled: outcome.cancelled,
        cost_history: outcome.cost_history,
        schedule,
    })
}

/// Runs `starts` independent searches and returns the best one.
///
/// Start `i` is seeded with `seed + i` (the base seed is drawn from
/// entropy when `params.annealing.seed` is `None`). Ties go to the lowest
/// start index. With the `parallel` feature the starts run on rayon and
/// return the same result as the sequential path.
pub fn optimize_multi_start(
    problem: &BatchProblem,
    params: &OptimizerParams,
    starts: usize,
) -> Result<OptimizeResult, OptimizeError> {
    if starts == 0 {
        return Err(OptimizeError::parameter("starts must be positive"));
    }
    params.validate()?;

    let base = params.annealing.seed.unwrap_or_else(rand::random);
    let run_start = |i: usize| {
        let rng = create_rng(base.wrapping_add(i as u64));
        optimize_with_rng(problem, params, rng, None)
    };

    #[cfg(feature = "parallel")]
    let runs: Vec<Result<OptimizeResult, OptimizeError>> = {
        use rayon::prelude::*;
        (0..starts).into_par_iter().map(run_start).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let runs: Vec<Result<OptimizeResult, OptimizeError>> = (0..starts).map(run_start).collect();

    let mut best: Option<OptimizeResult> = None;
    for run in runs {
        let run = run?;
        if best.as_ref().is_none_or(|b| run.cost < b.cost) {
            best = Some(run);
        }
    }
    best.ok_or_else(|| OptimizeError::parameter("starts must be positive"))
}
