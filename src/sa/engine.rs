//! Annealing engine.
//!
//! # Phases
//!
//! Construction is the initialization step: parameters and problem are
//! validated, the initial solution is built and becomes both current and
//! best. The engine is then in [`Phase::CoolingLoop`]; each call to
//! [`AnnealingEngine::step_level`] runs `iterations_per_temp` Metropolis
//! steps at the current temperature and then cools. Once the temperature
//! is at or below `final_temperature` (or the iteration budget is spent,
//! or the run is cancelled) the engine is [`Phase::Terminated`].

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use super::config::{AnnealingParams, CoolingSchedule};
use super::types::AnnealProblem;
use crate::error::OptimizeError;

/// Temperatures at or below this never accept a worsening move.
pub const TEMPERATURE_EPSILON: f64 = 1e-12;

/// Metropolis acceptance probability `min(1, exp(-delta / T))`.
///
/// Always 1.0 for `delta <= 0`. Returns 0.0 for `T <= TEMPERATURE_EPSILON`
/// and for NaN inputs, so callers never divide by zero or compare against
/// NaN.
pub fn acceptance_probability(delta: f64, temperature: f64) -> f64 {
    if delta <= 0.0 {
        return 1.0;
    }
    if !(temperature > TEMPERATURE_EPSILON) {
        return 0.0;
    }
    let p = (-delta / temperature).exp();
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Engine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Running temperature levels.
    CoolingLoop,
    /// Finished; the best solution is final.
    Terminated,
}

/// Current and best solutions of a run.
///
/// `best` is a separate owned copy, never an alias of `current`, and only
/// changes on strict improvement.
#[derive(Debug, Clone)]
pub struct SearchState<S> {
    current: S,
    current_cost: f64,
    best: S,
    best_cost: f64,
}

impl<S: Clone> SearchState<S> {
    pub fn new(initial: S, cost: f64) -> Self {
        Self {
            best: initial.clone(),
            best_cost: cost,
            current: initial,
            current_cost: cost,
        }
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn current_cost(&self) -> f64 {
        self.current_cost
    }

    pub fn best(&self) -> &S {
        &self.best
    }

    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    /// Makes `solution` current. Returns `true` if it became the new best.
    pub fn move_to(&mut self, solution: S, cost: f64) -> bool {
        self.current = solution;
        self.current_cost = cost;
        if cost < self.best_cost {
            self.best = self.current.clone();
            self.best_cost = cost;
            true
        } else {
            false
        }
    }

    pub fn into_best(self) -> (S, f64) {
        (self.best, self.best_cost)
    }
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealingOutcome<S: Clone> {
    /// The best solution found.
    pub best: S,

    /// Cost of the best solution.
    pub best_cost: f64,

    /// Total number of neighbor evaluations.
    pub iterations: usize,

    /// Number of temperature levels completed.
    pub levels: usize,

    /// Temperature when the engine stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of moves with negative delta.
    pub improving_moves: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best cost after initialization and after every level.
    pub cost_history: Vec<f64>,
}

/// Simulated annealing state machine over an [`AnnealProblem`].
///
/// Owns its random source, so independent engines never share state.
pub struct AnnealingEngine<'a, P: AnnealProblem, R: Rng> {
    problem: &'a P,
    params: AnnealingParams,
    schedule: CoolingSchedule,
    rng: R,
    phase: Phase,
    state: SearchState<P::Solution>,
    temperature: f64,
    iterations: usize,
    levels: usize,
    accepted_moves: usize,
    improving_moves: usize,
    cost_history: Vec<f64>,
}

impl<'a, P: AnnealProblem, R: Rng> AnnealingEngine<'a, P, R> {
    /// Validates the inputs and builds the initial search state.
    ///
    /// Fails with [`OptimizeError::InvalidParameter`] or
    /// [`OptimizeError::InvalidProblem`] before any neighbor is evaluated.
    pub fn new(
        problem: &'a P,
        params: &AnnealingParams,
        mut rng: R,
    ) -> Result<Self, OptimizeError> {
        params.validate()?;
        let schedule = params.schedule()?;
        problem.validate()?;

        let initial = problem.initial_solution(&mut rng);
        let cost = problem.cost(&initial);

        let phase = if problem.is_trivial() {
            Phase::Terminated
        } else {
            Phase::CoolingLoop
        };

        Ok(Self {
            problem,
            params: params.clone(),
            schedule,
            rng,
            phase,
            state: SearchState::new(initial, cost),
            temperature: params.initial_temperature,
            iterations: 0,
            levels: 0,
            accepted_moves: 0,
            improving_moves: 0,
            cost_history: vec![cost],
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn state(&self) -> &SearchState<P::Solution> {
        &self.state
    }

    pub fn best_cost(&self) -> f64 {
        self.state.best_cost()
    }

    pub fn current_cost(&self) -> f64 {
        self.state.current_cost()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn levels_completed(&self) -> usize {
        self.levels
    }

    fn budget_exhausted(&self) -> bool {
        self.params.max_iterations > 0 && self.iterations >= self.params.max_iterations
    }

    /// Runs one temperature level and cools. No-op once terminated.
    pub fn step_level(&mut self) -> Phase {
        if self.phase == Phase::Terminated {
            return self.phase;
        }

        let temperature = self.temperature;
        let accepted_before = self.accepted_moves;

        for _ in 0..self.params.iterations_per_temp {
            if self.budget_exhausted() {
                break;
            }

            let neighbor = self.problem.neighbor(self.state.current(), &mut self.rng);
            let neighbor_cost = self.problem.cost(&neighbor);
            let delta = neighbor_cost - self.state.current_cost();

            // Metropolis acceptance criterion
            let accept = if delta <= 0.0 {
                true
            } else {
                let probability = acceptance_probability(delta, temperature);
                probability > 0.0 && self.rng.random_range(0.0..1.0) < probability
            };
            if delta < 0.0 {
                self.improving_moves += 1;
            }

            if accept {
                self.state.move_to(neighbor, neighbor_cost);
                self.accepted_moves += 1;
            }
            self.iterations += 1;
        }

        self.levels += 1;
        self.temperature = self.schedule.next_temperature(temperature);
        self.cost_history.push(self.state.best_cost());

        tracing::debug!(
            level = self.levels,
            temperature,
            accepted = self.accepted_moves - accepted_before,
            current_cost = self.state.current_cost(),
            best_cost = self.state.best_cost(),
            "annealing level done"
        );

        if self
            .schedule
            .is_frozen(self.temperature, self.params.final_temperature)
            || self.budget_exhausted()
        {
            self.phase = Phase::Terminated;
        }
        self.phase
    }

    /// Runs levels until termination.
    ///
    /// `cancel` is polled once per level, so a cancellation takes effect
    /// within `iterations_per_temp` steps.
    pub fn run(mut self, cancel: Option<&AtomicBool>) -> AnnealingOutcome<P::Solution> {
        let mut cancelled = false;
        while self.phase == Phase::CoolingLoop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                tracing::debug!(level = self.levels, "annealing cancelled");
                cancelled = true;
                self.phase = Phase::Terminated;
                break;
            }
            self.step_level();
        }
        self.into_outcome(cancelled)
    }

    /// Stops the engine where it is and returns the best solution so far.
    pub fn finish(self) -> AnnealingOutcome<P::Solution> {
        self.into_outcome(false)
    }

    fn into_outcome(self, cancelled: bool) -> AnnealingOutcome<P::Solution> {
        let (best, best_cost) = self.state.into_best();
        AnnealingOutcome {
            best,
            best_cost,
            iterations: self.iterations,
            levels: self.levels,
            final_temperature: self.temperature,
            accepted_moves: self.accepted_moves,
            improving_moves: self.improving_moves,
            cancelled,
            cost_history: self.cost_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{BatchProblem, Job};
    use crate::random::create_rng;
    use crate::solution::{generate_neighbor, InitialStrategy, NeighborWeights, Solution};
    use std::sync::atomic::AtomicUsize;

    // ---- Batch search over a BatchProblem ----

    struct BatchFixture {
        problem: BatchProblem,
        weights: NeighborWeights,
    }

    impl BatchFixture {
        fn new(problem: BatchProblem) -> Self {
            Self {
                problem,
                weights: NeighborWeights::default(),
            }
        }
    }

    impl AnnealProblem for BatchFixture {
        type Solution = Solution;

        fn initial_solution<R: Rng>(&self, rng: &mut R) -> Solution {
            InitialStrategy::Random.build(&self.problem, rng)
        }

        fn cost(&self, solution: &Solution) -> f64 {
            self.problem.cost(solution)
        }

        fn neighbor<R: Rng>(&self, solution: &Solution, rng: &mut R) -> Solution {
            generate_neighbor(&self.problem, solution, &self.weights, rng)
        }
    }

    /// One family, capacity 2: the optimum pairs {1, 2} then {9, 10} for a
    /// total weighted completion of 2*2 + 2*12 = 28.
    fn four_jobs() -> BatchFixture {
        let jobs = vec![
            Job::new("a", 10.0),
            Job::new("b", 1.0),
            Job::new("c", 9.0),
            Job::new("d", 2.0),
        ];
        BatchFixture::new(BatchProblem::new(jobs, 2).unwrap())
    }

    fn mixed(n: usize) -> BatchFixture {
        let jobs = (0..n)
            .map(|i| {
                Job::new(format!("J{i}"), 1.0 + ((i * 13) % 7) as f64)
                    .with_weight(1.0 + (i % 3) as f64)
                    .with_family(i as u32 % 2)
            })
            .collect();
        BatchFixture::new(BatchProblem::new(jobs, 3).unwrap())
    }

    fn params() -> AnnealingParams {
        AnnealingParams::default()
            .with_initial_temperature(100.0)
            .with_final_temperature(0.001)
            .with_cooling_rate(0.95)
            .with_iterations_per_temp(50)
            .with_seed(42)
    }

    fn run(problem: &BatchFixture, params: &AnnealingParams) -> AnnealingOutcome<Solution> {
        AnnealingEngine::new(problem, params, create_rng(42))
            .unwrap()
            .run(None)
    }

    #[test]
    fn test_batch_search_reaches_optimum() {
        let fixture = four_jobs();
        let result = run(&fixture, &params());
        assert_eq!(result.best_cost, 28.0);
        assert!(result.best.is_valid_for(&fixture.problem));
        assert_eq!(result.best_cost, fixture.problem.cost(&result.best));
        assert!(result.accepted_moves >= result.improving_moves);
    }

    #[test]
    fn test_level_count_matches_schedule() {
        let params = AnnealingParams::default()
            .with_initial_temperature(100.0)
            .with_final_temperature(1.0)
            .with_cooling_rate(0.95)
            .with_iterations_per_temp(3);
        let result = run(&mixed(8), &params);
        assert_eq!(result.levels, 90);
        assert_eq!(result.iterations, 270);
        assert!(result.final_temperature <= 1.0);
        assert_eq!(result.cost_history.len(), 91);
    }

    #[test]
    fn test_temperature_strictly_decreasing_per_level() {
        let fixture = mixed(6);
        let mut engine = AnnealingEngine::new(&fixture, &params(), create_rng(1)).unwrap();
        let mut last = engine.temperature();
        while engine.phase() == Phase::CoolingLoop {
            engine.step_level();
            assert!(engine.temperature() < last);
            last = engine.temperature();
        }
        assert!(last <= 0.001);
    }

    #[test]
    fn test_max_iterations_limit() {
        let params = AnnealingParams::default()
            .with_initial_temperature(1e10)
            .with_final_temperature(1e-15)
            .with_iterations_per_temp(10)
            .with_max_iterations(95);
        let result = run(&mixed(10), &params);
        assert_eq!(result.iterations, 95);
        assert_eq!(result.levels, 10);
    }

    #[test]
    fn test_cancellation() {
        // Flag set before running: deterministic regardless of speed.
        let cancel = AtomicBool::new(true);
        let fixture = mixed(10);
        let engine = AnnealingEngine::new(&fixture, &params(), create_rng(42)).unwrap();
        let result = engine.run(Some(&cancel));
        assert!(result.cancelled);
        assert_eq!(result.levels, 0);
        assert_eq!(result.iterations, 0);
        assert!(result.best.is_valid_for(&fixture.problem));
    }

    #[test]
    fn test_best_cost_never_regresses() {
        let result = run(&mixed(15), &params());
        for window in result.cost_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best cost history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let fixture = mixed(12);
        let a = run(&fixture, &params());
        let b = run(&fixture, &params());
        assert_eq!(a.best, b.best);
        assert_eq!(a.best_cost, b.best_cost);
        assert_eq!(a.iterations, b.iterations);
        assert_eq!(a.cost_history, b.cost_history);
    }

    #[test]
    fn test_metropolis_accepts_uphill_at_high_temperature() {
        let params = AnnealingParams::default()
            .with_initial_temperature(1e8)
            .with_final_temperature(1e7)
            .with_cooling_rate(0.99)
            .with_iterations_per_temp(200);
        let result = run(&mixed(20), &params);
        let ratio = result.accepted_moves as f64 / result.iterations as f64;
        assert!(ratio > 0.8, "expected high acceptance at high temp, got {ratio}");
    }

    #[test]
    fn test_acceptance_probability() {
        assert_eq!(acceptance_probability(-5.0, 10.0), 1.0);
        assert_eq!(acceptance_probability(0.0, 10.0), 1.0);
        assert_eq!(acceptance_probability(-1.0, 0.0), 1.0);
        assert_eq!(acceptance_probability(1.0, 0.0), 0.0);
        assert_eq!(acceptance_probability(1.0, 1e-300), 0.0);
        assert_eq!(acceptance_probability(f64::NAN, 1.0), 0.0);
        assert_eq!(acceptance_probability(1.0, f64::NAN), 0.0);
        assert_eq!(acceptance_probability(1e308, 1e-10), 0.0);
        let p = acceptance_probability(1.0, 1.0);
        assert!((p - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_search_state_two_slots() {
        let mut state = SearchState::new(vec![1, 2, 3], 10.0);
        assert!(state.move_to(vec![3, 2, 1], 5.0));
        assert!(!state.move_to(vec![2, 3, 1], 8.0));
        assert_eq!(state.current(), &vec![2, 3, 1]);
        assert_eq!(state.best(), &vec![3, 2, 1]);
        assert_eq!(state.best_cost(), 5.0);
        // equal cost is not an improvement
        assert!(!state.move_to(vec![1, 3, 2], 5.0));
        assert_eq!(state.best(), &vec![3, 2, 1]);
    }

    // ---- Counting problem: checks nothing runs on bad input ----

    #[derive(Default)]
    struct CountingProblem {
        evaluations: AtomicUsize,
        trivial: bool,
    }

    impl AnnealProblem for CountingProblem {
        type Solution = u32;

        fn is_trivial(&self) -> bool {
            self.trivial
        }

        fn initial_solution<R: Rng>(&self, _rng: &mut R) -> u32 {
            7
        }

        fn cost(&self, x: &u32) -> f64 {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
            *x as f64
        }

        fn neighbor<R: Rng>(&self, x: &u32, _rng: &mut R) -> u32 {
            x.saturating_sub(1)
        }
    }

    #[test]
    fn test_invalid_cooling_rate_fails_before_any_work() {
        let problem = CountingProblem::default();
        let params = AnnealingParams::default().with_cooling_rate(1.0);
        let err = AnnealingEngine::new(&problem, &params, create_rng(0))
            .err()
            .unwrap();
        assert!(matches!(err, OptimizeError::InvalidParameter(_)));
        assert_eq!(problem.evaluations.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_trivial_problem_terminates_immediately() {
        let problem = CountingProblem {
            trivial: true,
            ..CountingProblem::default()
        };
        let engine = AnnealingEngine::new(&problem, &params(), create_rng(0)).unwrap();
        assert_eq!(engine.phase(), Phase::Terminated);
        let result = engine.run(None);
        assert_eq!(result.best, 7);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.levels, 0);
        assert_eq!(problem.evaluations.load(Ordering::Relaxed), 1);
    }
}
