//! Core trait for the annealing engine.

use rand::Rng;

use crate::error::OptimizeError;

/// A problem the annealing engine can search.
///
/// The implementor supplies the initial solution, cost evaluation and
/// neighbor generation. The engine handles temperature, the Metropolis
/// criterion and best-solution tracking.
///
/// # Minimization
///
/// The engine minimizes [`cost`](Self::cost). For maximization, negate it.
///
/// # Examples
///
/// ```ignore
/// struct TspProblem { distances: Vec<Vec<f64>> }
///
/// impl AnnealProblem for TspProblem {
///     type Solution = Vec<usize>;
///
///     fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
///         let mut tour: Vec<usize> = (0..self.distances.len()).collect();
///         tour.shuffle(rng);
///         tour
///     }
///
///     fn cost(&self, tour: &Vec<usize>) -> f64 {
///         tour.windows(2).map(|w| self.distances[w[0]][w[1]]).sum()
///     }
///
///     fn neighbor<R: Rng>(&self, tour: &Vec<usize>, rng: &mut R) -> Vec<usize> {
///         let mut new = tour.clone();
///         let i = rng.random_range(0..new.len());
///         let j = rng.random_range(0..new.len());
///         new.swap(i, j);
///         new
///     }
/// }
/// ```
pub trait AnnealProblem: Send + Sync {
    /// The solution representation type.
    type Solution: Clone + Send;

    /// Checked once before the initial solution is built.
    fn validate(&self) -> Result<(), OptimizeError> {
        Ok(())
    }

    /// `true` when the search space holds a single solution, so the engine
    /// can stop right after initialization.
    fn is_trivial(&self) -> bool {
        false
    }

    /// Creates the starting solution.
    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Self::Solution;

    /// Computes the cost of a solution. Lower is better. Must be pure.
    fn cost(&self, solution: &Self::Solution) -> f64;

    /// Generates a neighbor of `solution` without modifying it.
    ///
    /// The neighborhood must be connected: any solution reachable from
    /// any other through a sequence of moves.
    fn neighbor<R: Rng>(&self, solution: &Self::Solution, rng: &mut R) -> Self::Solution;
}
