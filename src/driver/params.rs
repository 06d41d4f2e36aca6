//! Optimizer parameters.

use crate::error::OptimizeError;
use crate::sa::AnnealingParams;
use crate::solution::{InitialStrategy, NeighborWeights};

/// Parameters for [`optimize`](super::optimize).
///
/// Annealing keys sit at the top level when (de)serialized, so a plain
/// `{"cooling_rate": 0.9}` overrides one value and leaves the rest at
/// their defaults.
///
/// # Examples
///
/// ```
/// use batch_anneal::driver::OptimizerParams;
/// use batch_anneal::solution::InitialStrategy;
///
/// let params = OptimizerParams::default()
///     .with_initial_temperature(500.0)
///     .with_iterations_per_temp(100)
///     .with_initial_strategy(InitialStrategy::Greedy)
///     .with_seed(7);
/// assert_eq!(params.annealing.iterations_per_temp, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct OptimizerParams {
    /// Temperature schedule, iteration counts and seed.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub annealing: AnnealingParams,

    /// How the starting solution is built.
    pub initial_strategy: InitialStrategy,

    /// Neighbor move mix.
    pub neighbor_weights: NeighborWeights,
}

impl OptimizerParams {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.annealing.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.annealing.final_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.annealing.cooling_rate = rate;
        self
    }

    pub fn with_iterations_per_temp(mut self, n: usize) -> Self {
        self.annealing.iterations_per_temp = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.annealing.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.annealing.seed = Some(seed);
        self
    }

    pub fn with_initial_strategy(mut self, strategy: InitialStrategy) -> Self {
        self.initial_strategy = strategy;
        self
    }

    pub fn with_neighbor_weights(mut self, weights: NeighborWeights) -> Self {
        self.neighbor_weights = weights;
        self
    }

    pub fn validate(&self) -> Result<(), OptimizeError> {
        self.annealing.validate()?;
        self.neighbor_weights.validate()
    }
}
