//! Annealing parameters and the cooling schedule.

use crate::error::OptimizeError;

/// Geometric cooling: `T_{k+1} = rate * T_k`.
///
/// With `0 < rate < 1` the temperature sequence is strictly decreasing,
/// so the loop reaches any positive floor in a bounded number of levels.
///
/// # Examples
///
/// ```
/// use batch_anneal::sa::CoolingSchedule;
///
/// let schedule = CoolingSchedule::new(0.95).unwrap();
/// assert_eq!(schedule.levels(100.0, 1.0), 90);
/// assert!(CoolingSchedule::new(1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolingSchedule {
    rate: f64,
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        Self { rate: 0.95 }
    }
}

impl CoolingSchedule {
    /// Creates a schedule. `cooling_rate` must lie strictly inside (0, 1).
    pub fn new(cooling_rate: f64) -> Result<Self, OptimizeError> {
        if !(cooling_rate > 0.0 && cooling_rate < 1.0) {
            return Err(OptimizeError::parameter(format!(
                "cooling_rate must be in (0, 1), got {cooling_rate}"
            )));
        }
        Ok(Self { rate: cooling_rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Temperature of the next level.
    #[inline]
    pub fn next_temperature(&self, current: f64) -> f64 {
        current * self.rate
    }

    /// Whether the search should stop at `temperature`.
    #[inline]
    pub fn is_frozen(&self, temperature: f64, final_temperature: f64) -> bool {
        temperature <= final_temperature
    }

    /// Number of temperature levels run between `initial` and `final_t`.
    ///
    /// Equals `ceil(ln(final_t / initial) / ln(rate))`. Counted by stepping
    /// the schedule so the result matches the engine exactly even when the
    /// ratio is an exact power of the rate. Returns 0 when `initial` is not
    /// finite or `final_t` is not positive: geometric decay never reaches
    /// such a bound.
    pub fn levels(&self, initial: f64, final_t: f64) -> usize {
        if !(initial.is_finite() && final_t > 0.0) {
            return 0;
        }
        let mut t = initial;
        let mut levels = 0;
        while !self.is_frozen(t, final_t) {
            t = self.next_temperature(t);
            levels += 1;
        }
        levels
    }
}

/// Parameters of an annealing run.
///
/// # Examples
///
/// ```
/// use batch_anneal::sa::AnnealingParams;
///
/// let params = AnnealingParams::default()
///     .with_initial_temperature(100.0)
///     .with_final_temperature(0.5)
///     .with_cooling_rate(0.9)
///     .with_iterations_per_temp(200)
///     .with_seed(42);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AnnealingParams {
    /// Starting temperature. Higher values accept more early worsening moves.
    pub initial_temperature: f64,

    /// The loop stops once the temperature is at or below this value.
    pub final_temperature: f64,

    /// Per-level multiplicative decay, in (0, 1).
    pub cooling_rate: f64,

    /// Neighbor evaluations per temperature level.
    pub iterations_per_temp: usize,

    /// Hard budget on total neighbor evaluations. 0 = no limit.
    pub max_iterations: usize,

    /// Random seed for reproducibility. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for AnnealingParams {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            final_temperature: 1.0,
            cooling_rate: 0.95,
            iterations_per_temp: 10_000,
            max_iterations: 0,
            seed: None,
        }
    }
}

impl AnnealingParams {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.final_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_iterations_per_temp(mut self, n: usize) -> Self {
        self.iterations_per_temp = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Cooling schedule for these parameters.
    pub fn schedule(&self) -> Result<CoolingSchedule, OptimizeError> {
        CoolingSchedule::new(self.cooling_rate)
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(OptimizeError::parameter(format!(
                "initial_temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        if !self.final_temperature.is_finite() || self.final_temperature <= 0.0 {
            return Err(OptimizeError::parameter(format!(
                "final_temperature must be positive, got {}",
                self.final_temperature
            )));
        }
        if self.final_temperature >= self.initial_temperature {
            return Err(OptimizeError::parameter(
                "final_temperature must be less than initial_temperature",
            ));
        }
        if self.iterations_per_temp == 0 {
            return Err(OptimizeError::parameter(
                "iterations_per_temp must be positive",
            ));
        }
        self.schedule()?;
        Ok(())
    }
}
