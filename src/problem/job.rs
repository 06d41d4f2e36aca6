//! Job model.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

/// A job to be batched and scheduled.
///
/// Jobs are immutable once handed to a [`BatchProblem`](super::BatchProblem);
/// solutions refer to them by index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Processing time. Must be positive and finite.
    pub processing_time: f64,
    /// Objective weight (default 1.0). Must be non-negative.
    #[cfg_attr(feature = "serde", serde(default = "default_weight"))]
    pub weight: f64,
    /// Due date, used by the tardiness objective. `None` = no due date.
    #[cfg_attr(feature = "serde", serde(default))]
    pub due_date: Option<f64>,
    /// Job family. Only jobs of the same family may share a batch.
    #[cfg_attr(feature = "serde", serde(default))]
    pub family: u32,
}

#[cfg(feature = "serde")]
fn default_weight() -> f64 {
    1.0
}

impl Job {
    /// Creates a job with weight 1, no due date, family 0.
    pub fn new(id: impl Into<String>, processing_time: f64) -> Self {
        Self {
            id: id.into(),
            processing_time,
            weight: 1.0,
            due_date: None,
            family: 0,
        }
    }

    /// Sets the objective weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due_date: f64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the job family.
    pub fn with_family(mut self, family: u32) -> Self {
        self.family = family;
        self
    }

    /// Weighted shortest processing time ratio. Zero-weight jobs sort last.
    pub fn wspt_ratio(&self) -> f64 {
        if self.weight > 0.0 {
            self.processing_time / self.weight
        } else {
            f64::INFINITY
        }
    }
}
