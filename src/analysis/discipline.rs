//! Per-discipline call statistics

use crate::samples::SampleStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Elapsed-time samples of one discipline within one run (or, after
/// combining, within the whole workflow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplineAnalysis {
    run_id: String,
    discipline_id: String,
    call_runtimes: Vec<f64>,
}

impl DisciplineAnalysis {
    /// Create an empty analysis.
    #[must_use]
    pub fn new(run_id: impl Into<String>, discipline_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            discipline_id: discipline_id.into(),
            call_runtimes: Vec::new(),
        }
    }

    /// Get the owning run id.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the discipline id.
    #[must_use]
    pub fn discipline_id(&self) -> &str {
        &self.discipline_id
    }

    /// Elapsed seconds of every recorded call, in order.
    #[must_use]
    pub fn call_runtimes(&self) -> &[f64] {
        &self.call_runtimes
    }

    /// Record one call.
    pub fn add_call(&mut self, elapsed_seconds: f64) {
        self.call_runtimes.push(elapsed_seconds);
    }

    /// Append the calls of `other` after the calls of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisciplineMismatch`] if `other` tracks another
    /// discipline.
    pub fn combine(&mut self, other: &Self) -> Result<()> {
        if self.discipline_id != other.discipline_id {
            return Err(Error::DisciplineMismatch {
                expected: self.discipline_id.clone(),
                found: other.discipline_id.clone(),
            });
        }
        self.call_runtimes.extend_from_slice(&other.call_runtimes);
        Ok(())
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn n_calls(&self) -> usize {
        self.call_runtimes.len()
    }

    /// Shortest call.
    #[must_use]
    pub fn min_runtime(&self) -> Option<f64> {
        self.call_runtimes.iter().copied().reduce(f64::min)
    }

    /// Longest call.
    #[must_use]
    pub fn max_runtime(&self) -> Option<f64> {
        self.call_runtimes.iter().copied().reduce(f64::max)
    }

    /// Longest minus shortest call.
    #[must_use]
    pub fn runtime_spread(&self) -> Option<f64> {
        Some(self.max_runtime()? - self.min_runtime()?)
    }

    /// Sum of all calls.
    #[must_use]
    pub fn total_runtime(&self) -> Option<f64> {
        if self.call_runtimes.is_empty() {
            None
        } else {
            Some(self.call_runtimes.iter().sum())
        }
    }

    /// Mean call duration.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_runtime(&self) -> Option<f64> {
        Some(self.total_runtime()? / self.n_calls() as f64)
    }

    /// Sample standard deviation (n - 1 denominator); needs two calls.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn std_runtime(&self) -> Option<f64> {
        if self.n_calls() < 2 {
            return None;
        }
        let mean = self.mean_runtime()?;
        let sum_sq: f64 = self.call_runtimes.iter().map(|t| (t - mean).powi(2)).sum();
        Some((sum_sq / (self.n_calls() - 1) as f64).sqrt())
    }

    /// Number of inputs of this discipline whose recorded samples vary.
    ///
    /// # Errors
    ///
    /// Propagates sample store failures.
    pub fn significant_variable_count(&self, store: &dyn SampleStore) -> Result<usize> {
        Ok(store.samples(&self.discipline_id)?.significant_variable_count())
    }
}
