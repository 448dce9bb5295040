//! Optimization budget with one fixed axis

use crate::error::checked_div;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which budget quantity the user fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetAxis {
    /// Wall-clock seconds
    Time,
    /// Optimizer iterations (points)
    Iterations,
}

impl fmt::Display for BudgetAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Time => "time",
            Self::Iterations => "iter",
        })
    }
}

/// Optimization budget. One axis is fixed, the other derived through the
/// workflow's runtime per point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    fixed: BudgetAxis,
    time_seconds: f64,
    iterations: u64,
}

impl Budget {
    /// Fix the time budget; iterations = `floor(seconds / runtime_per_point)`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for a negative or non-finite budget
    /// - [`Error::Degenerate`] for a zero runtime per point
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_time(seconds: f64, runtime_per_point: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::InvalidInput(format!(
                "time budget must be finite and non-negative, got {seconds}"
            )));
        }
        let iterations = checked_div(seconds, runtime_per_point, "iteration budget")?.floor();
        Ok(Self {
            fixed: BudgetAxis::Time,
            time_seconds: seconds,
            iterations: iterations as u64,
        })
    }

    /// Fix the iteration budget; time = `iterations * runtime_per_point`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Degenerate`] if the derived time is not finite.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_iterations(iterations: u64, runtime_per_point: f64) -> Result<Self> {
        let time_seconds = iterations as f64 * runtime_per_point;
        if !time_seconds.is_finite() {
            return Err(Error::Degenerate(format!(
                "time budget: non-finite result ({iterations} * {runtime_per_point})"
            )));
        }
        Ok(Self {
            fixed: BudgetAxis::Iterations,
            time_seconds,
            iterations,
        })
    }

    /// The fixed axis.
    #[must_use]
    pub const fn fixed(&self) -> BudgetAxis {
        self.fixed
    }

    /// Time budget in seconds.
    #[must_use]
    pub const fn time_seconds(&self) -> f64 {
        self.time_seconds
    }

    /// Iteration budget.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }
}
