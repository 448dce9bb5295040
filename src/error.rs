//! Error types for the surrogate advisor
//!
//! Three families of failure exist: precondition violations (caller asked for
//! something the current state cannot answer), arithmetic degeneracy (a
//! divisor is zero or a result would not be finite) and data consistency
//! (mismatched discipline identities). All of them are deterministic.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Surrogate advisor error types
#[derive(Error, Debug)]
pub enum Error {
    /// Generic precondition violation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A component or candidate member does not name a known discipline
    #[error("Unknown discipline: {0}\nCheck the workflow definition the analysis was built from")]
    UnknownDiscipline(String),

    /// Two disciplines share the same identifier
    #[error("Duplicate discipline identifier: {0}\nDiscipline ids must be unique within a workflow")]
    DuplicateDiscipline(String),

    /// Combining analyses of two different disciplines
    #[error("Discipline mismatch: expected {expected}, found {found}\nOnly analyses of the same discipline can be combined")]
    DisciplineMismatch {
        /// Discipline id of the receiving analysis
        expected: String,
        /// Discipline id of the analysis being merged in
        found: String,
    },

    /// No run with the given identifier is part of the analysis
    #[error("Unknown run: {0}")]
    UnknownRun(String),

    /// Sample-advisor heuristic name not recognised
    #[error("Unknown sample advisor: {0}\nExpected one of: jia, kaufman, jones")]
    UnknownHeuristic(String),

    /// Accuracy profile name not recognised
    #[error("Unknown profile: {0}\nExpected one of: efficient, advised, conservative")]
    UnknownProfile(String),

    /// Neither the time nor the iteration budget has been fixed
    #[error("No optimization budget fixed\nCall set_optimization_time_budget or set_optimization_iteration_budget first")]
    BudgetNotFixed,

    /// Strategy or advise data requested before any candidate was analyzed
    #[error("No strategies analyzed\nCall analyze_strategies or build_advise with at least one candidate first")]
    NotAnalyzed,

    /// Workflow scores requested before any timeline was added
    #[error("Workflow not scored\nAdd at least one run timeline before querying scores or metrics")]
    NotScored,

    /// Division by zero or non-finite result
    #[error("Degenerate computation: {0}")]
    Degenerate(String),

    /// Parquet export error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Divide `numerator` by `denominator`, surfacing degeneracy instead of
/// producing `NaN` or infinity.
///
/// # Errors
///
/// Returns [`Error::Degenerate`] when the denominator is zero or the quotient
/// is not finite.
pub(crate) fn checked_div(numerator: f64, denominator: f64, what: &str) -> Result<f64> {
    if denominator == 0.0 {
        return Err(Error::Degenerate(format!("{what}: division by zero")));
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        Ok(quotient)
    } else {
        Err(Error::Degenerate(format!(
            "{what}: non-finite result ({numerator} / {denominator})"
        )))
    }
}
