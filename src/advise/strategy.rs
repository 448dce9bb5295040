//! Per-candidate replacement economics

use crate::analysis::WorkflowAnalysis;
use crate::error::checked_div;
use crate::process::{io_for_replaced, BoundaryIo, CandidateGroup, DesignGraph};
use crate::samples::SampleStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slack on the summed runtime share before it counts as exceeding the run.
const RUNTIME_SHARE_TOLERANCE: f64 = 1e-9;

/// Derived economic quantities of replacing one candidate group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    candidate: CandidateGroup,
    boundary: BoundaryIo,
    combined_normalized_runtime: f64,
    expected_iterations: f64,
    training_time_per_sample: f64,
    new_runtime_per_point: f64,
    available_samples: usize,
}

impl Strategy {
    /// Compute the strategy of `candidate` from the current workflow scores.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for an empty candidate
    /// - [`Error::NotScored`] if the workflow has no runs
    /// - [`Error::UnknownDiscipline`] for a member outside the workflow
    /// - [`Error::Degenerate`] if an unconverged candidate has a member that
    ///   was never called, the members account for more than the measured
    ///   runtime, or the runtime per point with the surrogate is not positive
    pub fn analyze(
        candidate: &CandidateGroup,
        workflow: &WorkflowAnalysis,
        graph: &dyn DesignGraph,
        store: &dyn SampleStore,
        surrogate_prediction_cost: f64,
    ) -> Result<Self> {
        if candidate.is_empty() {
            return Err(Error::InvalidInput("candidate group has no members".to_string()));
        }

        let boundary = io_for_replaced(graph, candidate, true)?;
        let t_wf = workflow.runtime_per_point()?;

        let mut combined_normalized_runtime = 0.0;
        let mut expected_iterations = f64::INFINITY;
        let mut training_time = 0.0;
        let mut available_samples = usize::MAX;

        for member in candidate.members() {
            let discipline = workflow.discipline(member)?;
            let score = workflow.get_discipline_score(discipline.id())?;
            let analysis = workflow.get_discipline_analysis(discipline.id())?;

            combined_normalized_runtime += score.normalized_runtime;
            // A combined group runs as often as its least iterated member.
            expected_iterations = expected_iterations.min(score.mean_iterations);
            training_time += analysis.mean_runtime().unwrap_or(0.0) * score.mean_iterations;
            available_samples = available_samples.min(store.n_available_samples(discipline.id())?);
        }

        if combined_normalized_runtime > 1.0 + RUNTIME_SHARE_TOLERANCE {
            return Err(Error::Degenerate(format!(
                "{candidate} accounts for {:.1}% of the measured runtime",
                combined_normalized_runtime * 100.0
            )));
        }

        let (training_time_per_sample, new_runtime_per_point) = if candidate.is_converged() {
            (
                training_time,
                t_wf.mul_add(1.0 - combined_normalized_runtime, surrogate_prediction_cost),
            )
        } else {
            (
                checked_div(
                    training_time,
                    expected_iterations,
                    &format!("training time of {candidate} (member never called)"),
                )?,
                t_wf.mul_add(
                    1.0 - combined_normalized_runtime,
                    expected_iterations * surrogate_prediction_cost,
                ),
            )
        };

        if new_runtime_per_point <= 0.0 {
            return Err(Error::Degenerate(format!(
                "runtime per point with {candidate} replaced is {new_runtime_per_point}"
            )));
        }

        debug!(
            candidate = %candidate,
            n_var = boundary.n_inputs(),
            t_s = training_time_per_sample,
            t_wf_new = new_runtime_per_point,
            "analyzed strategy"
        );

        Ok(Self {
            candidate: candidate.clone(),
            boundary,
            combined_normalized_runtime,
            expected_iterations,
            training_time_per_sample,
            new_runtime_per_point,
            available_samples,
        })
    }

    /// The replaced group.
    #[must_use]
    pub const fn candidate(&self) -> &CandidateGroup {
        &self.candidate
    }

    /// External (non-constant) inputs and outputs.
    #[must_use]
    pub const fn boundary(&self) -> &BoundaryIo {
        &self.boundary
    }

    /// Surrogate input dimensionality.
    #[must_use]
    pub fn n_var(&self) -> usize {
        self.boundary.n_inputs()
    }

    /// Share of workflow runtime removed by the replacement.
    #[must_use]
    pub const fn combined_normalized_runtime(&self) -> f64 {
        self.combined_normalized_runtime
    }

    /// Minimum mean iterations across members.
    #[must_use]
    pub const fn expected_iterations(&self) -> f64 {
        self.expected_iterations
    }

    /// Seconds to generate one training sample.
    #[must_use]
    pub const fn training_time_per_sample(&self) -> f64 {
        self.training_time_per_sample
    }

    /// Workflow runtime per point once the surrogate is in place.
    #[must_use]
    pub const fn new_runtime_per_point(&self) -> f64 {
        self.new_runtime_per_point
    }

    /// Samples already recorded for every member.
    #[must_use]
    pub const fn available_samples(&self) -> usize {
        self.available_samples
    }
}
