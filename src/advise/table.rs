//! Advise table: strategies evaluated across heuristics and coverage ratios

use super::{Budget, BudgetAxis, SampleAdvisor, Strategy};
use crate::error::checked_div;
use crate::process::CandidateGroup;
use crate::Result;
use serde::{Deserialize, Serialize};

/// One strategy evaluated at one heuristic and coverage percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviseRow {
    /// Sample-count heuristic
    pub heuristic: SampleAdvisor,
    /// Replaced group
    pub candidate: CandidateGroup,
    /// Percentage of the advised sample count
    pub coverage_pct: u32,
    /// Training samples (`n_s`)
    pub samples: f64,
    /// Time to generate the training samples (seconds)
    pub training_time: f64,
    /// Profiling time charged against the budget (seconds)
    pub profiling_time: f64,
    /// Training plus profiling plus the iteration budget at the new
    /// per-point runtime (seconds)
    pub combined_time: f64,
    /// Extra objective function calls the time budget affords
    pub delta_objective_calls: f64,
    /// Combined time minus the time budget (seconds)
    pub delta_time: f64,
}

impl AdviseRow {
    /// Value ranked under `axis`.
    #[must_use]
    pub const fn ranking_key(&self, axis: BudgetAxis) -> f64 {
        match axis {
            BudgetAxis::Time => self.delta_objective_calls,
            BudgetAxis::Iterations => self.delta_time,
        }
    }
}

/// Inputs shared by every evaluation of one advise build.
#[derive(Debug, Clone, Copy)]
pub struct CostContext {
    /// Active budget
    pub budget: Budget,
    /// Credit recorded samples and charge the profiling runs
    pub account_for_profiling: bool,
    /// Total profiling runtime (seconds)
    pub profiling_time: f64,
}

/// Evaluate `strategy` with `heuristic` at `coverage_pct` percent of the
/// advised sample count.
///
/// # Errors
///
/// Returns [`crate::Error::Degenerate`] if the new per-point runtime is zero.
pub fn evaluate(
    strategy: &Strategy,
    heuristic: SampleAdvisor,
    coverage_pct: u32,
    ctx: &CostContext,
) -> Result<AdviseRow> {
    let samples = f64::from(coverage_pct) / 100.0 * heuristic.advise(strategy.n_var());
    let t_s = strategy.training_time_per_sample();

    let (training_time, profiling_time) = if ctx.account_for_profiling {
        #[allow(clippy::cast_precision_loss)]
        let missing = (samples - strategy.available_samples() as f64).max(0.0);
        (t_s * missing, ctx.profiling_time)
    } else {
        (t_s * samples, 0.0)
    };

    let t_wf_new = strategy.new_runtime_per_point();
    #[allow(clippy::cast_precision_loss)]
    let iterations = ctx.budget.iterations() as f64;
    let time_budget = ctx.budget.time_seconds();

    let affordable = checked_div(
        time_budget - training_time - profiling_time,
        t_wf_new,
        &format!("objective calls of {}", strategy.candidate()),
    )?;
    let combined_time = t_wf_new.mul_add(iterations, training_time + profiling_time);

    Ok(AdviseRow {
        heuristic,
        candidate: strategy.candidate().clone(),
        coverage_pct,
        samples,
        training_time,
        profiling_time,
        combined_time,
        delta_objective_calls: affordable - iterations,
        delta_time: combined_time - time_budget,
    })
}

/// Order rows for the fixed budget axis: most extra objective calls first
/// when time is fixed, least time overshoot first when iterations are
/// fixed. Equal keys keep their input order.
pub fn rank(rows: &mut [AdviseRow], axis: BudgetAxis) {
    match axis {
        BudgetAxis::Time => rows.sort_by(|a, b| {
            b.delta_objective_calls.total_cmp(&a.delta_objective_calls)
        }),
        BudgetAxis::Iterations => rows.sort_by(|a, b| a.delta_time.total_cmp(&b.delta_time)),
    }
}

/// Every strategy evaluated for every swept heuristic and coverage
/// percentage. Rows are grouped by heuristic, then candidate, then
/// coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviseTable {
    fixed: BudgetAxis,
    coverage_percentages: Vec<u32>,
    rows: Vec<AdviseRow>,
}

impl AdviseTable {
    /// Evaluate `strategies` for each heuristic and coverage percentage.
    ///
    /// # Errors
    ///
    /// Propagates [`evaluate`] failures.
    pub fn build(
        strategies: &[Strategy],
        heuristics: &[SampleAdvisor],
        coverage_percentages: &[u32],
        ctx: &CostContext,
    ) -> Result<Self> {
        let mut rows =
            Vec::with_capacity(strategies.len() * heuristics.len() * coverage_percentages.len());
        for &heuristic in heuristics {
            for strategy in strategies {
                for &pct in coverage_percentages {
                    rows.push(evaluate(strategy, heuristic, pct, ctx)?);
                }
            }
        }
        Ok(Self {
            fixed: ctx.budget.fixed(),
            coverage_percentages: coverage_percentages.to_vec(),
            rows,
        })
    }

    /// Budget axis fixed when the table was built.
    #[must_use]
    pub const fn fixed(&self) -> BudgetAxis {
        self.fixed
    }

    /// Swept coverage percentages.
    #[must_use]
    pub fn coverage_percentages(&self) -> &[u32] {
        &self.coverage_percentages
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[AdviseRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one heuristic.
    pub fn for_heuristic(&self, heuristic: SampleAdvisor) -> impl Iterator<Item = &AdviseRow> {
        self.rows.iter().filter(move |r| r.heuristic == heuristic)
    }

    /// Row of one heuristic, candidate and coverage percentage.
    #[must_use]
    pub fn row(
        &self,
        heuristic: SampleAdvisor,
        candidate: &CandidateGroup,
        coverage_pct: u32,
    ) -> Option<&AdviseRow> {
        self.rows.iter().find(|r| {
            r.heuristic == heuristic && r.coverage_pct == coverage_pct && &r.candidate == candidate
        })
    }

    /// Rows of one heuristic at one coverage percentage, ranked for the
    /// fixed axis.
    #[must_use]
    pub fn ranked(&self, heuristic: SampleAdvisor, coverage_pct: u32) -> Vec<AdviseRow> {
        let mut rows: Vec<AdviseRow> = self
            .for_heuristic(heuristic)
            .filter(|r| r.coverage_pct == coverage_pct)
            .cloned()
            .collect();
        rank(&mut rows, self.fixed);
        rows
    }
}
