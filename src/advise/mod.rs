//! Economic advisor: should a discipline group be replaced by a surrogate?
//!
//! For each candidate group the advisor computes the time needed to
//! generate training data and the workflow runtime per point once the
//! surrogate is in place, then sweeps sample-count heuristics and coverage
//! ratios to show how many extra objective function calls (time budget
//! fixed) or how much extra wall-clock time (iteration budget fixed) each
//! replacement yields.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use serde_json::json;
//! use surrogate_advisor::advise::{Advisor, Profile, SampleAdvisor};
//! use surrogate_advisor::analysis::{RunTimeline, TimelineEvent, WorkflowAnalysis};
//! use surrogate_advisor::config::AdvisorConfig;
//! use surrogate_advisor::discipline::Discipline;
//! use surrogate_advisor::process::{enumerate_candidates, ProcessHierarchy, StaticDesignGraph};
//! use surrogate_advisor::samples::MemorySampleStore;
//!
//! # fn main() -> surrogate_advisor::Result<()> {
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
//! let at = |s: i64| t0 + Duration::seconds(s);
//!
//! let mut store = MemorySampleStore::new();
//! store.register("D1", ["x"], ["y1"]);
//! store.register("D2", ["y1"], ["y2"]);
//!
//! let mut workflow = WorkflowAnalysis::new(vec![
//!     Discipline::new("D1", "D1"),
//!     Discipline::new("D2", "D2"),
//! ])?;
//! workflow.add_timeline(
//!     RunTimeline::new(
//!         "run-1",
//!         vec![
//!             TimelineEvent::call("D1", at(0), 2.0),
//!             TimelineEvent::call("D2", at(2), 3.0),
//!             TimelineEvent::driver("DOE", at(6)),
//!         ],
//!     ),
//!     &store,
//! )?;
//!
//! let hierarchy = ProcessHierarchy::from_nested_default(&json!(["Coordinator", ["DOE", "D1", "D2"]]))?;
//! let graph = StaticDesignGraph::builder(hierarchy)
//!     .discipline("D1", ["x"], ["y1"])
//!     .discipline("D2", ["y1"], ["y2"])
//!     .external_source("x", "DOE")
//!     .build()?;
//!
//! let mut advisor = Advisor::new(&workflow, &graph, &store, AdvisorConfig::default())?;
//! advisor.set_optimization_time_budget(600.0)?;
//! advisor.build_advise(&enumerate_candidates(&graph, false)?)?;
//!
//! let ranked = advisor.top_n_strategies(SampleAdvisor::Jones, Profile::Advised)?;
//! assert_eq!(ranked.len(), 3);
//! # Ok(())
//! # }
//! ```

mod budget;
mod heuristics;
mod strategy;
mod table;

pub use budget::{Budget, BudgetAxis};
pub use heuristics::{Profile, SampleAdvisor};
pub use strategy::Strategy;
pub use table::{evaluate, rank, AdviseRow, AdviseTable, CostContext};

use crate::analysis::WorkflowAnalysis;
use crate::config::AdvisorConfig;
use crate::process::{CandidateGroup, DesignGraph};
use crate::samples::SampleStore;
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Ranked strategies of one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Accuracy profile
    pub profile: Profile,
    /// Best strategies first
    pub strategies: Vec<AdviseRow>,
}

/// Budget-aware advisor over a scored workflow.
pub struct Advisor<'a> {
    workflow: &'a WorkflowAnalysis,
    graph: &'a dyn DesignGraph,
    store: &'a dyn SampleStore,
    config: AdvisorConfig,
    sample_advisor: SampleAdvisor,
    profile: Profile,
    budget: Option<Budget>,
    strategies: Vec<Strategy>,
    index: FxHashMap<CandidateGroup, usize>,
    excluded: Vec<CandidateGroup>,
    advise: Option<AdviseTable>,
}

impl<'a> Advisor<'a> {
    /// Create an advisor.
    ///
    /// # Errors
    ///
    /// - [`Error::NotScored`] if the workflow has no runs
    /// - [`Error::InvalidInput`] for an inconsistent configuration
    pub fn new(
        workflow: &'a WorkflowAnalysis,
        graph: &'a dyn DesignGraph,
        store: &'a dyn SampleStore,
        config: AdvisorConfig,
    ) -> Result<Self> {
        if !workflow.is_scored() {
            return Err(Error::NotScored);
        }
        config.validate()?;

        Ok(Self {
            workflow,
            graph,
            store,
            sample_advisor: config.default_advisor,
            profile: config.default_profile,
            config,
            budget: None,
            strategies: Vec::new(),
            index: FxHashMap::default(),
            excluded: Vec::new(),
            advise: None,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Select the heuristic used by [`Advisor::ranked_strategies`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHeuristic`] for an unknown name.
    pub fn set_sample_advisor(&mut self, name: &str) -> Result<()> {
        self.sample_advisor = name.parse()?;
        Ok(())
    }

    /// Select the profile used by [`Advisor::ranked_strategies`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProfile`] for an unknown name.
    pub fn set_profile(&mut self, name: &str) -> Result<()> {
        self.profile = name.parse()?;
        Ok(())
    }

    /// Selected heuristic.
    #[must_use]
    pub const fn sample_advisor(&self) -> SampleAdvisor {
        self.sample_advisor
    }

    /// Selected profile.
    #[must_use]
    pub const fn profile(&self) -> Profile {
        self.profile
    }

    /// Fix the time budget; the iteration budget follows from the
    /// workflow's runtime per point.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for a negative budget
    /// - [`Error::Degenerate`] for a zero runtime per point
    pub fn set_optimization_time_budget(&mut self, seconds: f64) -> Result<()> {
        let budget = Budget::from_time(seconds, self.workflow.runtime_per_point()?)?;
        info!(seconds, iterations = budget.iterations(), "time budget fixed");
        self.set_budget(budget);
        Ok(())
    }

    /// Fix the iteration budget; the time budget follows from the
    /// workflow's runtime per point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Degenerate`] if the derived time is not finite.
    pub fn set_optimization_iteration_budget(&mut self, iterations: u64) -> Result<()> {
        let budget = Budget::from_iterations(iterations, self.workflow.runtime_per_point()?)?;
        info!(iterations, seconds = budget.time_seconds(), "iteration budget fixed");
        self.set_budget(budget);
        Ok(())
    }

    fn set_budget(&mut self, budget: Budget) {
        self.budget = Some(budget);
        // Rows were evaluated against the previous budget.
        self.advise = None;
    }

    /// Active budget.
    #[must_use]
    pub const fn budget(&self) -> Option<&Budget> {
        self.budget.as_ref()
    }

    /// Currently fixed budget axis.
    #[must_use]
    pub fn fixed_axis(&self) -> Option<BudgetAxis> {
        self.budget.map(|b| b.fixed())
    }

    /// Time budget in seconds, fixed or derived.
    #[must_use]
    pub fn optimization_time_budget(&self) -> Option<f64> {
        self.budget.map(|b| b.time_seconds())
    }

    /// Iteration budget, fixed or derived.
    #[must_use]
    pub fn optimization_iteration_budget(&self) -> Option<u64> {
        self.budget.map(|b| b.iterations())
    }

    /// Compute the strategy of every candidate, replacing previous results.
    ///
    /// Candidates whose strategy is degenerate (a member never called, or
    /// no runtime left once replaced) are excluded with a warning and
    /// listed by [`Advisor::excluded_candidates`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotAnalyzed`] if `candidates` is empty
    /// - the first [`Error::Degenerate`] if every candidate is excluded
    /// - any other [`Strategy::analyze`] failure
    ///
    /// On failure previous strategies are kept.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn analyze_strategies(&mut self, candidates: &[CandidateGroup]) -> Result<()> {
        if candidates.is_empty() {
            return Err(Error::NotAnalyzed);
        }

        let mut strategies = Vec::with_capacity(candidates.len());
        let mut index = FxHashMap::default();
        let mut excluded: Vec<CandidateGroup> = Vec::new();
        let mut first_degenerate = None;
        for candidate in candidates {
            if index.contains_key(candidate) || excluded.contains(candidate) {
                continue;
            }
            match Strategy::analyze(
                candidate,
                self.workflow,
                self.graph,
                self.store,
                self.config.surrogate_prediction_cost,
            ) {
                Ok(strategy) => {
                    index.insert(candidate.clone(), strategies.len());
                    strategies.push(strategy);
                }
                Err(err @ Error::Degenerate(_)) => {
                    warn!(candidate = %candidate, reason = %err, "candidate excluded from advice");
                    excluded.push(candidate.clone());
                    if first_degenerate.is_none() {
                        first_degenerate = Some(err);
                    }
                }
                Err(err) => return Err(err),
            }
        }

        if strategies.is_empty() {
            return Err(first_degenerate.unwrap_or(Error::NotAnalyzed));
        }

        info!(
            strategies = strategies.len(),
            excluded = excluded.len(),
            "strategies analyzed"
        );
        self.strategies = strategies;
        self.index = index;
        self.excluded = excluded;
        self.advise = None;
        Ok(())
    }

    /// Candidates left out of the last analysis because their strategy was
    /// degenerate.
    #[must_use]
    pub fn excluded_candidates(&self) -> &[CandidateGroup] {
        &self.excluded
    }

    /// Analyzed strategies, in candidate order.
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Strategy of one candidate.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAnalyzed`] before any candidate was analyzed
    /// - [`Error::InvalidInput`] if `candidate` was not among them
    pub fn strategy(&self, candidate: &CandidateGroup) -> Result<&Strategy> {
        self.require_strategies()?;
        self.index
            .get(candidate)
            .map(|&i| &self.strategies[i])
            .ok_or_else(|| Error::InvalidInput(format!("candidate {candidate} was not analyzed")))
    }

    fn require_strategies(&self) -> Result<()> {
        if self.strategies.is_empty() {
            Err(Error::NotAnalyzed)
        } else {
            Ok(())
        }
    }

    fn cost_context(&self) -> Result<CostContext> {
        let budget = self.budget.ok_or(Error::BudgetNotFixed)?;
        let profiling_time = if self.config.account_for_profiling {
            self.workflow.total_runtime()?
        } else {
            0.0
        };
        Ok(CostContext {
            budget,
            account_for_profiling: self.config.account_for_profiling,
            profiling_time,
        })
    }

    /// Analyze `candidates` and tabulate every configured heuristic and
    /// coverage percentage.
    ///
    /// # Errors
    ///
    /// - [`Error::BudgetNotFixed`] if no budget is set
    /// - [`Error::NotAnalyzed`] if `candidates` is empty
    /// - failures of [`Advisor::analyze_strategies`] and [`evaluate`]
    ///
    /// Precondition failures leave previous strategies untouched.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn build_advise(&mut self, candidates: &[CandidateGroup]) -> Result<&AdviseTable> {
        let ctx = self.cost_context()?;
        self.analyze_strategies(candidates)?;

        let table = AdviseTable::build(
            &self.strategies,
            &self.config.sample_advisors,
            &self.config.coverage_percentages,
            &ctx,
        )?;
        info!(rows = table.len(), fixed = %ctx.budget.fixed(), "advise table built");
        Ok(self.advise.insert(table))
    }

    /// Table of the last [`Advisor::build_advise`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnalyzed`] if no table is built, or the budget
    /// changed since.
    pub fn advise_table(&self) -> Result<&AdviseTable> {
        self.advise.as_ref().ok_or(Error::NotAnalyzed)
    }

    /// Every analyzed strategy evaluated with `heuristic` at `profile`'s
    /// coverage, ranked for the fixed budget axis. Callers take the top N.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAnalyzed`] before any candidate was analyzed
    /// - [`Error::BudgetNotFixed`] if no budget is set
    pub fn top_n_strategies(
        &self,
        heuristic: SampleAdvisor,
        profile: Profile,
    ) -> Result<Vec<AdviseRow>> {
        self.require_strategies()?;
        let ctx = self.cost_context()?;
        let mut rows = self
            .strategies
            .iter()
            .map(|s| evaluate(s, heuristic, profile.coverage_pct(), &ctx))
            .collect::<Result<Vec<_>>>()?;
        rank(&mut rows, ctx.budget.fixed());
        Ok(rows)
    }

    /// [`Advisor::top_n_strategies`] with the selected heuristic and
    /// profile.
    ///
    /// # Errors
    ///
    /// Same as [`Advisor::top_n_strategies`].
    pub fn ranked_strategies(&self) -> Result<Vec<AdviseRow>> {
        self.top_n_strategies(self.sample_advisor, self.profile)
    }

    /// Best `n` strategies of every profile under `heuristic`.
    ///
    /// # Errors
    ///
    /// Same as [`Advisor::top_n_strategies`].
    pub fn recommend(&self, heuristic: SampleAdvisor, n: usize) -> Result<Vec<Recommendation>> {
        Profile::ALL
            .iter()
            .map(|&profile| {
                let mut strategies = self.top_n_strategies(heuristic, profile)?;
                strategies.truncate(n);
                Ok(Recommendation {
                    profile,
                    strategies,
                })
            })
            .collect()
    }

    /// Training samples for `candidate` under `heuristic` at
    /// `coverage_pct` percent of the advised count.
    ///
    /// # Errors
    ///
    /// Same as [`Advisor::strategy`].
    pub fn get_n_s_for_strategy(
        &self,
        heuristic: SampleAdvisor,
        coverage_pct: u32,
        candidate: &CandidateGroup,
    ) -> Result<f64> {
        let strategy = self.strategy(candidate)?;
        Ok(f64::from(coverage_pct) / 100.0 * heuristic.advise(strategy.n_var()))
    }
}

impl std::fmt::Debug for Advisor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("config", &self.config)
            .field("sample_advisor", &self.sample_advisor)
            .field("profile", &self.profile)
            .field("budget", &self.budget)
            .field("strategies", &self.strategies.len())
            .field("excluded", &self.excluded.len())
            .field("advise_built", &self.advise.is_some())
            .finish_non_exhaustive()
    }
}
