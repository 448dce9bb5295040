//! Workflow-level aggregation of run analyses into discipline scores
//!
//! State machine: `empty -> (timeline added) -> scored`. Every mutation
//! rescores; rescoring with an unchanged run list reuses the cached
//! flattening and yields identical scores.

use super::{DisciplineAnalysis, RunAnalysis, RunTimeline};
use crate::config::ComponentRoles;
use crate::discipline::Discipline;
use crate::error::checked_div;
use crate::samples::SampleStore;
use crate::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Run id under which combined (workflow-level) analyses are filed.
pub const WORKFLOW_RUN_ID: &str = "WORKFLOW";

/// Derived behaviour score of one discipline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplineScore {
    /// Discipline id
    pub discipline_id: String,
    /// Inputs whose recorded samples vary
    pub significant_variables: usize,
    /// Share of total workflow wall-clock time spent in this discipline
    pub normalized_runtime: f64,
    /// Share of all discipline calls made to this discipline
    pub normalized_calls: f64,
    /// Mean calls per top-level point
    pub mean_iterations: f64,
}

/// Workflow-level metric selector for [`WorkflowAnalysis::get_metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowMetric {
    /// Sum of run wall-clock runtimes (seconds)
    TotalRuntime,
    /// Sum of run points (objective function calls, DOE samples)
    TotalPoints,
    /// Sum of discipline calls across all runs
    TotalCombinedDisciplineCalls,
    /// `TotalRuntime / TotalPoints`
    RuntimePerPoint,
}

/// Per-discipline statistic selector for
/// [`WorkflowAnalysis::get_discipline_metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisciplineMetric {
    /// Number of calls
    Calls,
    /// Shortest call
    MinRuntime,
    /// Longest call
    MaxRuntime,
    /// Longest minus shortest call
    RuntimeSpread,
    /// Sum of calls
    TotalRuntime,
    /// Mean call duration
    MeanRuntime,
    /// Sample standard deviation of call durations
    StdRuntime,
}

#[derive(Debug, Clone, PartialEq)]
struct Flattened {
    runs: Vec<RunAnalysis>,
    combined: Vec<DisciplineAnalysis>,
    total_runtime: f64,
    total_points: usize,
    runtime_per_point: f64,
    total_combined_discipline_calls: usize,
}

/// Aggregates run timelines into per-discipline scores and workflow totals.
#[derive(Debug, Clone)]
pub struct WorkflowAnalysis {
    disciplines: Vec<Discipline>,
    index: FxHashMap<String, usize>,
    roles: ComponentRoles,
    runs: Vec<RunAnalysis>,
    flattened: Option<Flattened>,
    scores: Vec<DisciplineScore>,
}

impl WorkflowAnalysis {
    /// Create an empty analysis with the default driver roles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDiscipline`] if two disciplines share an id
    /// or uid.
    pub fn new(disciplines: Vec<Discipline>) -> Result<Self> {
        Self::with_roles(disciplines, ComponentRoles::default())
    }

    /// Create an empty analysis with explicit driver roles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDiscipline`] if two disciplines share an id
    /// or uid.
    pub fn with_roles(disciplines: Vec<Discipline>, roles: ComponentRoles) -> Result<Self> {
        let mut index = FxHashMap::default();
        let mut uids = FxHashSet::default();
        for (position, discipline) in disciplines.iter().enumerate() {
            if index.insert(discipline.id().to_string(), position).is_some() {
                return Err(Error::DuplicateDiscipline(discipline.id().to_string()));
            }
            if !uids.insert(discipline.uid()) {
                return Err(Error::DuplicateDiscipline(discipline.uid().to_string()));
            }
        }

        Ok(Self {
            disciplines,
            index,
            roles,
            runs: Vec::new(),
            flattened: None,
            scores: Vec::new(),
        })
    }

    /// Workflow disciplines, in definition order.
    #[must_use]
    pub fn disciplines(&self) -> &[Discipline] {
        &self.disciplines
    }

    /// Driver roles used to partition timeline events.
    #[must_use]
    pub const fn roles(&self) -> &ComponentRoles {
        &self.roles
    }

    /// Find the single discipline whose id or uid equals `key`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownDiscipline`] if nothing matches
    /// - [`Error::DuplicateDiscipline`] if more than one discipline matches
    pub fn discipline(&self, key: &str) -> Result<&Discipline> {
        let mut matches = self.disciplines.iter().filter(|d| d.matches(key));
        let found = matches
            .next()
            .ok_or_else(|| Error::UnknownDiscipline(key.to_string()))?;
        if matches.next().is_some() {
            return Err(Error::DuplicateDiscipline(key.to_string()));
        }
        Ok(found)
    }

    /// Analysed runs, in insertion order.
    #[must_use]
    pub fn runs(&self) -> &[RunAnalysis] {
        &self.runs
    }

    /// Ids of the analysed runs.
    #[must_use]
    pub fn run_ids(&self) -> Vec<&str> {
        self.runs.iter().map(RunAnalysis::run_id).collect()
    }

    /// Whether scores are available.
    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.flattened.is_some()
    }

    /// Analyse a new run timeline and rescore.
    ///
    /// On failure the analysis is left as it was before the call.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if a run with the same id exists
    /// - any error of [`RunAnalysis::new`] or [`WorkflowAnalysis::score`]
    pub fn add_timeline(&mut self, timeline: RunTimeline, store: &dyn SampleStore) -> Result<()> {
        if self.runs.iter().any(|r| r.run_id() == timeline.run_id()) {
            return Err(Error::InvalidInput(format!(
                "run {} has already been added",
                timeline.run_id()
            )));
        }

        let run = RunAnalysis::new(timeline, &self.disciplines, &self.roles)?;
        self.runs.push(run);
        if let Err(e) = self.score(store) {
            self.runs.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove a run and rescore. Returns the removed run.
    ///
    /// On failure the run is restored.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownRun`] if no run has this id
    /// - any error of [`WorkflowAnalysis::score`]
    pub fn remove_timeline(&mut self, run_id: &str, store: &dyn SampleStore) -> Result<RunAnalysis> {
        let position = self
            .runs
            .iter()
            .position(|r| r.run_id() == run_id)
            .ok_or_else(|| Error::UnknownRun(run_id.to_string()))?;

        let run = self.runs.remove(position);
        if let Err(e) = self.score(store) {
            self.runs.insert(position, run);
            return Err(e);
        }
        Ok(run)
    }

    /// Recompute discipline scores from the current run list.
    ///
    /// With no runs the analysis returns to the empty state.
    ///
    /// # Errors
    ///
    /// - [`Error::Degenerate`] if the total runtime or the total number of
    ///   discipline calls is zero
    /// - sample store failures while counting significant variables
    #[instrument(skip_all, fields(runs = self.runs.len()))]
    pub fn score(&mut self, store: &dyn SampleStore) -> Result<()> {
        if self.runs.is_empty() {
            self.flattened = None;
            self.scores.clear();
            debug!("no runs left, analysis reset");
            return Ok(());
        }

        let fresh = match &self.flattened {
            Some(cached) if cached.runs == self.runs => None,
            _ => Some(self.flatten()?),
        };
        let Some(flattened) = fresh.as_ref().or(self.flattened.as_ref()) else {
            return Err(Error::NotScored);
        };

        let mut scores = Vec::with_capacity(flattened.combined.len());
        for analysis in &flattened.combined {
            if analysis.n_calls() == 0 {
                warn!(
                    discipline = analysis.discipline_id(),
                    "discipline was never called in the analysed runs"
                );
            }
            scores.push(score_discipline(analysis, flattened, store)?);
        }

        let runtime_share: f64 = scores.iter().map(|s| s.normalized_runtime).sum();
        if runtime_share > 1.0 {
            warn!(
                runtime_share,
                "discipline time exceeds the measured runtime; calls end after the last event start"
            );
        }

        info!(
            total_runtime = flattened.total_runtime,
            total_points = flattened.total_points,
            runtime_per_point = flattened.runtime_per_point,
            "workflow scored"
        );

        if let Some(flattened) = fresh {
            self.flattened = Some(flattened);
        }
        self.scores = scores;
        Ok(())
    }

    fn flatten(&self) -> Result<Flattened> {
        let mut combined: Vec<DisciplineAnalysis> = self
            .disciplines
            .iter()
            .map(|d| DisciplineAnalysis::new(WORKFLOW_RUN_ID, d.id()))
            .collect();

        for analysis in &mut combined {
            for run in &self.runs {
                analysis.combine(run.discipline_analysis(analysis.discipline_id())?)?;
            }
        }

        let total_runtime: f64 = self.runs.iter().map(RunAnalysis::runtime).sum();
        let total_points: usize = self.runs.iter().map(RunAnalysis::points).sum();
        #[allow(clippy::cast_precision_loss)]
        let runtime_per_point =
            checked_div(total_runtime, total_points as f64, "workflow runtime per point")?;
        let total_combined_discipline_calls =
            combined.iter().map(DisciplineAnalysis::n_calls).sum();

        debug!(total_runtime, total_points, "flattened runs");

        Ok(Flattened {
            runs: self.runs.clone(),
            combined,
            total_runtime,
            total_points,
            runtime_per_point,
            total_combined_discipline_calls,
        })
    }

    fn flattened(&self) -> Result<&Flattened> {
        self.flattened.as_ref().ok_or(Error::NotScored)
    }

    /// Workflow-level metric.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotScored`] before the first timeline is added.
    #[allow(clippy::cast_precision_loss)]
    pub fn get_metric(&self, metric: WorkflowMetric) -> Result<f64> {
        let flat = self.flattened()?;
        Ok(match metric {
            WorkflowMetric::TotalRuntime => flat.total_runtime,
            WorkflowMetric::TotalPoints => flat.total_points as f64,
            WorkflowMetric::TotalCombinedDisciplineCalls => {
                flat.total_combined_discipline_calls as f64
            }
            WorkflowMetric::RuntimePerPoint => flat.runtime_per_point,
        })
    }

    /// Sum of run wall-clock runtimes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotScored`] before the first timeline is added.
    pub fn total_runtime(&self) -> Result<f64> {
        Ok(self.flattened()?.total_runtime)
    }

    /// Sum of run points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotScored`] before the first timeline is added.
    pub fn total_points(&self) -> Result<usize> {
        Ok(self.flattened()?.total_points)
    }

    /// Mean wall-clock seconds per top-level point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotScored`] before the first timeline is added.
    pub fn runtime_per_point(&self) -> Result<f64> {
        Ok(self.flattened()?.runtime_per_point)
    }

    /// All discipline scores, in workflow discipline order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotScored`] before the first timeline is added.
    pub fn scores(&self) -> Result<&[DisciplineScore]> {
        self.flattened()?;
        Ok(&self.scores)
    }

    /// Score of one discipline, looked up by id or uid.
    ///
    /// # Errors
    ///
    /// - [`Error::NotScored`] before the first timeline is added
    /// - [`Error::UnknownDiscipline`] for an unknown key
    pub fn get_discipline_score(&self, key: &str) -> Result<&DisciplineScore> {
        self.flattened()?;
        let position = self.position(key)?;
        Ok(&self.scores[position])
    }

    /// Workflow-level (combined) analysis of one discipline.
    ///
    /// # Errors
    ///
    /// - [`Error::NotScored`] before the first timeline is added
    /// - [`Error::UnknownDiscipline`] for an unknown key
    pub fn get_discipline_analysis(&self, key: &str) -> Result<&DisciplineAnalysis> {
        let flat = self.flattened()?;
        let position = self.position(key)?;
        Ok(&flat.combined[position])
    }

    /// One statistic of a discipline's combined calls.
    ///
    /// Statistics that need calls (or two calls, for the standard
    /// deviation) are `None` when those are missing.
    ///
    /// # Errors
    ///
    /// Same as [`WorkflowAnalysis::get_discipline_analysis`].
    #[allow(clippy::cast_precision_loss)]
    pub fn get_discipline_metric(&self, key: &str, metric: DisciplineMetric) -> Result<Option<f64>> {
        let analysis = self.get_discipline_analysis(key)?;
        Ok(match metric {
            DisciplineMetric::Calls => Some(analysis.n_calls() as f64),
            DisciplineMetric::MinRuntime => analysis.min_runtime(),
            DisciplineMetric::MaxRuntime => analysis.max_runtime(),
            DisciplineMetric::RuntimeSpread => analysis.runtime_spread(),
            DisciplineMetric::TotalRuntime => analysis.total_runtime(),
            DisciplineMetric::MeanRuntime => analysis.mean_runtime(),
            DisciplineMetric::StdRuntime => analysis.std_runtime(),
        })
    }

    /// How many complete runs of the analysed size fit into `budget_seconds`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for a negative or non-finite budget
    /// - [`Error::NotScored`] before the first timeline is added
    /// - [`Error::Degenerate`] if the analysed runtime is zero
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimate_affordable_runs(&self, budget_seconds: f64) -> Result<u64> {
        if !budget_seconds.is_finite() || budget_seconds < 0.0 {
            return Err(Error::InvalidInput(format!(
                "budget must be finite and non-negative, got {budget_seconds}"
            )));
        }
        let runs = checked_div(budget_seconds, self.total_runtime()?, "affordable runs")?;
        Ok(runs.floor() as u64)
    }

    fn position(&self, key: &str) -> Result<usize> {
        if let Some(&position) = self.index.get(key) {
            return Ok(position);
        }
        let discipline = self.discipline(key)?;
        self.index
            .get(discipline.id())
            .copied()
            .ok_or_else(|| Error::UnknownDiscipline(key.to_string()))
    }
}

fn score_discipline(
    analysis: &DisciplineAnalysis,
    flat: &Flattened,
    store: &dyn SampleStore,
) -> Result<DisciplineScore> {
    let id = analysis.discipline_id();
    #[allow(clippy::cast_precision_loss)]
    let n_calls = analysis.n_calls() as f64;

    let normalized_runtime = checked_div(
        analysis.total_runtime().unwrap_or(0.0),
        flat.total_runtime,
        &format!("normalized runtime of {id} (workflow runtime is zero)"),
    )?;
    #[allow(clippy::cast_precision_loss)]
    let normalized_calls = checked_div(
        n_calls,
        flat.total_combined_discipline_calls as f64,
        &format!("normalized calls of {id} (no discipline calls recorded)"),
    )?;
    #[allow(clippy::cast_precision_loss)]
    let mean_iterations = checked_div(
        n_calls,
        flat.total_points as f64,
        &format!("mean iterations of {id}"),
    )?;

    Ok(DisciplineScore {
        discipline_id: id.to_string(),
        significant_variables: analysis.significant_variable_count(store)?,
        normalized_runtime,
        normalized_calls,
        mean_iterations,
    })
}
