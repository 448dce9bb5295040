//! One advisory session over a workflow
//!
//! Owns the workflow analysis together with its collaborators (design graph
//! and sample store) and hands out fully prepared [`Advisor`]s.

use crate::advise::Advisor;
use crate::analysis::{RunAnalysis, RunTimeline, WorkflowAnalysis};
use crate::config::AdvisorConfig;
use crate::discipline::Discipline;
use crate::process::{enumerate_candidates, CandidateGroup, DesignGraph};
use crate::samples::SampleStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Budget to fix when asking for advice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetRequest {
    /// Wall-clock seconds available to the optimization
    Time(f64),
    /// Optimizer iterations available
    Iterations(u64),
}

/// Workflow analysis plus the collaborators needed to advise on it.
pub struct AdvisorySession {
    config: AdvisorConfig,
    workflow: WorkflowAnalysis,
    graph: Box<dyn DesignGraph>,
    store: Box<dyn SampleStore>,
}

impl AdvisorySession {
    /// Start a session without runs.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidInput`] for an inconsistent configuration, or
    ///   a process hierarchy whose drivers disagree with the configured roles
    /// - [`crate::Error::DuplicateDiscipline`] for repeated discipline ids
    pub fn new(
        disciplines: Vec<Discipline>,
        graph: Box<dyn DesignGraph>,
        store: Box<dyn SampleStore>,
        config: AdvisorConfig,
    ) -> Result<Self> {
        config.validate()?;
        config.roles.check_hierarchy(graph.process_hierarchy())?;
        let workflow = WorkflowAnalysis::with_roles(disciplines, config.roles.clone())?;
        Ok(Self {
            config,
            workflow,
            graph,
            store,
        })
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Workflow analysis.
    #[must_use]
    pub const fn workflow(&self) -> &WorkflowAnalysis {
        &self.workflow
    }

    /// Design graph.
    #[must_use]
    pub fn graph(&self) -> &dyn DesignGraph {
        self.graph.as_ref()
    }

    /// Sample store.
    #[must_use]
    pub fn store(&self) -> &dyn SampleStore {
        self.store.as_ref()
    }

    /// Add a profiling run and rescore.
    ///
    /// # Errors
    ///
    /// Same as [`WorkflowAnalysis::add_timeline`].
    pub fn analyse_run(&mut self, timeline: RunTimeline) -> Result<()> {
        let run_id = timeline.run_id().to_string();
        self.workflow.add_timeline(timeline, self.store.as_ref())?;
        info!(run_id = %run_id, runs = self.workflow.runs().len(), "run analysed");
        Ok(())
    }

    /// Drop a profiling run and rescore.
    ///
    /// # Errors
    ///
    /// Same as [`WorkflowAnalysis::remove_timeline`].
    pub fn forget_run(&mut self, run_id: &str) -> Result<RunAnalysis> {
        let run = self.workflow.remove_timeline(run_id, self.store.as_ref())?;
        info!(run_id, runs = self.workflow.runs().len(), "run forgotten");
        Ok(run)
    }

    /// Replacement candidates of the workflow.
    ///
    /// # Errors
    ///
    /// Same as [`enumerate_candidates`].
    pub fn candidates(&self) -> Result<Vec<CandidateGroup>> {
        enumerate_candidates(self.graph.as_ref(), self.config.allow_complete_loops)
    }

    /// Advisor with `budget` fixed and the advise table built over every
    /// candidate.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::NotScored`] if no run was analysed
    /// - failures of budget setting, enumeration or
    ///   [`Advisor::build_advise`]
    pub fn give_advice(&self, budget: BudgetRequest) -> Result<Advisor<'_>> {
        let mut advisor = Advisor::new(
            &self.workflow,
            self.graph.as_ref(),
            self.store.as_ref(),
            self.config.clone(),
        )?;
        match budget {
            BudgetRequest::Time(seconds) => advisor.set_optimization_time_budget(seconds)?,
            BudgetRequest::Iterations(n) => advisor.set_optimization_iteration_budget(n)?,
        }
        advisor.build_advise(&self.candidates()?)?;
        Ok(advisor)
    }
}

impl std::fmt::Debug for AdvisorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorySession")
            .field("config", &self.config)
            .field("workflow", &self.workflow)
            .finish_non_exhaustive()
    }
}
