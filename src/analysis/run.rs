//! Analysis of a single workflow execution

use super::{DisciplineAnalysis, RunTimeline};
use crate::config::{ComponentRole, ComponentRoles};
use crate::discipline::Discipline;
use crate::error::checked_div;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-run discipline call records plus wall-clock totals.
///
/// Top-level driver events count as points, nested driver events are
/// skipped, every other event adds one elapsed-time sample to the matching
/// discipline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAnalysis {
    run_id: String,
    timeline: RunTimeline,
    discipline_analyses: Vec<DisciplineAnalysis>,
    runtime: f64,
    points: usize,
    runtime_per_point: f64,
}

impl RunAnalysis {
    /// Process `timeline` against the workflow's disciplines.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for an empty timeline or a discipline event
    ///   without elapsed time
    /// - [`Error::UnknownDiscipline`] for a component that is neither a driver
    ///   nor one of `disciplines`
    /// - [`Error::Degenerate`] when the run has no top-level driver events
    pub fn new(
        timeline: RunTimeline,
        disciplines: &[Discipline],
        roles: &ComponentRoles,
    ) -> Result<Self> {
        let run_id = timeline.run_id().to_string();
        let runtime = timeline.span_seconds().ok_or_else(|| {
            Error::InvalidInput(format!("timeline of run {run_id} has no events"))
        })?;

        let mut discipline_analyses: Vec<DisciplineAnalysis> = disciplines
            .iter()
            .map(|d| DisciplineAnalysis::new(run_id.clone(), d.id()))
            .collect();

        let mut points = 0usize;
        for event in timeline.events() {
            match roles.classify(&event.component) {
                ComponentRole::NestedDriver => {}
                ComponentRole::TopLevelDriver => points += 1,
                ComponentRole::Discipline => {
                    let analysis = discipline_analyses
                        .iter_mut()
                        .find(|a| a.discipline_id() == event.component)
                        .ok_or_else(|| Error::UnknownDiscipline(event.component.clone()))?;
                    analysis.add_call(event.elapsed_seconds()?);
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let runtime_per_point = checked_div(
            runtime,
            points as f64,
            &format!("runtime per point of run {run_id} (no top-level driver events)"),
        )?;

        debug!(
            run_id = %run_id,
            runtime,
            points,
            runtime_per_point,
            "processed run timeline"
        );

        Ok(Self {
            run_id,
            timeline,
            discipline_analyses,
            runtime,
            points,
            runtime_per_point,
        })
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the source timeline.
    #[must_use]
    pub const fn timeline(&self) -> &RunTimeline {
        &self.timeline
    }

    /// Wall-clock runtime in seconds (latest minus earliest event start).
    #[must_use]
    pub const fn runtime(&self) -> f64 {
        self.runtime
    }

    /// Number of top-level driver events.
    #[must_use]
    pub const fn points(&self) -> usize {
        self.points
    }

    /// `runtime / points`.
    #[must_use]
    pub const fn runtime_per_point(&self) -> f64 {
        self.runtime_per_point
    }

    /// Per-discipline analyses, in workflow discipline order.
    #[must_use]
    pub fn discipline_analyses(&self) -> &[DisciplineAnalysis] {
        &self.discipline_analyses
    }

    /// Analysis of one discipline within this run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDiscipline`] if the discipline is not part of
    /// the workflow.
    pub fn discipline_analysis(&self, discipline_id: &str) -> Result<&DisciplineAnalysis> {
        self.discipline_analyses
            .iter()
            .find(|a| a.discipline_id() == discipline_id)
            .ok_or_else(|| Error::UnknownDiscipline(discipline_id.to_string()))
    }

    /// Total discipline calls recorded in this run.
    #[must_use]
    pub fn total_discipline_calls(&self) -> usize {
        self.discipline_analyses.iter().map(DisciplineAnalysis::n_calls).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TimelineEvent;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn disciplines() -> Vec<Discipline> {
        vec![Discipline::new("D1", "D1"), Discipline::new("D2", "D2")]
    }

    #[test]
    fn test_partition_events() {
        let timeline = RunTimeline::new(
            "run-1",
            vec![
                TimelineEvent::call("D1", t(0), 1.0),
                TimelineEvent::call("D2", t(1), 1.5),
                TimelineEvent::driver("Converger", t(3)),
                TimelineEvent::call("D1", t(3), 1.0),
                TimelineEvent::call("D2", t(4), 1.5),
                TimelineEvent::driver("Converger", t(6)),
                TimelineEvent::driver("DOE", t(6)),
                TimelineEvent::call("D1", t(6), 1.0),
                TimelineEvent::call("D2", t(7), 1.5),
                TimelineEvent::driver("Converger", t(9)),
                TimelineEvent::driver("DOE", t(10)),
            ],
        );
        let run = RunAnalysis::new(timeline, &disciplines(), &ComponentRoles::default()).unwrap();

        assert_eq!(run.points(), 2);
        assert!((run.runtime() - 10.0).abs() < 1e-12);
        assert!((run.runtime_per_point() - 5.0).abs() < 1e-12);
        assert_eq!(run.discipline_analysis("D1").unwrap().n_calls(), 3);
        assert_eq!(run.discipline_analysis("D2").unwrap().n_calls(), 3);
        assert_eq!(run.total_discipline_calls(), 6);
    }

    #[test]
    fn test_zero_points_is_degenerate() {
        let timeline = RunTimeline::new("run-1", vec![TimelineEvent::call("D1", t(0), 1.0)]);
        let err = RunAnalysis::new(timeline, &disciplines(), &ComponentRoles::default())
            .unwrap_err();
        assert!(matches!(err, Error::Degenerate(_)));
    }

    #[test]
    fn test_unknown_component() {
        let timeline = RunTimeline::new(
            "run-1",
            vec![
                TimelineEvent::call("D7", t(0), 1.0),
                TimelineEvent::driver("DOE", t(2)),
            ],
        );
        let err = RunAnalysis::new(timeline, &disciplines(), &ComponentRoles::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDiscipline(ref id) if id == "D7"));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = RunTimeline::new("run-1", vec![]);
        let err = RunAnalysis::new(timeline, &disciplines(), &ComponentRoles::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
