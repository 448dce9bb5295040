//! Workflow execution analysis
//!
//! Turns run timelines into per-discipline call statistics and workflow
//! scores:
//!
//! - [`RunTimeline`] / [`TimelineEvent`]: raw events of one execution
//! - [`DisciplineAnalysis`]: elapsed-time samples of one discipline
//! - [`RunAnalysis`]: one run partitioned into points and discipline calls
//! - [`WorkflowAnalysis`]: all runs flattened and scored
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use surrogate_advisor::analysis::{RunTimeline, TimelineEvent, WorkflowAnalysis};
//! use surrogate_advisor::discipline::Discipline;
//! use surrogate_advisor::samples::MemorySampleStore;
//!
//! # fn main() -> surrogate_advisor::Result<()> {
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
//! let timeline = RunTimeline::new(
//!     "run-1",
//!     vec![
//!         TimelineEvent::call("D1", t0, 2.0),
//!         TimelineEvent::driver("DOE", t0 + Duration::seconds(4)),
//!     ],
//! );
//!
//! let mut store = MemorySampleStore::new();
//! store.register("D1", ["x"], ["y"]);
//!
//! let mut workflow = WorkflowAnalysis::new(vec![Discipline::new("D1", "D1")])?;
//! workflow.add_timeline(timeline, &store)?;
//! assert!((workflow.runtime_per_point()? - 4.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

mod discipline;
mod run;
mod timeline;
mod workflow;

pub use discipline::DisciplineAnalysis;
pub use run::RunAnalysis;
pub use timeline::{seconds_between, RunTimeline, TimelineEvent};
pub use workflow::{
    DisciplineMetric, DisciplineScore, WorkflowAnalysis, WorkflowMetric, WORKFLOW_RUN_ID,
};
