//! # Surrogate Advisor: sampling and advisory engine for MDAO workflows
//!
//! Profiles a multidisciplinary design analysis and optimization workflow
//! from recorded run timelines, enumerates which disciplines (or groups of
//! disciplines) could be replaced by a surrogate model, and quantifies the
//! trade-off between training-data cost and the optimizer iterations or
//! wall-clock time gained under a fixed budget.
//!
//! ## Pipeline
//!
//! - [`analysis`]: timelines → per-discipline call statistics → workflow scores
//! - [`process`]: design graph → replacement candidates and their I/O boundary
//! - [`advise`]: scores + candidates + budget → strategies, advise table, ranking
//! - [`session`]: owns the above for one workflow
//! - [`export`]: advise tables to Arrow, Parquet or JSON
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use serde_json::json;
//! use surrogate_advisor::analysis::{RunTimeline, TimelineEvent};
//! use surrogate_advisor::config::AdvisorConfig;
//! use surrogate_advisor::discipline::Discipline;
//! use surrogate_advisor::process::{ProcessHierarchy, StaticDesignGraph};
//! use surrogate_advisor::samples::MemorySampleStore;
//! use surrogate_advisor::session::{AdvisorySession, BudgetRequest};
//!
//! # fn main() -> surrogate_advisor::Result<()> {
//! let hierarchy = ProcessHierarchy::from_nested_default(&json!(["Coordinator", ["DOE", "A", "B"]]))?;
//! let graph = StaticDesignGraph::builder(hierarchy)
//!     .discipline("A", ["x"], ["y"])
//!     .discipline("B", ["y"], ["f"])
//!     .external_source("x", "DOE")
//!     .external_target("f", "DOE")
//!     .build()?;
//!
//! let mut store = MemorySampleStore::new();
//! store.register("A", ["x"], ["y"]);
//! store.register("B", ["y"], ["f"]);
//!
//! let disciplines = vec![Discipline::new("A", "A"), Discipline::new("B", "B")];
//! let mut session = AdvisorySession::new(
//!     disciplines,
//!     Box::new(graph),
//!     Box::new(store),
//!     AdvisorConfig::default(),
//! )?;
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
//! session.analyse_run(RunTimeline::new(
//!     "run-1",
//!     vec![
//!         TimelineEvent::call("A", t0, 4.0),
//!         TimelineEvent::call("B", t0 + Duration::seconds(4), 1.0),
//!         TimelineEvent::driver("DOE", t0 + Duration::seconds(6)),
//!     ],
//! ))?;
//!
//! let advisor = session.give_advice(BudgetRequest::Iterations(50))?;
//! let best = &advisor.ranked_strategies()?[0];
//! println!("replace {} with {} samples", best.candidate, best.samples);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod advise;
pub mod analysis;
pub mod config;
pub mod discipline;
pub mod error;
pub mod export;
pub mod process;
pub mod samples;
pub mod session;
pub mod telemetry;

pub use error::{Error, Result};
