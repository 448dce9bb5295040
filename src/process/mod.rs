//! Process structure of an MDAO workflow
//!
//! The [`DesignGraph`] seam supplies execution order, the nested driver
//! hierarchy and variable producer/consumer edges. On top of it this module
//! enumerates replacement candidates ([`enumerate_candidates`]) and the
//! variables crossing each candidate's boundary ([`io_for_replaced`]).
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use surrogate_advisor::process::{
//!     enumerate_candidates, CandidateGroup, ProcessHierarchy, StaticDesignGraph,
//! };
//!
//! # fn main() -> surrogate_advisor::Result<()> {
//! let hierarchy = ProcessHierarchy::from_nested_default(&json!([
//!     "Coordinator",
//!     ["Optimizer", ["Converger", "D1", "D2"], "F1"]
//! ]))?;
//! let graph = StaticDesignGraph::builder(hierarchy)
//!     .discipline("D1", ["x", "y2"], ["y1"])
//!     .discipline("D2", ["y1"], ["y2"])
//!     .discipline("F1", ["y1", "y2"], ["f"])
//!     .build()?;
//!
//! let candidates = enumerate_candidates(&graph, false)?;
//! assert!(candidates.contains(&CandidateGroup::converged(["D1", "D2"])));
//! # Ok(())
//! # }
//! ```

mod boundary;
mod graph;
mod groups;
mod hierarchy;

pub use boundary::{io_for_replaced, BoundaryIo};
pub use graph::{DesignGraph, StaticDesignGraph, StaticDesignGraphBuilder, DEFAULT_CONSTANT_SOURCE};
pub use groups::{enumerate_candidates, CandidateGroup};
pub use hierarchy::{Cycle, DriverKind, ProcessHierarchy, ProcessNode};
