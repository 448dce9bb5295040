//! Enumeration of surrogate replacement candidates

use super::{DesignGraph, ProcessNode};
use crate::{Error, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Ordered set of disciplines proposed for joint replacement by one
/// surrogate.
///
/// `converged` groups replace a complete feedback loop: the surrogate is
/// evaluated once per point instead of once per loop iteration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateGroup {
    members: Vec<String>,
    converged: bool,
}

impl CandidateGroup {
    /// Unconverged group.
    #[must_use]
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            converged: false,
        }
    }

    /// Group replacing a complete feedback loop.
    #[must_use]
    pub fn converged<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            converged: true,
            ..Self::new(members)
        }
    }

    /// Single discipline.
    #[must_use]
    pub fn single(discipline: impl Into<String>) -> Self {
        Self {
            members: vec![discipline.into()],
            converged: false,
        }
    }

    /// Member discipline ids in execution order.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Whether the group replaces a complete feedback loop.
    #[must_use]
    pub const fn is_converged(&self) -> bool {
        self.converged
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `discipline` is a member.
    #[must_use]
    pub fn contains(&self, discipline: &str) -> bool {
        self.members.iter().any(|m| m == discipline)
    }
}

impl fmt::Display for CandidateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.members.join("+");
        if self.converged {
            write!(f, "Converger({joined})")
        } else {
            f.write_str(&joined)
        }
    }
}

/// Enumerate every discipline group that may legally be replaced by one
/// surrogate, in process order, without duplicates.
///
/// For each discipline `D`:
/// - `D` alone is a candidate.
/// - If `D` opens a convergence loop, `D` plus the rest of that loop is a
///   converged candidate.
/// - Walking forward through the siblings after `D`, each prefix is a
///   candidate. A nested cycle ends the walk, unless `allow_complete_loops`
///   is set and the cycle is a convergence loop, in which case the whole
///   loop is absorbed and the group becomes converged.
///
/// # Errors
///
/// Returns [`Error::UnknownDiscipline`] if a discipline of the process order
/// is missing from the hierarchy.
pub fn enumerate_candidates(
    graph: &dyn DesignGraph,
    allow_complete_loops: bool,
) -> Result<Vec<CandidateGroup>> {
    let hierarchy = graph.process_hierarchy();
    let mut seen = FxHashSet::default();
    let mut candidates = Vec::new();
    let mut emit = |group: CandidateGroup| {
        if seen.insert(group.clone()) {
            candidates.push(group);
        }
    };

    for discipline in graph.process_order() {
        emit(CandidateGroup::single(discipline.as_str()));

        let level = hierarchy
            .level_of(&discipline)
            .ok_or_else(|| Error::UnknownDiscipline(discipline.clone()))?;
        let position = level
            .position_of(&discipline)
            .ok_or_else(|| Error::UnknownDiscipline(discipline.clone()))?;
        let following = &level.children()[position + 1..];

        if level.kind().is_replaceable() && position == 0 {
            emit(CandidateGroup::converged(level.disciplines()));
        }

        let mut members = vec![discipline.clone()];
        let mut converged = false;
        for node in following {
            match node {
                ProcessNode::Discipline(id) => members.push(id.clone()),
                ProcessNode::Cycle(cycle) => {
                    if !allow_complete_loops || !cycle.kind().is_replaceable() {
                        break;
                    }
                    members.extend(cycle.disciplines().into_iter().map(str::to_string));
                    converged = true;
                }
            }
            emit(CandidateGroup {
                members: members.clone(),
                converged,
            });
        }
    }

    debug!(count = candidates.len(), allow_complete_loops, "enumerated candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessHierarchy, StaticDesignGraph};
    use serde_json::json;

    fn graph(nested: serde_json::Value) -> StaticDesignGraph {
        let hierarchy = ProcessHierarchy::from_nested_default(&nested).unwrap();
        let mut builder = StaticDesignGraph::builder(hierarchy.clone());
        for id in hierarchy.flatten_disciplines() {
            builder = builder.discipline(id, Vec::<String>::new(), Vec::<String>::new());
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_flat_doe() {
        let graph = graph(json!(["Coordinator", ["DOE", "A", "B", "C"]]));
        let labels: Vec<String> = enumerate_candidates(&graph, false)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, ["A", "A+B", "A+B+C", "B", "B+C", "C"]);
    }

    #[test]
    fn test_converger_loop() {
        let graph = graph(json!([
            "Coordinator",
            ["Optimizer", ["Converger", "D1", "D2"], "F1"]
        ]));
        let candidates = enumerate_candidates(&graph, false).unwrap();
        assert!(candidates.contains(&CandidateGroup::converged(["D1", "D2"])));
        assert!(candidates.contains(&CandidateGroup::new(["D1", "D2"])));
        // D2 does not open the loop
        assert!(!candidates.contains(&CandidateGroup::converged(["D2"])));
        assert!(candidates.contains(&CandidateGroup::single("F1")));
        assert_eq!(candidates.len(), 5);
    }

    #[test]
    fn test_nested_loop_stops_walk() {
        let graph = graph(json!([
            "Coordinator",
            ["DOE", "A", ["Converger", "D1", "D2"], "F1"]
        ]));
        let candidates = enumerate_candidates(&graph, false).unwrap();
        assert!(!candidates.iter().any(|c| c.contains("A") && c.contains("D1")));
    }

    #[test]
    fn test_complete_loop_absorbed() {
        let graph = graph(json!([
            "Coordinator",
            ["DOE", "A", ["Converger", "D1", "D2"], "F1"]
        ]));
        let candidates = enumerate_candidates(&graph, true).unwrap();
        assert!(candidates.contains(&CandidateGroup::converged(["A", "D1", "D2"])));
        assert!(candidates.contains(&CandidateGroup::converged(["A", "D1", "D2", "F1"])));
    }

    #[test]
    fn test_optimizer_loop_never_absorbed() {
        let graph = graph(json!([
            "Coordinator",
            ["DOE", "A", ["Optimizer", "B"]]
        ]));
        let candidates = enumerate_candidates(&graph, true).unwrap();
        assert!(!candidates.iter().any(|c| c.len() > 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(CandidateGroup::new(["D1", "D2"]).to_string(), "D1+D2");
        assert_eq!(
            CandidateGroup::converged(["D1", "D2"]).to_string(),
            "Converger(D1+D2)"
        );
    }
}
