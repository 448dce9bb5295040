//! Design graph seam and an in-memory implementation

use super::ProcessHierarchy;
use crate::discipline::Discipline;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Component name of the default constant source.
pub const DEFAULT_CONSTANT_SOURCE: &str = "Coordinator";

/// Dependency/design graph of an MDAO workflow.
///
/// Supplies the execution order, the nested cycle structure and, per
/// variable, which components produce and consume it.
pub trait DesignGraph {
    /// Disciplines in linear execution order.
    fn process_order(&self) -> Vec<String>;

    /// Nested cycle structure.
    fn process_hierarchy(&self) -> &ProcessHierarchy;

    /// Input variables of a discipline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDiscipline`] for an undeclared discipline.
    fn inputs_of(&self, discipline: &str) -> Result<Vec<String>>;

    /// Output variables of a discipline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDiscipline`] for an undeclared discipline.
    fn outputs_of(&self, discipline: &str) -> Result<Vec<String>>;

    /// Components producing `variable`.
    fn sources_of(&self, variable: &str) -> Vec<String>;

    /// Components consuming `variable`.
    fn targets_of(&self, variable: &str) -> Vec<String>;

    /// Whether values supplied by `source` are fixed for the whole workflow.
    fn is_constant_source(&self, source: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
struct DisciplineIo {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

/// [`DesignGraph`] built from declared discipline I/O.
///
/// Producer/consumer edges follow from the declared variables, plus any
/// external sources and targets (coordinator, optimizer) added explicitly.
#[derive(Debug, Clone)]
pub struct StaticDesignGraph {
    hierarchy: ProcessHierarchy,
    order: Vec<String>,
    io: BTreeMap<String, DisciplineIo>,
    external_sources: BTreeMap<String, Vec<String>>,
    external_targets: BTreeMap<String, Vec<String>>,
    constant_sources: BTreeSet<String>,
}

impl StaticDesignGraph {
    /// Start a builder over `hierarchy`.
    #[must_use]
    pub fn builder(hierarchy: ProcessHierarchy) -> StaticDesignGraphBuilder {
        StaticDesignGraphBuilder::new(hierarchy)
    }

    fn io(&self, discipline: &str) -> Result<&DisciplineIo> {
        self.io
            .get(discipline)
            .ok_or_else(|| Error::UnknownDiscipline(discipline.to_string()))
    }
}

impl DesignGraph for StaticDesignGraph {
    fn process_order(&self) -> Vec<String> {
        self.order.clone()
    }

    fn process_hierarchy(&self) -> &ProcessHierarchy {
        &self.hierarchy
    }

    fn inputs_of(&self, discipline: &str) -> Result<Vec<String>> {
        Ok(self.io(discipline)?.inputs.clone())
    }

    fn outputs_of(&self, discipline: &str) -> Result<Vec<String>> {
        Ok(self.io(discipline)?.outputs.clone())
    }

    fn sources_of(&self, variable: &str) -> Vec<String> {
        let mut sources: Vec<String> = self
            .external_sources
            .get(variable)
            .cloned()
            .unwrap_or_default();
        sources.extend(
            self.order
                .iter()
                .filter(|d| self.io.get(*d).is_some_and(|io| io.outputs.iter().any(|v| v == variable)))
                .cloned(),
        );
        sources
    }

    fn targets_of(&self, variable: &str) -> Vec<String> {
        let mut targets: Vec<String> = self
            .order
            .iter()
            .filter(|d| self.io.get(*d).is_some_and(|io| io.inputs.iter().any(|v| v == variable)))
            .cloned()
            .collect();
        if let Some(external) = self.external_targets.get(variable) {
            targets.extend(external.iter().cloned());
        }
        targets
    }

    fn is_constant_source(&self, source: &str) -> bool {
        self.constant_sources.contains(source)
    }
}

/// Builder for [`StaticDesignGraph`].
#[derive(Debug)]
pub struct StaticDesignGraphBuilder {
    hierarchy: ProcessHierarchy,
    order: Option<Vec<String>>,
    io: BTreeMap<String, DisciplineIo>,
    external_sources: BTreeMap<String, Vec<String>>,
    external_targets: BTreeMap<String, Vec<String>>,
    constant_sources: BTreeSet<String>,
}

impl StaticDesignGraphBuilder {
    fn new(hierarchy: ProcessHierarchy) -> Self {
        Self {
            hierarchy,
            order: None,
            io: BTreeMap::new(),
            external_sources: BTreeMap::new(),
            external_targets: BTreeMap::new(),
            constant_sources: BTreeSet::from([DEFAULT_CONSTANT_SOURCE.to_string()]),
        }
    }

    /// Declare a discipline's inputs and outputs.
    #[must_use]
    pub fn discipline<I, O, S, T>(mut self, id: impl Into<String>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.io.insert(
            id.into(),
            DisciplineIo {
                inputs: inputs.into_iter().map(Into::into).collect(),
                outputs: outputs.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Declare the I/O of every discipline in `disciplines`.
    #[must_use]
    pub fn disciplines(mut self, disciplines: &[Discipline]) -> Self {
        for discipline in disciplines {
            self = self.discipline(
                discipline.id(),
                discipline.input_variables().iter().cloned(),
                discipline.output_variables().iter().cloned(),
            );
        }
        self
    }

    /// Mark `source` (a driver or coordinator) as producing `variable`.
    #[must_use]
    pub fn external_source(mut self, variable: impl Into<String>, source: impl Into<String>) -> Self {
        self.external_sources
            .entry(variable.into())
            .or_default()
            .push(source.into());
        self
    }

    /// Mark `target` (a driver) as consuming `variable`.
    #[must_use]
    pub fn external_target(mut self, variable: impl Into<String>, target: impl Into<String>) -> Self {
        self.external_targets
            .entry(variable.into())
            .or_default()
            .push(target.into());
        self
    }

    /// Add a source whose values never vary.
    #[must_use]
    pub fn constant_source(mut self, source: impl Into<String>) -> Self {
        self.constant_sources.insert(source.into());
        self
    }

    /// Replace the constant-source set.
    #[must_use]
    pub fn constant_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constant_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Override the execution order (defaults to the hierarchy's leaf order).
    #[must_use]
    pub fn process_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Build the graph.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownDiscipline`] if a discipline in the hierarchy or the
    ///   execution order has no declared I/O
    /// - [`Error::DuplicateDiscipline`] if the execution order repeats a
    ///   discipline
    pub fn build(self) -> Result<StaticDesignGraph> {
        let order = self.order.unwrap_or_else(|| {
            self.hierarchy
                .flatten_disciplines()
                .into_iter()
                .map(str::to_string)
                .collect()
        });

        let mut seen = BTreeSet::new();
        for id in &order {
            if !seen.insert(id.as_str()) {
                return Err(Error::DuplicateDiscipline(id.clone()));
            }
        }
        for id in order
            .iter()
            .map(String::as_str)
            .chain(self.hierarchy.flatten_disciplines())
        {
            if !self.io.contains_key(id) {
                return Err(Error::UnknownDiscipline(id.to_string()));
            }
        }

        Ok(StaticDesignGraph {
            hierarchy: self.hierarchy,
            order,
            io: self.io,
            external_sources: self.external_sources,
            external_targets: self.external_targets,
            constant_sources: self.constant_sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hierarchy() -> ProcessHierarchy {
        ProcessHierarchy::from_nested_default(&json!(["Coordinator", ["DOE", "A", "B"]])).unwrap()
    }

    #[test]
    fn test_edges_from_declared_io() {
        let graph = StaticDesignGraph::builder(hierarchy())
            .discipline("A", ["x", "z"], ["y1"])
            .discipline("B", ["y1", "z"], ["y2"])
            .external_source("x", "DOE")
            .external_source("z", "Coordinator")
            .external_target("y2", "DOE")
            .build()
            .unwrap();

        assert_eq!(graph.process_order(), ["A", "B"]);
        assert_eq!(graph.sources_of("y1"), ["A"]);
        assert_eq!(graph.sources_of("z"), ["Coordinator"]);
        assert_eq!(graph.targets_of("z"), ["A", "B"]);
        assert_eq!(graph.targets_of("y2"), ["DOE"]);
        assert!(graph.is_constant_source("Coordinator"));
        assert!(!graph.is_constant_source("DOE"));
        assert!(graph.inputs_of("C").is_err());
    }

    #[test]
    fn test_undeclared_discipline_rejected() {
        let result = StaticDesignGraph::builder(hierarchy())
            .discipline("A", ["x"], ["y1"])
            .build();
        assert!(matches!(result, Err(Error::UnknownDiscipline(ref id)) if id == "B"));
    }

    #[test]
    fn test_duplicate_order_rejected() {
        let result = StaticDesignGraph::builder(hierarchy())
            .discipline("A", ["x"], ["y1"])
            .discipline("B", ["y1"], ["y2"])
            .process_order(["A", "A", "B"])
            .build();
        assert!(matches!(result, Err(Error::DuplicateDiscipline(_))));
    }

    #[test]
    fn test_from_discipline_models() {
        let disciplines = vec![
            Discipline::builder("A", "urn:A").inputs(["x"]).outputs(["y1"]).build(),
            Discipline::builder("B", "urn:B").inputs(["y1"]).outputs(["y2"]).build(),
        ];
        let graph = StaticDesignGraph::builder(hierarchy())
            .disciplines(&disciplines)
            .build()
            .unwrap();
        assert_eq!(graph.outputs_of("B").unwrap(), ["y2"]);
    }
}
