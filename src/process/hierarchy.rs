//! Nested process hierarchy as a tagged tree

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of driver opening a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverKind {
    /// Workflow entry point; provides fixed parameters
    Coordinator,
    /// Design-of-experiments sampler
    Doe,
    /// Optimizer
    Optimizer,
    /// Inner fixed-point iteration (feedback loop)
    Converger,
}

impl DriverKind {
    /// Default classifier for driver component names.
    ///
    /// Returns `None` for anything that is not a known driver name.
    #[must_use]
    pub fn from_component_name(name: &str) -> Option<Self> {
        match name {
            "Coordinator" | "COOR" => Some(Self::Coordinator),
            "DOE" | "DoE" => Some(Self::Doe),
            "Optimizer" | "OPT" => Some(Self::Optimizer),
            "Converger" | "CONV" => Some(Self::Converger),
            _ => None,
        }
    }

    /// Whether a surrogate may absorb a complete loop of this kind.
    ///
    /// Only convergence loops qualify; optimizer and DOE loops drive the
    /// points being saved.
    #[must_use]
    pub const fn is_replaceable(self) -> bool {
        matches!(self, Self::Converger)
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Coordinator => "Coordinator",
            Self::Doe => "DOE",
            Self::Optimizer => "Optimizer",
            Self::Converger => "Converger",
        };
        f.write_str(name)
    }
}

/// Child of a cycle: a discipline leaf or a nested cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcessNode {
    /// Discipline id
    Discipline(String),
    /// Nested cycle
    Cycle(Cycle),
}

impl ProcessNode {
    /// Shorthand for a discipline leaf.
    #[must_use]
    pub fn discipline(id: impl Into<String>) -> Self {
        Self::Discipline(id.into())
    }

    fn collect_disciplines<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Discipline(id) => out.push(id),
            Self::Cycle(cycle) => {
                for child in &cycle.children {
                    child.collect_disciplines(out);
                }
            }
        }
    }
}

/// A driver and the ordered items it iterates over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    driver: String,
    kind: DriverKind,
    children: Vec<ProcessNode>,
}

impl Cycle {
    /// Create a cycle.
    #[must_use]
    pub fn new(driver: impl Into<String>, kind: DriverKind, children: Vec<ProcessNode>) -> Self {
        Self {
            driver: driver.into(),
            kind,
            children,
        }
    }

    /// Driver component id.
    #[must_use]
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Driver kind.
    #[must_use]
    pub const fn kind(&self) -> DriverKind {
        self.kind
    }

    /// Items in execution order.
    #[must_use]
    pub fn children(&self) -> &[ProcessNode] {
        &self.children
    }

    /// Every discipline inside this cycle, nested ones included, in
    /// execution order.
    #[must_use]
    pub fn disciplines(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for child in &self.children {
            child.collect_disciplines(&mut out);
        }
        out
    }

    /// Position of `discipline` among the direct children.
    #[must_use]
    pub fn position_of(&self, discipline: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| matches!(c, ProcessNode::Discipline(id) if id == discipline))
    }

    fn collect_cycles<'a>(&'a self, out: &mut Vec<&'a Self>) {
        out.push(self);
        for child in &self.children {
            if let ProcessNode::Cycle(cycle) = child {
                cycle.collect_cycles(out);
            }
        }
    }

    fn level_of(&self, discipline: &str) -> Option<&Self> {
        if self.position_of(discipline).is_some() {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            ProcessNode::Cycle(cycle) => cycle.level_of(discipline),
            ProcessNode::Discipline(_) => None,
        })
    }

    fn to_nested(&self) -> Value {
        let mut items = vec![Value::String(self.driver.clone())];
        items.extend(self.children.iter().map(|child| match child {
            ProcessNode::Discipline(id) => Value::String(id.clone()),
            ProcessNode::Cycle(cycle) => cycle.to_nested(),
        }));
        Value::Array(items)
    }
}

/// Nested driver/discipline structure of a workflow, rooted at the
/// coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessHierarchy {
    root: Cycle,
}

impl ProcessHierarchy {
    /// Wrap a root cycle.
    #[must_use]
    pub const fn new(root: Cycle) -> Self {
        Self { root }
    }

    /// Parse the nested list form, e.g.
    /// `["COOR", ["OPT", ["CONV", "D1", "D2"], "F1"]]`.
    ///
    /// A list whose first element `classify` recognises as a driver is a
    /// cycle. Any other list is a plain grouping and its items are spliced
    /// into the enclosing cycle, so the doubly wrapped
    /// `["COOR", [["OPT", [["CONV", ["D1", "D2"]], "F1"]]]]` parses to the
    /// same tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the root is not a list opened by a
    /// driver, or an item is neither a string nor a list.
    pub fn from_nested<F>(value: &Value, classify: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<DriverKind>,
    {
        let items = value
            .as_array()
            .ok_or_else(|| Error::InvalidInput("process hierarchy must be a list".to_string()))?;
        let root = parse_cycle(items, &classify)?.ok_or_else(|| {
            Error::InvalidInput("process hierarchy must start with a driver".to_string())
        })?;
        Ok(Self { root })
    }

    /// Parse with [`DriverKind::from_component_name`].
    ///
    /// # Errors
    ///
    /// Same as [`ProcessHierarchy::from_nested`].
    pub fn from_nested_default(value: &Value) -> Result<Self> {
        Self::from_nested(value, DriverKind::from_component_name)
    }

    /// Root cycle.
    #[must_use]
    pub const fn root(&self) -> &Cycle {
        &self.root
    }

    /// Disciplines in execution order.
    #[must_use]
    pub fn flatten_disciplines(&self) -> Vec<&str> {
        self.root.disciplines()
    }

    /// Every cycle, root first, parents before their nested cycles.
    #[must_use]
    pub fn cycles(&self) -> Vec<&Cycle> {
        let mut out = Vec::new();
        self.root.collect_cycles(&mut out);
        out
    }

    /// Innermost cycle that lists `discipline` as a direct child.
    #[must_use]
    pub fn level_of(&self, discipline: &str) -> Option<&Cycle> {
        self.root.level_of(discipline)
    }

    /// Render back to the nested list form.
    #[must_use]
    pub fn to_nested(&self) -> Value {
        self.root.to_nested()
    }
}

fn parse_cycle<F>(items: &[Value], classify: &F) -> Result<Option<Cycle>>
where
    F: Fn(&str) -> Option<DriverKind>,
{
    let Some((Value::String(driver), rest)) = items.split_first() else {
        return Ok(None);
    };
    let Some(kind) = classify(driver) else {
        return Ok(None);
    };

    let mut children = Vec::new();
    parse_children(rest, classify, &mut children)?;
    Ok(Some(Cycle::new(driver.clone(), kind, children)))
}

fn parse_children<F>(items: &[Value], classify: &F, out: &mut Vec<ProcessNode>) -> Result<()>
where
    F: Fn(&str) -> Option<DriverKind>,
{
    for item in items {
        match item {
            Value::String(id) => out.push(ProcessNode::Discipline(id.clone())),
            Value::Array(nested) => match parse_cycle(nested, classify)? {
                Some(cycle) => out.push(ProcessNode::Cycle(cycle)),
                None => parse_children(nested, classify, out)?,
            },
            other => {
                return Err(Error::InvalidInput(format!(
                    "unexpected process hierarchy item: {other}"
                )))
            }
        }
    }
    Ok(())
}
