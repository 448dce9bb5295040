//! Discipline Record - one analysis tool of the workflow
//!
//! A discipline is created once from the workflow definition and never
//! deleted. Its recorded samples live in a [`SampleStore`](crate::samples::SampleStore)
//! keyed by [`Discipline::id`].

use serde::{Deserialize, Serialize};

/// Discipline (design competence) of an MDAO workflow.
///
/// Carries identity and the declared input/output variable names. Runtime
/// behaviour is tracked separately by
/// [`DisciplineAnalysis`](crate::analysis::DisciplineAnalysis).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Discipline {
    id: String,
    uid: String,
    description: Option<String>,
    input_variables: Vec<String>,
    output_variables: Vec<String>,
}

impl Discipline {
    /// Create a discipline with an internal id and an external uid.
    ///
    /// # Arguments
    ///
    /// * `id` - Internal identifier, as it appears in run timelines
    /// * `uid` - External identifier from the design graph
    #[must_use]
    pub fn new(id: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
            description: None,
            input_variables: Vec::new(),
            output_variables: Vec::new(),
        }
    }

    /// Create a builder for a discipline with declared variables.
    #[must_use]
    pub fn builder(id: impl Into<String>, uid: impl Into<String>) -> DisciplineBuilder {
        DisciplineBuilder::new(id, uid)
    }

    /// Get the internal id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the external uid.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the declared input variables.
    #[must_use]
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Get the declared output variables.
    #[must_use]
    pub fn output_variables(&self) -> &[String] {
        &self.output_variables
    }

    /// Whether `key` names this discipline by id or uid.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.uid == key
    }

    /// Append input variables, skipping names already declared.
    pub fn add_input_variables<I, S>(&mut self, variables: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.input_variables, variables);
    }

    /// Append output variables, skipping names already declared.
    pub fn add_output_variables<I, S>(&mut self, variables: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.output_variables, variables);
    }
}

fn extend_unique<I, S>(target: &mut Vec<String>, variables: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for variable in variables {
        let variable = variable.into();
        if !target.contains(&variable) {
            target.push(variable);
        }
    }
}

/// Builder for `Discipline`.
#[derive(Debug)]
pub struct DisciplineBuilder {
    discipline: Discipline,
}

impl DisciplineBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            discipline: Discipline::new(id, uid),
        }
    }

    /// Set a human-readable description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.discipline.description = Some(description.into());
        self
    }

    /// Declare input variables.
    #[must_use]
    pub fn inputs<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.discipline.add_input_variables(variables);
        self
    }

    /// Declare output variables.
    #[must_use]
    pub fn outputs<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.discipline.add_output_variables(variables);
        self
    }

    /// Build the `Discipline`.
    #[must_use]
    pub fn build(self) -> Discipline {
        self.discipline
    }
}
