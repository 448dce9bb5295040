//! Advisor configuration
//!
//! Settings are plain data (serde, JSON on disk) with a validating builder.
//!
//! ```rust
//! use surrogate_advisor::config::AdvisorConfig;
//! use surrogate_advisor::advise::SampleAdvisor;
//!
//! # fn main() -> surrogate_advisor::Result<()> {
//! let config = AdvisorConfig::builder()
//!     .surrogate_prediction_cost(0.5)
//!     .account_for_profiling(true)
//!     .default_advisor(SampleAdvisor::Jia)
//!     .build()?;
//! assert!(config.account_for_profiling);
//!
//! let from_json = AdvisorConfig::from_json_str(r#"{"surrogate_prediction_cost": 2.0}"#)?;
//! assert_eq!(from_json.coverage_percentages, vec![25, 50, 75, 100, 125, 150]);
//! # Ok(())
//! # }
//! ```

use crate::advise::{Profile, SampleAdvisor};
use crate::process::{DriverKind, ProcessHierarchy};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coverage percentages swept by `build_advise` by default.
pub const DEFAULT_COVERAGE_PERCENTAGES: [u32; 6] = [25, 50, 75, 100, 125, 150];

/// Cost in seconds of one surrogate prediction.
pub const DEFAULT_SURROGATE_PREDICTION_COST: f64 = 1.0;

/// Role of a timeline component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRole {
    /// DOE sampler or optimizer: each occurrence is one point
    TopLevelDriver,
    /// Inner convergence loop: ignored when flattening
    NestedDriver,
    /// Anything else: expected to be a discipline
    Discipline,
}

/// Names of driver components as they appear in run timelines and in the
/// process hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentRoles {
    /// Drivers whose every occurrence counts as one point
    pub top_level_drivers: Vec<String>,
    /// Drivers that contribute no points and are skipped
    pub nested_drivers: Vec<String>,
    /// Workflow entry points; only open the process hierarchy
    pub coordinators: Vec<String>,
}

impl Default for ComponentRoles {
    fn default() -> Self {
        Self {
            top_level_drivers: vec!["DOE".to_string(), "Optimizer".to_string()],
            nested_drivers: vec!["Converger".to_string()],
            coordinators: vec!["Coordinator".to_string()],
        }
    }
}

impl ComponentRoles {
    /// Classify a timeline component name.
    #[must_use]
    pub fn classify(&self, component: &str) -> ComponentRole {
        if self.top_level_drivers.iter().any(|d| d == component) {
            ComponentRole::TopLevelDriver
        } else if self.nested_drivers.iter().any(|d| d == component) {
            ComponentRole::NestedDriver
        } else {
            ComponentRole::Discipline
        }
    }

    /// Driver kind of a process hierarchy item, `None` for a discipline.
    ///
    /// Top-level drivers map to [`DriverKind::Doe`] when their name is a
    /// known DOE name and to [`DriverKind::Optimizer`] otherwise.
    #[must_use]
    pub fn driver_kind(&self, component: &str) -> Option<DriverKind> {
        if self.coordinators.iter().any(|c| c == component) {
            return Some(DriverKind::Coordinator);
        }
        match self.classify(component) {
            ComponentRole::TopLevelDriver => match DriverKind::from_component_name(component) {
                Some(DriverKind::Doe) => Some(DriverKind::Doe),
                _ => Some(DriverKind::Optimizer),
            },
            ComponentRole::NestedDriver => Some(DriverKind::Converger),
            ComponentRole::Discipline => None,
        }
    }

    /// Parse a nested process hierarchy with these driver names.
    ///
    /// # Errors
    ///
    /// Same as [`ProcessHierarchy::from_nested`].
    pub fn parse_hierarchy(&self, value: &serde_json::Value) -> Result<ProcessHierarchy> {
        ProcessHierarchy::from_nested(value, |name| self.driver_kind(name))
    }

    /// Check that every driver of `hierarchy` is configured here with a
    /// matching kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first driver that is
    /// unknown or classified differently.
    pub fn check_hierarchy(&self, hierarchy: &ProcessHierarchy) -> Result<()> {
        for cycle in hierarchy.cycles() {
            let expected = self.driver_kind(cycle.driver());
            let consistent = match (expected, cycle.kind()) {
                (Some(DriverKind::Coordinator), kind) => kind == DriverKind::Coordinator,
                (Some(DriverKind::Converger), kind) => kind == DriverKind::Converger,
                (Some(_), kind) => matches!(kind, DriverKind::Doe | DriverKind::Optimizer),
                (None, _) => false,
            };
            if !consistent {
                return Err(Error::InvalidInput(format!(
                    "driver {} of the process hierarchy ({}) does not match the configured roles",
                    cycle.driver(),
                    cycle.kind()
                )));
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let overlap = self
            .top_level_drivers
            .iter()
            .chain(&self.nested_drivers)
            .find(|d| self.coordinators.contains(*d));
        if let Some(both) = overlap {
            return Err(Error::InvalidInput(format!(
                "component {both} cannot be both a coordinator and a point driver"
            )));
        }
        if let Some(both) = self
            .top_level_drivers
            .iter()
            .find(|d| self.nested_drivers.contains(*d))
        {
            return Err(Error::InvalidInput(format!(
                "component {both} cannot be both a top-level and a nested driver"
            )));
        }
        Ok(())
    }
}

/// Advisor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Cost in seconds of one surrogate prediction
    pub surrogate_prediction_cost: f64,
    /// Charge the profiling runs against the budget and credit existing samples
    pub account_for_profiling: bool,
    /// Coverage percentages of the advised sample count to tabulate
    pub coverage_percentages: Vec<u32>,
    /// Heuristics swept when building the advise table
    pub sample_advisors: Vec<SampleAdvisor>,
    /// Heuristic used by ranking helpers when none is named
    pub default_advisor: SampleAdvisor,
    /// Profile used by ranking helpers when none is named
    pub default_profile: Profile,
    /// Let candidate groups absorb complete nested loops
    pub allow_complete_loops: bool,
    /// Driver component names
    pub roles: ComponentRoles,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            surrogate_prediction_cost: DEFAULT_SURROGATE_PREDICTION_COST,
            account_for_profiling: false,
            coverage_percentages: DEFAULT_COVERAGE_PERCENTAGES.to_vec(),
            sample_advisors: SampleAdvisor::ALL.to_vec(),
            default_advisor: SampleAdvisor::default(),
            default_profile: Profile::default(),
            allow_complete_loops: false,
            roles: ComponentRoles::default(),
        }
    }
}

impl AdvisorConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the settings are invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if !self.surrogate_prediction_cost.is_finite() || self.surrogate_prediction_cost < 0.0 {
            return Err(Error::InvalidInput(format!(
                "surrogate prediction cost must be finite and non-negative, got {}",
                self.surrogate_prediction_cost
            )));
        }
        if self.coverage_percentages.is_empty() {
            return Err(Error::InvalidInput(
                "at least one coverage percentage is required".to_string(),
            ));
        }
        if self.coverage_percentages.contains(&0) {
            return Err(Error::InvalidInput(
                "coverage percentages must be greater than 0".to_string(),
            ));
        }
        if self.sample_advisors.is_empty() {
            return Err(Error::InvalidInput(
                "at least one sample advisor is required".to_string(),
            ));
        }
        if !self.sample_advisors.contains(&self.default_advisor) {
            return Err(Error::InvalidInput(format!(
                "default advisor {} is not among the swept advisors",
                self.default_advisor
            )));
        }
        self.roles.validate()
    }
}

/// Builder for `AdvisorConfig`.
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    config: AdvisorConfig,
}

impl AdvisorConfigBuilder {
    /// Set the cost of one surrogate prediction (seconds).
    #[must_use]
    pub fn surrogate_prediction_cost(mut self, seconds: f64) -> Self {
        self.config.surrogate_prediction_cost = seconds;
        self
    }

    /// Enable or disable profiling cost accounting.
    #[must_use]
    pub fn account_for_profiling(mut self, enabled: bool) -> Self {
        self.config.account_for_profiling = enabled;
        self
    }

    /// Replace the coverage sweep.
    #[must_use]
    pub fn coverage_percentages(mut self, percentages: impl Into<Vec<u32>>) -> Self {
        self.config.coverage_percentages = percentages.into();
        self
    }

    /// Replace the swept heuristics.
    #[must_use]
    pub fn sample_advisors(mut self, advisors: impl Into<Vec<SampleAdvisor>>) -> Self {
        self.config.sample_advisors = advisors.into();
        self
    }

    /// Set the default heuristic.
    #[must_use]
    pub fn default_advisor(mut self, advisor: SampleAdvisor) -> Self {
        self.config.default_advisor = advisor;
        self
    }

    /// Set the default profile.
    #[must_use]
    pub fn default_profile(mut self, profile: Profile) -> Self {
        self.config.default_profile = profile;
        self
    }

    /// Allow candidate groups to absorb complete nested loops.
    #[must_use]
    pub fn allow_complete_loops(mut self, allowed: bool) -> Self {
        self.config.allow_complete_loops = allowed;
        self
    }

    /// Set driver component names.
    #[must_use]
    pub fn roles(mut self, roles: ComponentRoles) -> Self {
        self.config.roles = roles;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the settings are inconsistent.
    pub fn build(self) -> Result<AdvisorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
