//! Sample-count heuristics and accuracy profiles
//!
//! Both registries are closed enums: every heuristic is a pure function of
//! the input dimensionality, every profile a fixed multiplier on the advised
//! count.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Heuristic estimating a "good" training sample count from `n_var`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleAdvisor {
    /// Quadratic rule: `(n + 1)(n + 2)`
    Jia,
    /// Scaled quadratic rule: `3/4 (n + 1)(n + 2)`
    Kaufman,
    /// Linear rule: `10 n`
    Jones,
}

impl SampleAdvisor {
    /// Every implemented heuristic, in sweep order.
    pub const ALL: [Self; 3] = [Self::Jia, Self::Kaufman, Self::Jones];

    /// Advised number of training samples for `n_var` input variables.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn advise(self, n_var: usize) -> f64 {
        let n = n_var as f64;
        match self {
            Self::Jia => (n + 1.0) * (n + 2.0),
            Self::Kaufman => 0.75 * (n + 1.0) * (n + 2.0),
            Self::Jones => 10.0 * n,
        }
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jia => "jia",
            Self::Kaufman => "kaufman",
            Self::Jones => "jones",
        }
    }
}

impl Default for SampleAdvisor {
    fn default() -> Self {
        Self::Jones
    }
}

impl fmt::Display for SampleAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleAdvisor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownHeuristic(s.to_string()))
    }
}

/// Accuracy profile: multiplier on the advised sample count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Half the advised samples
    Efficient,
    /// The advised samples
    Advised,
    /// 20% more than advised
    Conservative,
}

impl Profile {
    /// Every profile, cheapest first.
    pub const ALL: [Self; 3] = [Self::Efficient, Self::Advised, Self::Conservative];

    /// Multiplier applied to the advised sample count.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Efficient => 0.5,
            Self::Advised => 1.0,
            Self::Conservative => 1.2,
        }
    }

    /// The factor expressed as a coverage percentage (50, 100, 120).
    #[must_use]
    pub const fn coverage_pct(self) -> u32 {
        match self {
            Self::Efficient => 50,
            Self::Advised => 100,
            Self::Conservative => 120,
        }
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Efficient => "efficient",
            Self::Advised => "advised",
            Self::Conservative => "conservative",
        }
    }

    /// Requested sample count for `n_var` inputs under `advisor`.
    #[must_use]
    pub fn requested_samples(self, advisor: SampleAdvisor, n_var: usize) -> f64 {
        self.factor() * advisor.advise(n_var)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::Advised
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownProfile(s.to_string()))
    }
}
