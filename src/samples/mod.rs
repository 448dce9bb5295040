//! Sample store seam for recorded discipline evaluations
//!
//! Each discipline accumulates input/output samples across runs. The advisor
//! only needs two things from that history: the per-variable sample columns
//! (to judge which inputs actually vary) and how many samples are already
//! available (free training data).
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use surrogate_advisor::samples::{MemorySampleStore, SampleStore};
//!
//! # fn main() -> surrogate_advisor::Result<()> {
//! let mut store = MemorySampleStore::new();
//! store.register("D1", ["x", "z"], ["y1"]);
//!
//! for (run, x) in [("run-1", 1.0), ("run-1", 2.0)] {
//!     let inputs = BTreeMap::from([("x".to_string(), x), ("z".to_string(), 5.0)]);
//!     let outputs = BTreeMap::from([("y1".to_string(), x * 2.0)]);
//!     store.add_sample("D1", run, inputs, outputs)?;
//! }
//!
//! let samples = store.samples("D1")?;
//! assert_eq!(samples.n_samples(), 2);
//! assert_eq!(samples.significant_variable_count(), 1);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::{MemorySampleStore, SampleRecord};

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column-oriented view of every sample recorded for one discipline.
///
/// Format: `{"var": [sample1, sample2, ...], ...}` for inputs and outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    /// Input variable columns
    pub inputs: BTreeMap<String, Vec<f64>>,
    /// Output variable columns
    pub outputs: BTreeMap<String, Vec<f64>>,
}

impl SampleSet {
    /// Number of recorded samples (length of the first input column).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.inputs
            .values()
            .next()
            .or_else(|| self.outputs.values().next())
            .map_or(0, Vec::len)
    }

    /// Input variables whose observed values are not all identical.
    ///
    /// Variables without any samples are not counted.
    #[must_use]
    pub fn non_constant_inputs(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .filter(|(_, values)| spread(values).is_some_and(|s| s != 0.0))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of inputs that show any variation across samples.
    #[must_use]
    pub fn significant_variable_count(&self) -> usize {
        self.non_constant_inputs().len()
    }

    /// Mean value of each input column that has samples.
    #[must_use]
    pub fn input_means(&self) -> BTreeMap<String, f64> {
        column_means(&self.inputs)
    }

    /// Mean value of each output column that has samples.
    #[must_use]
    pub fn output_means(&self) -> BTreeMap<String, f64> {
        column_means(&self.outputs)
    }
}

fn spread(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    let (min, max) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(max - min)
}

#[allow(clippy::cast_precision_loss)]
fn column_means(columns: &BTreeMap<String, Vec<f64>>) -> BTreeMap<String, f64> {
    columns
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            (name.clone(), mean)
        })
        .collect()
}

/// Read access to recorded discipline samples.
///
/// This is the boundary to the persistence collaborator; the advisor never
/// writes through it.
pub trait SampleStore {
    /// All samples recorded for a discipline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDiscipline`](crate::Error::UnknownDiscipline)
    /// if the discipline was never registered.
    fn samples(&self, discipline_id: &str) -> Result<SampleSet>;

    /// Number of samples already available for a discipline.
    ///
    /// # Errors
    ///
    /// Same as [`SampleStore::samples`].
    fn n_available_samples(&self, discipline_id: &str) -> Result<usize> {
        Ok(self.samples(discipline_id)?.n_samples())
    }
}
