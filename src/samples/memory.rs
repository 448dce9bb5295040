//! In-memory sample store with JSON snapshots.
//!
//! Records are kept in insertion order per discipline. A snapshot of the
//! whole store can be written to and read back from a JSON document.

use super::{SampleSet, SampleStore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One evaluation of a discipline within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Run that produced the sample
    pub run_id: String,
    /// Position of the sample within its run
    pub sample_in_run: usize,
    /// Input variable values
    pub inputs: BTreeMap<String, f64>,
    /// Output variable values
    pub outputs: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ToolEntry {
    inputs: Vec<String>,
    outputs: Vec<String>,
    records: Vec<SampleRecord>,
}

/// In-memory store keyed by discipline id.
///
/// # Example
///
/// ```rust
/// use surrogate_advisor::samples::{MemorySampleStore, SampleStore};
///
/// let mut store = MemorySampleStore::new();
/// store.register("D1", ["x"], ["y"]);
/// assert_eq!(store.n_available_samples("D1").unwrap(), 0);
/// assert!(store.n_available_samples("D9").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySampleStore {
    tools: BTreeMap<String, ToolEntry>,
}

impl MemorySampleStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a discipline and its variable sets.
    ///
    /// Re-registering keeps existing records and replaces the declaration.
    pub fn register<I, O, S, T>(&mut self, discipline_id: impl Into<String>, inputs: I, outputs: O)
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let entry = self.tools.entry(discipline_id.into()).or_default();
        entry.inputs = inputs.into_iter().map(Into::into).collect();
        entry.outputs = outputs.into_iter().map(Into::into).collect();
    }

    /// Whether a discipline has been registered.
    #[must_use]
    pub fn contains(&self, discipline_id: &str) -> bool {
        self.tools.contains_key(discipline_id)
    }

    /// Total number of records across all disciplines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.values().map(|t| t.records.len()).sum()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record one evaluation of a discipline.
    ///
    /// # Errors
    ///
    /// Returns error if the discipline is not registered or a declared
    /// variable is missing from the sample.
    pub fn add_sample(
        &mut self,
        discipline_id: &str,
        run_id: impl Into<String>,
        inputs: BTreeMap<String, f64>,
        outputs: BTreeMap<String, f64>,
    ) -> Result<()> {
        let entry = self
            .tools
            .get_mut(discipline_id)
            .ok_or_else(|| Error::UnknownDiscipline(discipline_id.to_string()))?;

        for declared in entry.inputs.iter().chain(&entry.outputs) {
            if !inputs.contains_key(declared) && !outputs.contains_key(declared) {
                return Err(Error::InvalidInput(format!(
                    "sample for {discipline_id} is missing variable {declared}"
                )));
            }
        }

        let run_id = run_id.into();
        let sample_in_run = entry.records.iter().filter(|r| r.run_id == run_id).count();
        entry.records.push(SampleRecord {
            run_id,
            sample_in_run,
            inputs,
            outputs,
        });
        Ok(())
    }

    /// Drop every record produced by `run_id`. Returns the number removed.
    pub fn purge_run(&mut self, run_id: &str) -> usize {
        let mut removed = 0;
        for entry in self.tools.values_mut() {
            let before = entry.records.len();
            entry.records.retain(|r| r.run_id != run_id);
            removed += before - entry.records.len();
        }
        removed
    }

    /// Records of one discipline, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns error if the discipline is not registered.
    pub fn records(&self, discipline_id: &str) -> Result<&[SampleRecord]> {
        self.tools
            .get(discipline_id)
            .map(|t| t.records.as_slice())
            .ok_or_else(|| Error::UnknownDiscipline(discipline_id.to_string()))
    }

    /// Serialize the store to a JSON document.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a store from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write a JSON snapshot to `path`.
    ///
    /// # Errors
    ///
    /// Returns error on IO or serialization failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a JSON snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns error on IO or parse failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl SampleStore for MemorySampleStore {
    fn samples(&self, discipline_id: &str) -> Result<SampleSet> {
        let entry = self
            .tools
            .get(discipline_id)
            .ok_or_else(|| Error::UnknownDiscipline(discipline_id.to_string()))?;

        Ok(SampleSet {
            inputs: entry
                .inputs
                .iter()
                .map(|name| (name.clone(), column(&entry.records, name, |r| &r.inputs)))
                .collect(),
            outputs: entry
                .outputs
                .iter()
                .map(|name| (name.clone(), column(&entry.records, name, |r| &r.outputs)))
                .collect(),
        })
    }

    fn n_available_samples(&self, discipline_id: &str) -> Result<usize> {
        self.records(discipline_id).map(<[SampleRecord]>::len)
    }
}

fn column<F>(records: &[SampleRecord], name: &str, pick: F) -> Vec<f64>
where
    F: Fn(&SampleRecord) -> &BTreeMap<String, f64>,
{
    records
        .iter()
        .filter_map(|r| pick(r).get(name).copied())
        .collect()
}
