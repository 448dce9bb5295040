//! Export of advise tables for visualization collaborators
//!
//! Tables convert to an Arrow [`RecordBatch`], which can be written to
//! Parquet, or serialize straight to JSON.

use crate::advise::AdviseTable;
use crate::{Error, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Arrow schema of an exported advise table.
#[must_use]
pub fn advise_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("heuristic", DataType::Utf8, false),
        Field::new("candidate", DataType::Utf8, false),
        Field::new("converged", DataType::Boolean, false),
        Field::new("coverage_pct", DataType::UInt32, false),
        Field::new("samples", DataType::Float64, false),
        Field::new("training_time", DataType::Float64, false),
        Field::new("combined_time", DataType::Float64, false),
        Field::new("delta_objective_calls", DataType::Float64, false),
        Field::new("delta_time", DataType::Float64, false),
    ]))
}

impl AdviseTable {
    /// One row per table row, columns as in [`advise_schema`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Arrow`] if the batch cannot be assembled.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let rows = self.rows();
        let float_column = |pick: fn(&crate::advise::AdviseRow) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from_iter_values(rows.iter().map(pick)))
        };

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.heuristic.name()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.candidate.to_string()),
            )),
            Arc::new(BooleanArray::from(
                rows.iter()
                    .map(|r| r.candidate.is_converged())
                    .collect::<Vec<_>>(),
            )),
            Arc::new(UInt32Array::from_iter_values(
                rows.iter().map(|r| r.coverage_pct),
            )),
            float_column(|r| r.samples),
            float_column(|r| r.training_time),
            float_column(|r| r.combined_time),
            float_column(|r| r.delta_objective_calls),
            float_column(|r| r.delta_time),
        ];

        Ok(RecordBatch::try_new(advise_schema(), columns)?)
    }
}

/// Write `table` to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`Error::StorageError`] if the file cannot be created or written.
pub fn write_parquet<P: AsRef<Path>>(table: &AdviseTable, path: P) -> Result<()> {
    let batch = table.to_record_batch()?;
    let file = File::create(path.as_ref())
        .map_err(|e| Error::StorageError(format!("Failed to create Parquet file: {e}")))?;

    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| Error::StorageError(format!("Failed to create Parquet writer: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| Error::StorageError(format!("Failed to write record batch: {e}")))?;
    writer
        .close()
        .map_err(|e| Error::StorageError(format!("Failed to finalize Parquet file: {e}")))?;
    Ok(())
}

/// Serialize `table` to pretty-printed JSON.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails.
pub fn to_json(table: &AdviseTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}
