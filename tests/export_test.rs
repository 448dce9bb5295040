//! Advise table export to Arrow, Parquet and JSON

mod common;

use arrow::array::{Array, BooleanArray, Float64Array, StringArray, UInt32Array};
use common::*;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use surrogate_advisor::advise::{AdviseTable, SampleAdvisor};
use surrogate_advisor::config::AdvisorConfig;
use surrogate_advisor::export::{advise_schema, to_json, write_parquet};
use surrogate_advisor::session::{AdvisorySession, BudgetRequest};

fn sellar_session() -> AdvisorySession {
    let mut session = AdvisorySession::new(
        sellar_disciplines(),
        Box::new(sellar_graph()),
        Box::new(sellar_store(5)),
        AdvisorConfig::default(),
    )
    .unwrap();
    session.analyse_run(sellar_timeline("run-1", 2)).unwrap();
    session
}

#[test]
fn test_record_batch_columns() {
    let session = sellar_session();
    let advisor = session.give_advice(BudgetRequest::Time(800.0)).unwrap();
    let table = advisor.advise_table().unwrap();

    let batch = table.to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), table.len());
    assert_eq!(batch.schema(), advise_schema());

    let heuristics = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    let candidates = batch
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    let converged = batch
        .column(2)
        .as_any()
        .downcast_ref::<BooleanArray>()
        .unwrap();
    let coverage = batch
        .column(3)
        .as_any()
        .downcast_ref::<UInt32Array>()
        .unwrap();
    let samples = batch
        .column(4)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();

    for (i, row) in table.rows().iter().enumerate() {
        assert_eq!(heuristics.value(i), row.heuristic.name());
        assert_eq!(candidates.value(i), row.candidate.to_string());
        assert_eq!(converged.value(i), row.candidate.is_converged());
        assert_eq!(coverage.value(i), row.coverage_pct);
        assert!((samples.value(i) - row.samples).abs() < f64::EPSILON);
    }
    assert_eq!(heuristics.value(0), SampleAdvisor::Jia.name());
}

#[test]
fn test_parquet_roundtrip() {
    let session = sellar_session();
    let advisor = session.give_advice(BudgetRequest::Iterations(40)).unwrap();
    let table = advisor.advise_table().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("advise.parquet");
    write_parquet(table, &path).unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(Result::unwrap).collect();
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, table.len());

    let delta_time = batches[0]
        .column_by_name("delta_time")
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((delta_time.value(0) - table.rows()[0].delta_time).abs() < 1e-9);
    assert_eq!(delta_time.null_count(), 0);
}

#[test]
fn test_parquet_into_missing_directory_fails() {
    let session = sellar_session();
    let advisor = session.give_advice(BudgetRequest::Iterations(40)).unwrap();
    let result = write_parquet(advisor.advise_table().unwrap(), "/nonexistent/dir/advise.parquet");
    assert!(matches!(result, Err(surrogate_advisor::Error::StorageError(_))));
}

#[test]
fn test_json_roundtrip() {
    let session = sellar_session();
    let advisor = session.give_advice(BudgetRequest::Time(400.0)).unwrap();
    let table = advisor.advise_table().unwrap();

    let json = to_json(table).unwrap();
    assert!(json.contains("\"converged\": true"));
    let parsed: AdviseTable = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), table.len());
    assert_eq!(parsed.fixed(), table.fixed());
    for (a, b) in parsed.rows().iter().zip(table.rows()) {
        assert_eq!(a.candidate, b.candidate);
        assert_eq!(a.heuristic, b.heuristic);
        assert_eq!(a.coverage_pct, b.coverage_pct);
        assert!((a.delta_objective_calls - b.delta_objective_calls).abs() < 1e-9);
    }
}
