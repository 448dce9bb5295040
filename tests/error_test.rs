//! Tests for error types

use surrogate_advisor::Error;

#[test]
fn test_unknown_discipline_error() {
    let error = Error::UnknownDiscipline("D7".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Unknown discipline: D7"));
    assert!(error_str.contains("workflow definition"));
}

#[test]
fn test_duplicate_discipline_error() {
    let error = Error::DuplicateDiscipline("D1".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Duplicate discipline identifier: D1"));
    assert!(error_str.contains("must be unique"));
}

#[test]
fn test_discipline_mismatch_error() {
    let error = Error::DisciplineMismatch {
        expected: "D1".to_string(),
        found: "D2".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("expected D1, found D2"));
}

#[test]
fn test_unknown_heuristic_lists_choices() {
    let error = Error::UnknownHeuristic("kriging".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("kriging"));
    assert!(error_str.contains("jia, kaufman, jones"));
}

#[test]
fn test_unknown_profile_lists_choices() {
    let error = Error::UnknownProfile("greedy".to_string());
    assert!(format!("{error}").contains("efficient, advised, conservative"));
}

#[test]
fn test_budget_not_fixed_error() {
    let error_str = format!("{}", Error::BudgetNotFixed);
    assert!(error_str.contains("No optimization budget fixed"));
    assert!(error_str.contains("set_optimization_time_budget"));
}

#[test]
fn test_not_analyzed_error() {
    let error_str = format!("{}", Error::NotAnalyzed);
    assert!(error_str.contains("No strategies analyzed"));
    assert!(error_str.contains("build_advise"));
}

#[test]
fn test_not_scored_error() {
    let error_str = format!("{}", Error::NotScored);
    assert!(error_str.contains("Workflow not scored"));
}

#[test]
fn test_degenerate_error() {
    let error = Error::Degenerate("runtime per point: division by zero".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Degenerate computation"));
    assert!(error_str.contains("division by zero"));
}

#[test]
fn test_unknown_run_error() {
    let error = Error::UnknownRun("run-9".to_string());
    assert_eq!(format!("{error}"), "Unknown run: run-9");
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("disk full".to_string());
    assert_eq!(format!("{error}"), "Storage error: disk full");
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    assert!(format!("{error}").contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_error_debug() {
    let error = Error::InvalidInput("bad".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("InvalidInput"));
}
