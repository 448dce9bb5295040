//! Configuration loading and its effect on advice

mod common;

use common::*;
use std::io::Write;
use surrogate_advisor::advise::{Profile, SampleAdvisor};
use surrogate_advisor::config::{AdvisorConfig, ComponentRoles};
use surrogate_advisor::session::{AdvisorySession, BudgetRequest};

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "surrogate_prediction_cost": 0.5,
            "coverage_percentages": [50, 100],
            "sample_advisors": ["jones", "jia"],
            "default_profile": "efficient"
        }}"#
    )
    .unwrap();

    let config = AdvisorConfig::from_path(file.path()).unwrap();
    assert!((config.surrogate_prediction_cost - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.coverage_percentages, [50, 100]);
    assert_eq!(config.sample_advisors, [SampleAdvisor::Jones, SampleAdvisor::Jia]);
    assert_eq!(config.default_profile, Profile::Efficient);
    assert!(!config.account_for_profiling);
}

#[test]
fn test_missing_file() {
    let result = AdvisorConfig::from_path("/nonexistent/advisor.json");
    assert!(matches!(result, Err(surrogate_advisor::Error::Io(_))));
}

#[test]
fn test_sweep_shapes_advise_table() {
    let config = AdvisorConfig::builder()
        .coverage_percentages([100, 200])
        .sample_advisors([SampleAdvisor::Jones])
        .build()
        .unwrap();

    let mut session = AdvisorySession::new(
        sellar_disciplines(),
        Box::new(sellar_graph()),
        Box::new(sellar_store(3)),
        config,
    )
    .unwrap();
    session.analyse_run(sellar_timeline("run-1", 2)).unwrap();

    let advisor = session.give_advice(BudgetRequest::Time(800.0)).unwrap();
    let table = advisor.advise_table().unwrap();
    assert_eq!(table.coverage_percentages(), [100, 200]);
    assert_eq!(table.len(), session.candidates().unwrap().len() * 2);
    assert!(table.rows().iter().all(|r| r.heuristic == SampleAdvisor::Jones));
}

#[test]
fn test_allow_complete_loops_flows_into_session() {
    let hierarchy = surrogate_advisor::process::ProcessHierarchy::from_nested_default(
        &serde_json::json!(["Coordinator", ["DOE", "A", ["Converger", "B", "C"]]]),
    )
    .unwrap();
    let graph = surrogate_advisor::process::StaticDesignGraph::builder(hierarchy)
        .discipline("A", ["x"], ["a"])
        .discipline("B", ["a", "c"], ["b"])
        .discipline("C", ["b"], ["c"])
        .build()
        .unwrap();
    let disciplines = vec![
        surrogate_advisor::discipline::Discipline::new("A", "A"),
        surrogate_advisor::discipline::Discipline::new("B", "B"),
        surrogate_advisor::discipline::Discipline::new("C", "C"),
    ];

    let config = AdvisorConfig::builder()
        .allow_complete_loops(true)
        .build()
        .unwrap();
    let session = AdvisorySession::new(
        disciplines,
        Box::new(graph),
        Box::new(surrogate_advisor::samples::MemorySampleStore::new()),
        config,
    )
    .unwrap();
    let labels: Vec<String> = session
        .candidates()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(labels.contains(&"Converger(A+B+C)".to_string()));
}

#[test]
fn test_custom_driver_names() {
    let roles = ComponentRoles {
        top_level_drivers: vec!["Sampler".to_string()],
        nested_drivers: vec!["Loop".to_string()],
        coordinators: vec!["Root".to_string()],
    };
    let hierarchy = roles
        .parse_hierarchy(&serde_json::json!(["Root", ["Sampler", ["Loop", "D1", "D2"]]]))
        .unwrap();
    let graph = surrogate_advisor::process::StaticDesignGraph::builder(hierarchy)
        .disciplines(&two_discipline_disciplines())
        .external_source("x", "Sampler")
        .external_target("y2", "Sampler")
        .build()
        .unwrap();
    let config = AdvisorConfig::builder().roles(roles).build().unwrap();
    let mut session = AdvisorySession::new(
        two_discipline_disciplines(),
        Box::new(graph),
        Box::new(two_discipline_store()),
        config,
    )
    .unwrap();

    let timeline = surrogate_advisor::analysis::RunTimeline::new(
        "run-1",
        vec![
            surrogate_advisor::analysis::TimelineEvent::call("D1", at(0.0), 2.0),
            surrogate_advisor::analysis::TimelineEvent::driver("Loop", at(2.0)),
            surrogate_advisor::analysis::TimelineEvent::call("D2", at(2.0), 3.0),
            surrogate_advisor::analysis::TimelineEvent::driver("Sampler", at(6.0)),
        ],
    );
    session.analyse_run(timeline).unwrap();
    assert_eq!(session.workflow().total_points().unwrap(), 1);
}

#[test]
fn test_hierarchy_must_match_roles() {
    let roles = ComponentRoles {
        top_level_drivers: vec!["Sampler".to_string()],
        ..ComponentRoles::default()
    };
    let config = AdvisorConfig::builder().roles(roles).build().unwrap();
    // The graph still names its driver "DOE", which the roles no longer list.
    let result = AdvisorySession::new(
        two_discipline_disciplines(),
        Box::new(two_discipline_graph()),
        Box::new(two_discipline_store()),
        config,
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("DOE"));
}
