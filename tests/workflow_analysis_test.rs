//! Workflow analysis over realistic run timelines

mod common;

use common::*;
use surrogate_advisor::analysis::{DisciplineMetric, WorkflowAnalysis, WorkflowMetric};
use surrogate_advisor::Error;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn sellar_workflow(points: usize) -> WorkflowAnalysis {
    let store = sellar_store(5);
    let mut workflow = WorkflowAnalysis::new(sellar_disciplines()).unwrap();
    workflow
        .add_timeline(sellar_timeline("run-1", points), &store)
        .unwrap();
    workflow
}

#[test]
fn test_sellar_workflow_totals() {
    let workflow = sellar_workflow(2);

    assert!(approx(workflow.get_metric(WorkflowMetric::TotalRuntime).unwrap(), 16.0));
    assert!(approx(workflow.get_metric(WorkflowMetric::TotalPoints).unwrap(), 2.0));
    assert!(approx(workflow.get_metric(WorkflowMetric::RuntimePerPoint).unwrap(), 8.0));
    // (3 + 3 + 1 + 1 + 1) calls per point
    assert!(approx(
        workflow
            .get_metric(WorkflowMetric::TotalCombinedDisciplineCalls)
            .unwrap(),
        18.0
    ));
}

#[test]
fn test_sellar_discipline_scores() {
    let workflow = sellar_workflow(2);

    let d1 = workflow.get_discipline_score("D1").unwrap();
    assert!(approx(d1.normalized_runtime, 0.375));
    assert!(approx(d1.mean_iterations, 3.0));
    assert!(approx(d1.normalized_calls, 6.0 / 18.0));
    // x and y2 vary, z1 and z2 are fixed
    assert_eq!(d1.significant_variables, 2);

    let f1 = workflow.get_discipline_score("urn:sellar:F1").unwrap();
    assert!(approx(f1.mean_iterations, 1.0));
    assert!(approx(f1.normalized_runtime, 0.4 / 16.0));
}

#[test]
fn test_normalized_runtime_sums_below_one() {
    let workflow = sellar_workflow(3);
    let total: f64 = workflow
        .scores()
        .unwrap()
        .iter()
        .map(|s| s.normalized_runtime)
        .sum();
    assert!(total <= 1.0);
    assert!(approx(total, 7.9 / 8.0));
}

#[test]
fn test_discipline_metrics() {
    let workflow = sellar_workflow(2);
    assert_eq!(
        workflow
            .get_discipline_metric("D2", DisciplineMetric::Calls)
            .unwrap(),
        Some(6.0)
    );
    assert!(approx(
        workflow
            .get_discipline_metric("D2", DisciplineMetric::TotalRuntime)
            .unwrap()
            .unwrap(),
        9.0
    ));
    assert_eq!(
        workflow
            .get_discipline_metric("D2", DisciplineMetric::RuntimeSpread)
            .unwrap(),
        Some(0.0)
    );
}

#[test]
fn test_multiple_runs_accumulate_and_remove_restores() {
    let store = sellar_store(5);
    let mut workflow = WorkflowAnalysis::new(sellar_disciplines()).unwrap();
    workflow
        .add_timeline(sellar_timeline("run-1", 2), &store)
        .unwrap();
    let single = workflow.scores().unwrap().to_vec();

    workflow
        .add_timeline(sellar_timeline("run-2", 1), &store)
        .unwrap();
    assert_eq!(workflow.run_ids(), ["run-1", "run-2"]);
    assert!(approx(workflow.total_runtime().unwrap(), 24.0));
    assert_eq!(workflow.total_points().unwrap(), 3);
    assert_eq!(
        workflow.get_discipline_analysis("D1").unwrap().n_calls(),
        9
    );

    workflow.remove_timeline("run-2", &store).unwrap();
    assert_eq!(workflow.scores().unwrap(), single.as_slice());
}

#[test]
fn test_rescoring_twice_is_identical() {
    let store = sellar_store(5);
    let mut workflow = WorkflowAnalysis::new(sellar_disciplines()).unwrap();
    workflow
        .add_timeline(sellar_timeline("run-1", 2), &store)
        .unwrap();
    workflow.score(&store).unwrap();
    let first = serde_json::to_string(workflow.scores().unwrap()).unwrap();
    workflow.score(&store).unwrap();
    let second = serde_json::to_string(workflow.scores().unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_uncalled_discipline_scores_zero() {
    let store = sellar_store(0);
    let mut workflow = WorkflowAnalysis::new(sellar_disciplines()).unwrap();
    let mut timeline = sellar_timeline("run-1", 1);
    let events: Vec<_> = timeline
        .events()
        .iter()
        .filter(|e| e.component != "G2")
        .cloned()
        .collect();
    timeline = surrogate_advisor::analysis::RunTimeline::new("run-1", events);
    workflow.add_timeline(timeline, &store).unwrap();

    let g2 = workflow.get_discipline_score("G2").unwrap();
    assert!(approx(g2.mean_iterations, 0.0));
    assert!(approx(g2.normalized_runtime, 0.0));
    assert_eq!(
        workflow
            .get_discipline_metric("G2", DisciplineMetric::MeanRuntime)
            .unwrap(),
        None
    );
}

#[test]
fn test_run_without_points_is_rejected() {
    let store = sellar_store(0);
    let mut workflow = WorkflowAnalysis::new(sellar_disciplines()).unwrap();
    let events: Vec<_> = sellar_timeline("run-1", 1)
        .events()
        .iter()
        .filter(|e| e.component != "Optimizer")
        .cloned()
        .collect();
    let result = workflow.add_timeline(
        surrogate_advisor::analysis::RunTimeline::new("run-1", events),
        &store,
    );
    assert!(matches!(result, Err(Error::Degenerate(_))));
    assert!(!workflow.is_scored());
}

#[test]
fn test_affordable_runs() {
    let workflow = sellar_workflow(2);
    assert_eq!(workflow.estimate_affordable_runs(100.0).unwrap(), 6);
}
