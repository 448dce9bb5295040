//! End-to-end advisory sessions

mod common;

use common::*;
use surrogate_advisor::advise::{BudgetAxis, SampleAdvisor};
use surrogate_advisor::analysis::RunTimeline;
use surrogate_advisor::config::AdvisorConfig;
use surrogate_advisor::process::CandidateGroup;
use surrogate_advisor::session::{AdvisorySession, BudgetRequest};
use surrogate_advisor::Error;

fn session() -> AdvisorySession {
    AdvisorySession::new(
        sellar_disciplines(),
        Box::new(sellar_graph()),
        Box::new(sellar_store(5)),
        AdvisorConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_advice_requires_a_run() {
    let session = session();
    assert!(matches!(
        session.give_advice(BudgetRequest::Time(100.0)),
        Err(Error::NotScored)
    ));
}

#[test]
fn test_time_budget_advice() {
    let mut session = session();
    session.analyse_run(sellar_timeline("run-1", 2)).unwrap();

    let advisor = session.give_advice(BudgetRequest::Time(800.0)).unwrap();
    assert_eq!(advisor.fixed_axis(), Some(BudgetAxis::Time));
    assert_eq!(advisor.strategies().len(), session.candidates().unwrap().len());

    let best = advisor.recommend(SampleAdvisor::Jones, 1).unwrap();
    for recommendation in &best {
        assert_eq!(
            recommendation.strategies[0].candidate,
            CandidateGroup::converged(["D1", "D2"])
        );
    }
}

#[test]
fn test_iteration_budget_advice() {
    let mut session = session();
    session.analyse_run(sellar_timeline("run-1", 2)).unwrap();

    let advisor = session.give_advice(BudgetRequest::Iterations(100)).unwrap();
    assert_eq!(advisor.optimization_time_budget(), Some(800.0));
    let ranked = advisor.ranked_strategies().unwrap();
    assert!(ranked[0].delta_time <= ranked[ranked.len() - 1].delta_time);
}

#[test]
fn test_forget_run() {
    let mut session = session();
    session.analyse_run(sellar_timeline("run-1", 2)).unwrap();
    session.analyse_run(sellar_timeline("run-2", 1)).unwrap();
    assert_eq!(session.workflow().runs().len(), 2);

    let removed = session.forget_run("run-2").unwrap();
    assert_eq!(removed.points(), 1);
    assert!(matches!(session.forget_run("run-2"), Err(Error::UnknownRun(_))));

    session.forget_run("run-1").unwrap();
    assert!(!session.workflow().is_scored());
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = AdvisorConfig::default();
    config.coverage_percentages.clear();
    let result = AdvisorySession::new(
        sellar_disciplines(),
        Box::new(sellar_graph()),
        Box::new(sellar_store(0)),
        config,
    );
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_advice_survives_uncalled_discipline() {
    let mut session = session();
    let profiled = sellar_timeline("run-1", 2);
    let without_g2 = profiled
        .events()
        .iter()
        .filter(|e| e.component != "G2")
        .cloned()
        .collect();
    session
        .analyse_run(RunTimeline::new("run-1", without_g2))
        .unwrap();

    let advisor = session.give_advice(BudgetRequest::Time(800.0)).unwrap();
    let excluded: Vec<String> = advisor
        .excluded_candidates()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(excluded, ["F1+G1+G2", "G1+G2", "G2"]);
    assert_eq!(advisor.strategies().len(), 7);
    assert_eq!(advisor.advise_table().unwrap().len(), 7 * 3 * 6);

    let best = advisor.recommend(SampleAdvisor::Jones, 1).unwrap();
    assert!(best.iter().all(|r| r.strategies.len() == 1));
    assert!(best
        .iter()
        .all(|r| !r.strategies[0].candidate.members().contains(&"G2".to_string())));
}
