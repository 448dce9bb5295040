//! Sellar Advice: which disciplines should become surrogates?
//!
//! Profiles two points of the Sellar MDO problem (coupled D1/D2 inside a
//! converger, objective F1, constraints G1/G2), then asks the advisor for
//! the best replacement under a fixed time budget and a fixed iteration
//! budget.
//!
//! Run with: cargo run --example sellar_advice
//! Verbose:  RUST_LOG=surrogate_advisor=debug cargo run --example sellar_advice

use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::collections::BTreeMap;
use surrogate_advisor::advise::{Profile, SampleAdvisor};
use surrogate_advisor::analysis::{RunTimeline, TimelineEvent};
use surrogate_advisor::config::AdvisorConfig;
use surrogate_advisor::discipline::Discipline;
use surrogate_advisor::process::{ProcessHierarchy, StaticDesignGraph};
use surrogate_advisor::samples::MemorySampleStore;
use surrogate_advisor::session::{AdvisorySession, BudgetRequest};
use surrogate_advisor::telemetry::init_tracing;

fn disciplines() -> Vec<Discipline> {
    vec![
        Discipline::builder("D1", "urn:sellar:D1")
            .description("First coupled discipline")
            .inputs(["x", "z1", "z2", "y2"])
            .outputs(["y1"])
            .build(),
        Discipline::builder("D2", "urn:sellar:D2")
            .description("Second coupled discipline")
            .inputs(["z1", "z2", "y1"])
            .outputs(["y2"])
            .build(),
        Discipline::builder("F1", "urn:sellar:F1")
            .inputs(["x", "z2", "y1", "y2"])
            .outputs(["f"])
            .build(),
        Discipline::builder("G1", "urn:sellar:G1")
            .inputs(["y1"])
            .outputs(["g1"])
            .build(),
        Discipline::builder("G2", "urn:sellar:G2")
            .inputs(["y2"])
            .outputs(["g2"])
            .build(),
    ]
}

fn graph(disciplines: &[Discipline]) -> anyhow::Result<StaticDesignGraph> {
    let hierarchy = ProcessHierarchy::from_nested_default(&json!([
        "Coordinator",
        ["Optimizer", ["Converger", "D1", "D2"], "F1", "G1", "G2"]
    ]))?;
    Ok(StaticDesignGraph::builder(hierarchy)
        .disciplines(disciplines)
        .external_source("x", "Optimizer")
        .external_source("z1", "Coordinator")
        .external_source("z2", "Coordinator")
        .external_source("y2", "Converger")
        .external_target("y1", "Converger")
        .external_target("f", "Optimizer")
        .external_target("g1", "Optimizer")
        .external_target("g2", "Optimizer")
        .build()?)
}

#[allow(clippy::cast_precision_loss)]
fn store(disciplines: &[Discipline], samples: usize) -> anyhow::Result<MemorySampleStore> {
    let mut store = MemorySampleStore::new();
    for d in disciplines {
        store.register(
            d.id(),
            d.input_variables().iter().cloned(),
            d.output_variables().iter().cloned(),
        );
    }
    for i in 0..samples {
        let x = i as f64;
        for d in disciplines {
            let inputs: BTreeMap<String, f64> = d
                .input_variables()
                .iter()
                .map(|name| (name.clone(), if name.starts_with('z') { 1.0 } else { x }))
                .collect();
            let outputs: BTreeMap<String, f64> = d
                .output_variables()
                .iter()
                .map(|name| (name.clone(), x * x))
                .collect();
            store.add_sample(d.id(), "run-1", inputs, outputs)?;
        }
    }
    Ok(store)
}

fn at(t0: DateTime<Utc>, ms: i64) -> DateTime<Utc> {
    t0 + Duration::milliseconds(ms)
}

/// Two optimizer points, three converger iterations each.
fn timeline() -> anyhow::Result<RunTimeline> {
    let t0 = Utc
        .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .context("invalid start time")?;
    let mut events = Vec::new();
    let mut t = 0i64;
    for _ in 0..2 {
        for _ in 0..3 {
            events.push(TimelineEvent::call("D1", at(t0, t), 1.0));
            t += 1000;
            events.push(TimelineEvent::call("D2", at(t0, t), 1.5));
            t += 1500;
            events.push(TimelineEvent::driver("Converger", at(t0, t)));
        }
        events.push(TimelineEvent::call("F1", at(t0, t), 0.2));
        t += 200;
        events.push(TimelineEvent::call("G1", at(t0, t), 0.1));
        t += 100;
        events.push(TimelineEvent::call("G2", at(t0, t), 0.1));
        t += 200;
        events.push(TimelineEvent::driver("Optimizer", at(t0, t)));
    }
    Ok(RunTimeline::new("run-1", events))
}

fn main() -> anyhow::Result<()> {
    init_tracing(None);

    println!("=== Sellar Surrogate Advice ===\n");

    let disciplines = disciplines();
    let graph = graph(&disciplines)?;
    let store = store(&disciplines, 5)?;
    let mut session = AdvisorySession::new(
        disciplines,
        Box::new(graph),
        Box::new(store),
        AdvisorConfig::default(),
    )?;
    session.analyse_run(timeline()?)?;

    let workflow = session.workflow();
    println!("Profiling run:");
    println!("  Runtime per point: {:.2} s", workflow.runtime_per_point()?);
    println!("  Points evaluated:  {}", workflow.total_points()?);
    for score in workflow.scores()? {
        println!(
            "  {:<3} runtime {:>5.1} %  calls {:>5.1} %  significant inputs {}",
            score.discipline_id,
            score.normalized_runtime * 100.0,
            score.normalized_calls * 100.0,
            score.significant_variables
        );
    }

    println!("\nCandidates:");
    for candidate in session.candidates()? {
        println!("  {candidate}");
    }

    println!("\n=== Fixed time budget: 800 s ===");
    let advisor = session.give_advice(BudgetRequest::Time(800.0))?;
    println!(
        "  Baseline iterations: {}",
        advisor.optimization_iteration_budget().unwrap_or_default()
    );
    for recommendation in advisor.recommend(SampleAdvisor::Jones, 3)? {
        println!("  {} profile:", recommendation.profile);
        for row in &recommendation.strategies {
            println!(
                "    {:<20} samples {:>6.1}  extra objective calls {:>8.1}",
                row.candidate.to_string(),
                row.samples,
                row.delta_objective_calls
            );
        }
    }

    println!("\n=== Fixed iteration budget: 100 ===");
    let mut advisor = session.give_advice(BudgetRequest::Iterations(100))?;
    advisor.set_profile(Profile::Advised.name())?;
    println!(
        "  Baseline time: {:.0} s",
        advisor.optimization_time_budget().unwrap_or_default()
    );
    for row in advisor.ranked_strategies()?.iter().take(3) {
        println!(
            "    {:<20} combined {:>8.1} s  saved {:>8.1} s",
            row.candidate.to_string(),
            row.combined_time,
            -row.delta_time
        );
    }

    Ok(())
}
