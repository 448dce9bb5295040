//! Shared fixtures: the Sellar problem and a two-discipline DOE workflow

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::collections::BTreeMap;
use surrogate_advisor::analysis::{RunTimeline, TimelineEvent};
use surrogate_advisor::discipline::Discipline;
use surrogate_advisor::process::{ProcessHierarchy, StaticDesignGraph};
use surrogate_advisor::samples::MemorySampleStore;

pub fn at(seconds: f64) -> DateTime<Utc> {
    #[allow(clippy::cast_possible_truncation)]
    let ms = (seconds * 1000.0).round() as i64;
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::milliseconds(ms)
}

pub fn sellar_disciplines() -> Vec<Discipline> {
    vec![
        Discipline::builder("D1", "urn:sellar:D1")
            .inputs(["x", "z1", "z2", "y2"])
            .outputs(["y1"])
            .build(),
        Discipline::builder("D2", "urn:sellar:D2")
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

pub fn sellar_hierarchy() -> ProcessHierarchy {
    ProcessHierarchy::from_nested_default(&json!([
        "Coordinator",
        ["Optimizer", ["Converger", "D1", "D2"], "F1", "G1", "G2"]
    ]))
    .unwrap()
}

pub fn sellar_graph() -> StaticDesignGraph {
    StaticDesignGraph::builder(sellar_hierarchy())
        .disciplines(&sellar_disciplines())
        .external_source("x", "Optimizer")
        .external_source("z1", "Coordinator")
        .external_source("z2", "Coordinator")
        .external_source("y2", "Converger")
        .external_target("y1", "Converger")
        .external_target("f", "Optimizer")
        .external_target("g1", "Optimizer")
        .external_target("g2", "Optimizer")
        .build()
        .unwrap()
}

/// `samples` recorded evaluations per discipline, `x` varying, `z` fixed.
pub fn sellar_store(samples: usize) -> MemorySampleStore {
    let mut store = MemorySampleStore::new();
    for discipline in sellar_disciplines() {
        store.register(
            discipline.id(),
            discipline.input_variables().iter().cloned(),
            discipline.output_variables().iter().cloned(),
        );
    }
    for i in 0..samples {
        #[allow(clippy::cast_precision_loss)]
        let v = i as f64;
        for discipline in sellar_disciplines() {
            let inputs: BTreeMap<String, f64> = discipline
                .input_variables()
                .iter()
                .map(|name| {
                    let value = if name.starts_with('z') { 1.0 } else { v };
                    (name.clone(), value)
                })
                .collect();
            let outputs: BTreeMap<String, f64> = discipline
                .output_variables()
                .iter()
                .map(|name| (name.clone(), 2.0 * v))
                .collect();
            store
                .add_sample(discipline.id(), "profiling", inputs, outputs)
                .unwrap();
        }
    }
    store
}

/// Each optimizer point: three converger iterations of D1 (1.0 s) and
/// D2 (1.5 s), then F1 (0.2 s), G1 and G2 (0.1 s each), then 0.1 s of
/// driver overhead. One point spans exactly 8 s.
pub fn sellar_timeline(run_id: &str, points: usize) -> RunTimeline {
    let mut events = Vec::new();
    let mut t = 0.0;
    for _ in 0..points {
        for _ in 0..3 {
            events.push(TimelineEvent::call("D1", at(t), 1.0));
            t += 1.0;
            events.push(TimelineEvent::call("D2", at(t), 1.5));
            t += 1.5;
            events.push(TimelineEvent::driver("Converger", at(t)));
        }
        events.push(TimelineEvent::call("F1", at(t), 0.2));
        t += 0.2;
        events.push(TimelineEvent::call("G1", at(t), 0.1));
        t += 0.1;
        events.push(TimelineEvent::call("G2", at(t), 0.1));
        t += 0.2;
        events.push(TimelineEvent::driver("Optimizer", at(t)));
    }
    RunTimeline::new(run_id, events)
}

pub fn two_discipline_disciplines() -> Vec<Discipline> {
    vec![
        Discipline::builder("D1", "D1").inputs(["x"]).outputs(["y1"]).build(),
        Discipline::builder("D2", "D2").inputs(["y1"]).outputs(["y2"]).build(),
    ]
}

/// D1 (2 s) and D2 (3 s) once per point; one DOE point over 6 s.
pub fn two_discipline_timeline(run_id: &str) -> RunTimeline {
    RunTimeline::new(
        run_id,
        vec![
            TimelineEvent::call("D1", at(0.0), 2.0),
            TimelineEvent::call("D2", at(2.0), 3.0),
            TimelineEvent::driver("DOE", at(6.0)),
        ],
    )
}

pub fn two_discipline_graph() -> StaticDesignGraph {
    let hierarchy =
        ProcessHierarchy::from_nested_default(&json!(["Coordinator", ["DOE", "D1", "D2"]]))
            .unwrap();
    StaticDesignGraph::builder(hierarchy)
        .disciplines(&two_discipline_disciplines())
        .external_source("x", "DOE")
        .external_target("y2", "DOE")
        .build()
        .unwrap()
}

pub fn two_discipline_store() -> MemorySampleStore {
    let mut store = MemorySampleStore::new();
    store.register("D1", ["x"], ["y1"]);
    store.register("D2", ["y1"], ["y2"]);
    store
}
