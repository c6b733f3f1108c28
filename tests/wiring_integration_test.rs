//! End-to-end wiring behavior through the executor: automatic last-match
//! resolution, explicit references, cancellation, and pushed inputs.

mod common;

use common::{image_input, image_output, toks, EventLog, RecorderStage};
use pretty_assertions::assert_eq;
use stagepipe::pipeline::{Pipeline, PipelineOptions, WiringReport};
use stagepipe::registry::FactoryRegistry;
use stagepipe::value::Value;

/// Registry of three image-flavored recorder stages: `a` and `b` produce an
/// `Image`, `c` consumes one.
fn image_registry(log: &EventLog) -> FactoryRegistry {
    let (a, b, c) = (log.clone(), log.clone(), log.clone());
    FactoryRegistry::new()
        .with("a", move || {
            Box::new(
                RecorderStage::new("a", a.clone())
                    .with_output(image_output())
                    .producing("Image", Value::from("from-a")),
            )
        })
        .with("b", move || {
            Box::new(
                RecorderStage::new("b", b.clone())
                    .with_output(image_output())
                    .producing("Image", Value::from("from-b")),
            )
        })
        .with("c", move || {
            Box::new(RecorderStage::new("c", c.clone()).with_input(image_input()))
        })
}

fn source_of(plan: &WiringReport, stage: &str, member: &str) -> Option<String> {
    plan.stages
        .iter()
        .find(|s| s.name == stage)
        .and_then(|s| s.inputs.iter().find(|i| i.member_name == member))
        .and_then(|i| i.source.clone())
}

#[test]
fn test_auto_wire_resolves_to_most_recent_producer() {
    let log = EventLog::new();
    let registry = image_registry(&log);
    let outcome = Pipeline::new(&registry, PipelineOptions::default())
        .execute(&toks(&["a", "--pipe", "b", "--pipe", "c"]))
        .unwrap();
    // Both a and b expose Image:image; the later producer wins.
    assert_eq!(
        source_of(&outcome.plan, "c", "Image").as_deref(),
        Some("b-0.Image")
    );
}

#[test]
fn test_explicit_name_id_always_pins_first_instance() {
    let log = EventLog::new();
    let (r, c) = (log.clone(), log.clone());
    let registry = FactoryRegistry::new()
        .with("r", move || {
            Box::new(
                RecorderStage::new("r", r.clone())
                    .with_output(image_output())
                    .producing("Image", Value::from("r")),
            )
        })
        .with("c", move || {
            Box::new(RecorderStage::new("c", c.clone()).with_input(image_input()))
        });

    let outcome = Pipeline::new(&registry, PipelineOptions::default())
        .execute(&toks(&[
            "r", "--pipe", "r", "--pipe", "c", "-image", "@r-0.oimage",
        ]))
        .unwrap();
    assert_eq!(
        source_of(&outcome.plan, "c", "Image").as_deref(),
        Some("r-0.Image")
    );
}

#[test]
fn test_explicit_bare_reference_targets_previous_stage() {
    let log = EventLog::new();
    let registry = image_registry(&log);
    // `.oimage` must resolve to `a`, the stage instantiated immediately
    // before `c`, regardless of what other stages are named. Auto-wiring is
    // off so the explicit reference is the only wiring mechanism in play.
    let options = PipelineOptions {
        auto_pipe: false,
        ..Default::default()
    };
    let outcome = Pipeline::new(&registry, options)
        .execute(&toks(&[
            "b", "--pipe", "a", "--pipe", "c", "-image", "@.oimage",
        ]))
        .unwrap();
    assert_eq!(
        source_of(&outcome.plan, "c", "Image").as_deref(),
        Some("a-0.Image")
    );
}

#[test]
fn test_cancellation_literal_unwires_auto_result() {
    let log = EventLog::new();
    let registry = image_registry(&log);
    let outcome = Pipeline::new(&registry, PipelineOptions::default())
        .execute(&toks(&["a", "--pipe", "c", "-image", "None"]))
        .unwrap();
    assert_eq!(source_of(&outcome.plan, "c", "Image"), None);
    let c_report = outcome.plan.stages.iter().find(|s| s.name == "c").unwrap();
    assert!(!c_report.inputs[0].literal);
}

#[test]
fn test_pushed_input_feeds_downstream_auto_wiring() {
    let log = EventLog::new();
    let (p, c) = (log.clone(), log.clone());
    let registry = FactoryRegistry::new()
        .with("holder", move || {
            Box::new(RecorderStage::new("holder", p.clone()).with_input(image_input()))
        })
        .with("c", move || {
            Box::new(RecorderStage::new("c", c.clone()).with_input(image_input()))
        });

    // `holder` never runs a producer step; its Image is a caller-pushed
    // literal, which still counts as a source for `c`.
    let outcome = Pipeline::new(&registry, PipelineOptions::default())
        .execute(&toks(&["holder", "-image", "pushed-value", "--pipe", "c"]))
        .unwrap();
    assert_eq!(
        source_of(&outcome.plan, "c", "Image").as_deref(),
        Some("holder-0.Image")
    );
}

#[test]
fn test_disabled_producer_stays_addressable_but_valueless() {
    let log = EventLog::new();
    let registry = image_registry(&log);
    let outcome = Pipeline::new(&registry, PipelineOptions::default())
        .execute(&toks(&["a", "--pipe", "b", "-off", "--pipe", "c"]))
        .unwrap();
    // Wiring still picks b (last compatible), but b never ran, so the
    // transfer finds no value and c's field stays unset.
    assert_eq!(
        source_of(&outcome.plan, "c", "Image").as_deref(),
        Some("b-0.Image")
    );
    assert_eq!(log.count_of("b:run"), 0);
    assert_eq!(outcome.stages_run, 2);
}

#[test]
fn test_literal_input_suppresses_auto_wiring() {
    let log = EventLog::new();
    let registry = image_registry(&log);
    let outcome = Pipeline::new(&registry, PipelineOptions::default())
        .execute(&toks(&["a", "--pipe", "c", "-image", "literal-img"]))
        .unwrap();
    let c_report = outcome.plan.stages.iter().find(|s| s.name == "c").unwrap();
    assert!(c_report.inputs[0].literal);
    assert_eq!(c_report.inputs[0].source, None);
}

#[test]
fn test_transferred_value_reaches_consumer_field() {
    let log = EventLog::new();
    let registry = image_registry(&log);
    let outcome = Pipeline::new(&registry, PipelineOptions::default())
        .execute(&toks(&["a", "--pipe", "b", "--pipe", "c"]))
        .unwrap();
    assert_eq!(outcome.stages_run, 3);
    // The transfer engine assigned b's product, not a's, onto c.
    assert!(log
        .snapshot()
        .contains(&"c:set:Image=from-b".to_string()));
}
