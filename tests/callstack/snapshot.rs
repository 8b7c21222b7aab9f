//! Snapshot contents.

use interpose_callstack::{CallStackProcessor, DEPTH_PLACEHOLDER, TRUNCATION_KEY};
use interpose_core::{Caller, DataBag, Dispatcher, Invocation, ManagedProcessor, Result, Value};
use parking_lot::Mutex;
use std::sync::Arc;

fn nested(levels: usize) -> DataBag {
    let mut bag = DataBag::new().with("leaf", true);
    for level in (0..levels).rev() {
        bag = DataBag::new().with(format!("level{level}"), bag);
    }
    bag
}

#[test]
fn frames_hold_bounded_inputs() {
    let dispatcher = Dispatcher::new();
    let callstack = Arc::new(CallStackProcessor::builder().max_depth(2).max_length(10).build());
    callstack.start(&dispatcher);

    let mut wide = DataBag::new();
    for i in 0..50 {
        wide.insert(format!("k{i}"), i);
    }
    wide.insert("deep", nested(4));

    let seen = Arc::new(Mutex::new(None));
    let (p, s) = (Arc::clone(&callstack), Arc::clone(&seen));
    let exec = move |_: &mut Invocation| -> Result<()> {
        *s.lock() = Some(p.snapshot());
        Ok(())
    };
    dispatcher
        .dispatch(&exec, &mut Invocation::new("bulk.Import", wide))
        .unwrap();

    let snapshot = seen.lock().take().unwrap();
    let input = &snapshot.threads[0].frames[0].input;
    assert_eq!(input.len(), 11);
    assert!(input.contains_key(TRUNCATION_KEY));
    assert!(!input.contains_key("deep"));

    let mut shallow = DataBag::new();
    shallow.insert("deep", nested(4));
    let limited = interpose_callstack::bounded_clone(&shallow, callstack.registry().limits());
    let level0 = limited.get("deep").and_then(Value::as_bag).unwrap();
    assert_eq!(
        level0.get("level0").and_then(Value::as_text),
        Some(DEPTH_PLACEHOLDER)
    );
}

#[test]
fn snapshot_reports_caller_and_serializes() {
    let dispatcher = Dispatcher::new();
    let callstack = Arc::new(CallStackProcessor::builder().build());
    callstack.start(&dispatcher);

    let seen = Arc::new(Mutex::new(None));
    let (p, s) = (Arc::clone(&callstack), Arc::clone(&seen));
    let exec = move |_: &mut Invocation| -> Result<()> {
        *s.lock() = Some(serde_json::to_value(p.snapshot()).unwrap());
        Ok(())
    };
    let mut inv = Invocation::new("reports.Build", DataBag::new().with("year", 2024))
        .with_caller(Caller::user("alice"));
    dispatcher.dispatch(&exec, &mut inv).unwrap();

    let json = seen.lock().take().unwrap();
    assert_eq!(json["invocationsStarted"], 1);
    let frame = &json["threads"][0]["frames"][0];
    assert_eq!(frame["service"], "reports.Build");
    assert_eq!(frame["caller"]["user"], "alice");
    assert_eq!(frame["input"]["year"], 2024);
    assert!(frame["elapsedMs"].as_f64().unwrap() >= 0.0);
}

#[test]
fn stop_clears_stacks_but_keeps_totals() {
    let dispatcher = Dispatcher::new();
    let callstack = Arc::new(CallStackProcessor::builder().build());
    callstack.start(&dispatcher);

    let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
    dispatcher
        .dispatch(&ok, &mut Invocation::new("svc", DataBag::new()))
        .unwrap();
    callstack.stop(&dispatcher);

    dispatcher
        .dispatch(&ok, &mut Invocation::new("svc", DataBag::new()))
        .unwrap();
    assert_eq!(callstack.registry().invocations_started(), 1);
    assert!(callstack.snapshot().threads.is_empty());
}
