//! Every processor on one invocation.

use super::assemble;
use crate::common::{MockExchange, files, scratch_dir};
use interpose_core::{DataBag, Fault, Invocation, Result, StatusCode, Value};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn registered_failure_is_answered_recoverable_and_sampled() {
    let (interpose, dispatcher) = assemble(json!({"servicePattern": "orders\\..*"}));
    let (rest, registration) = (
        Arc::clone(interpose.rest()),
        Arc::clone(interpose.registration()),
    );
    let exec = move |inv: &mut Invocation| -> Result<()> {
        rest.register(inv);
        registration.register(inv);
        Err(Fault::validation("quantity must be positive").into())
    };

    let exchange = MockExchange::accepting("application/json");
    let mut inv = Invocation::new("orders.Create", DataBag::new().with("qty", -1))
        .with_exchange(exchange.clone());
    let err = dispatcher.dispatch(&exec, &mut inv).unwrap_err();

    assert!(err.is_recoverable());
    assert_eq!(err.fault().message(), "quantity must be positive");
    assert_eq!(exchange.only_response().status, StatusCode::UNPROCESSABLE_ENTITY);

    let stats = interpose.statistics().snapshot();
    assert_eq!(stats.services.len(), 1);
    assert_eq!(stats.services[0].count, 1);
    assert_eq!(interpose.callstack().registry().invocations_failed(), 1);
    assert!(interpose.registration().registry().is_empty());
    assert!(interpose.rest().registry().is_empty());

    interpose.stop(&dispatcher, Duration::from_secs(1));
    assert!(dispatcher.is_empty());
}

#[test]
fn scheduled_failures_are_retried_once_wrapped() {
    let (interpose, dispatcher) = assemble(json!({}));
    let registration = Arc::clone(interpose.registration());
    let exec = move |inv: &mut Invocation| -> Result<()> {
        registration.register(inv);
        Err(Fault::general("lock timeout").into())
    };

    let mut inv = Invocation::new("jobs.Nightly", DataBag::new()).scheduled(true);
    let err = dispatcher.dispatch(&exec, &mut inv).unwrap_err();

    assert!(err.is_recoverable());
    assert!(!err.cause().unwrap().is_recoverable());
    interpose.stop(&dispatcher, Duration::from_secs(1));
}

#[test]
fn services_outside_the_pattern_are_only_dispatched() {
    let (interpose, dispatcher) = assemble(json!({"servicePattern": "orders\\..*"}));
    let ok = |inv: &mut Invocation| -> Result<()> {
        inv.output.insert("ok", true);
        Ok(())
    };

    let mut inv = Invocation::new("health.Check", DataBag::new());
    dispatcher.dispatch(&ok, &mut inv).unwrap();

    assert_eq!(inv.output.get("ok"), Some(&Value::Bool(true)));
    assert!(interpose.statistics().snapshot().services.is_empty());
    interpose.stop(&dispatcher, Duration::from_secs(1));
}

#[test]
fn capture_enabled_by_settings_writes_both_sides() {
    let dir = scratch_dir();
    let (interpose, dispatcher) = assemble(json!({
        "captureEnabled": true,
        "directory": dir.path(),
        "hostName": "node-1",
    }));

    let ok = |inv: &mut Invocation| -> Result<()> {
        inv.output.insert("id", 7);
        Ok(())
    };
    dispatcher
        .dispatch(&ok, &mut Invocation::new("orders.Create", DataBag::new()))
        .unwrap();

    let report = interpose.stop(&dispatcher, Duration::from_secs(5));
    assert_eq!(report.written, 2);
    let files = files(dir.path());
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.starts_with("node-1_")));
}

#[test]
fn reconfigured_directory_applies_after_the_running_invocation() {
    let (before, after) = (scratch_dir(), scratch_dir());
    let (interpose, dispatcher) = assemble(json!({
        "captureEnabled": true,
        "directory": before.path(),
    }));
    let moved: interpose::Settings = serde_json::from_value(json!({
        "captureEnabled": true,
        "directory": after.path(),
    }))
    .unwrap();

    let reconfigure = |_: &mut Invocation| -> Result<()> {
        interpose.reconfigure_capture(&moved).unwrap();
        Ok(())
    };
    dispatcher
        .dispatch(&reconfigure, &mut Invocation::new("orders.Move", DataBag::new()))
        .unwrap();
    let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
    dispatcher
        .dispatch(&ok, &mut Invocation::new("orders.Next", DataBag::new()))
        .unwrap();

    assert_eq!(interpose.stop(&dispatcher, Duration::from_secs(5)).written, 4);
    let first = files(before.path());
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|f| f.contains("_orders.Move_")));
    let second = files(after.path());
    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|f| f.contains("_orders.Next_")));
}
