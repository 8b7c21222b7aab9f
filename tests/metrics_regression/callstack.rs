//! Call stack metrics regression tests

use super::helpers::*;
use interpose_callstack::CallStackProcessor;
use interpose_core::{DataBag, Dispatcher, Fault, Invocation, ManagedProcessor, Result};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn invocation_counters_exist() {
    init_recorder();

    let dispatcher = Dispatcher::new();
    let callstack = Arc::new(CallStackProcessor::builder().name("metrics_stack").build());
    callstack.start(&dispatcher);

    let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
    let fail = |_: &mut Invocation| -> Result<()> { Err(Fault::general("boom").into()) };
    dispatcher
        .dispatch(&ok, &mut Invocation::new("svc", DataBag::new()))
        .unwrap();
    let _ = dispatcher.dispatch(&fail, &mut Invocation::new("svc", DataBag::new()));

    assert_counter_exists("interpose_invocations_total");
    assert_metric_has_label("interpose_invocations_total", "processor", "metrics_stack");
    assert_counter_exists("interpose_invocation_errors_total");
    assert_metric_has_label("interpose_invocation_errors_total", "processor", "metrics_stack");
}
