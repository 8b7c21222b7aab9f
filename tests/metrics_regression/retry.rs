//! Retry metrics regression tests

use super::helpers::*;
use interpose_core::{DataBag, Dispatcher, Fault, Invocation, ManagedProcessor, Result};
use interpose_retry::{RetryRegistration, RetryTrigger};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn conversion_counters_carry_the_policy() {
    init_recorder();

    let dispatcher = Dispatcher::new();
    let trigger = Arc::new(RetryTrigger::builder().build());
    let registration = Arc::new(RetryRegistration::builder().build());
    trigger.start(&dispatcher);
    registration.start(&dispatcher);

    let fail = |_: &mut Invocation| -> Result<()> { Err(Fault::general("timeout").into()) };
    let mut scheduled = Invocation::new("jobs.Sweep", DataBag::new()).scheduled(true);
    let _ = dispatcher.dispatch(&fail, &mut scheduled);

    let r = Arc::clone(&registration);
    let opted_in = move |inv: &mut Invocation| -> Result<()> {
        r.register(inv);
        Err(Fault::general("timeout").into())
    };
    let _ = dispatcher.dispatch(&opted_in, &mut Invocation::new("orders.Sync", DataBag::new()));

    assert_counter_exists("retry_conversions_total");
    assert_metric_has_label("retry_conversions_total", "policy", "trigger");
    assert_metric_has_label("retry_conversions_total", "policy", "opt_in");
}
