//! Both policies in one chain.

use interpose_core::{DataBag, Dispatcher, Fault, Invocation, InvocationError, ManagedProcessor, Result};
use interpose_retry::{RetryPolicy, RetryRegistration, RetryTrigger};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn double_match_wraps_once_at_the_inner_policy() {
    let policies = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Arc::new(Dispatcher::new());

    let p = Arc::clone(&policies);
    let trigger = Arc::new(
        RetryTrigger::builder()
            .on_converted(move |_| p.lock().push(RetryPolicy::Trigger))
            .build(),
    );
    let p = Arc::clone(&policies);
    let registration = Arc::new(
        RetryRegistration::builder()
            .on_converted(move |_| p.lock().push(RetryPolicy::OptIn))
            .build(),
    );
    trigger.start(&dispatcher);
    registration.start(&dispatcher);
    assert_eq!(dispatcher.processor_names(), vec!["retry-trigger", "retry-registration"]);

    let r = Arc::clone(&registration);
    let exec = move |inv: &mut Invocation| -> Result<()> {
        r.register(inv);
        Err(Fault::general("transient").into())
    };
    let err = dispatcher
        .dispatch(&exec, &mut Invocation::new("jobs.Sync", DataBag::new()).scheduled(true))
        .unwrap_err();

    assert!(err.is_recoverable());
    assert!(matches!(err.cause(), Some(InvocationError::Unclassified(_))));
    assert_eq!(*policies.lock(), vec![RetryPolicy::OptIn]);
}

#[test]
fn trigger_wraps_what_opt_in_skips() {
    let policies = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Arc::new(Dispatcher::new());

    let p = Arc::clone(&policies);
    let trigger = Arc::new(
        RetryTrigger::builder()
            .on_converted(move |_| p.lock().push(RetryPolicy::Trigger))
            .build(),
    );
    let registration = Arc::new(RetryRegistration::builder().build());
    trigger.start(&dispatcher);
    registration.start(&dispatcher);

    let r = Arc::clone(&registration);
    let exec = move |inv: &mut Invocation| -> Result<()> {
        r.register(inv);
        Err(InvocationError::unrecoverable(Fault::security("forbidden")))
    };
    let err = dispatcher
        .dispatch(&exec, &mut Invocation::new("jobs.Sync", DataBag::new()).scheduled(true))
        .unwrap_err();

    assert!(err.is_recoverable());
    assert!(matches!(err.cause(), Some(InvocationError::Unrecoverable(_))));
    assert_eq!(err.fault().message(), "forbidden");
    assert_eq!(*policies.lock(), vec![RetryPolicy::Trigger]);
}

#[test]
fn unscheduled_unrecoverable_is_left_alone() {
    let dispatcher = Arc::new(Dispatcher::new());
    let trigger = Arc::new(RetryTrigger::builder().build());
    let registration = Arc::new(RetryRegistration::builder().build());
    trigger.start(&dispatcher);
    registration.start(&dispatcher);

    let r = Arc::clone(&registration);
    let exec = move |inv: &mut Invocation| -> Result<()> {
        r.register(inv);
        Err(InvocationError::unrecoverable(Fault::security("forbidden")))
    };
    let err = dispatcher
        .dispatch(&exec, &mut Invocation::new("jobs.Sync", DataBag::new()))
        .unwrap_err();

    assert!(err.is_unrecoverable());
}
