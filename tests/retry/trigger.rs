//! The trigger policy.

use interpose_core::{DataBag, Dispatcher, Fault, Invocation, ManagedProcessor, Result, ServicePattern};
use interpose_retry::{RetryTrigger, ScheduledWorkerDetector};
use regex::Regex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fail(_: &mut Invocation) -> Result<()> {
    Err(Fault::general("upstream unavailable").into())
}

#[test]
fn named_scheduler_threads_are_background_workers() {
    let dispatcher = Arc::new(Dispatcher::new());
    let trigger = Arc::new(
        RetryTrigger::builder()
            .worker_detector(ScheduledWorkerDetector::new().with_thread_name(Regex::new("^scheduler-").unwrap()))
            .build(),
    );
    trigger.start(&dispatcher);

    let d = Arc::clone(&dispatcher);
    let on_scheduler = std::thread::Builder::new()
        .name("scheduler-1".into())
        .spawn(move || {
            d.dispatch(&fail, &mut Invocation::new("jobs.Sync", DataBag::new()))
                .unwrap_err()
                .is_recoverable()
        })
        .unwrap()
        .join()
        .unwrap();
    assert!(on_scheduler);

    let on_request_thread = dispatcher
        .dispatch(&fail, &mut Invocation::new("jobs.Sync", DataBag::new()))
        .unwrap_err()
        .is_recoverable();
    assert!(!on_request_thread);
}

#[test]
fn include_and_exclude_patterns_narrow_eligibility() {
    let converted = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&converted);
    let dispatcher = Dispatcher::new();
    let trigger = Arc::new(
        RetryTrigger::builder()
            .include_pattern(ServicePattern::new(r"jobs\..*").unwrap())
            .exclude_pattern(ServicePattern::new(r"jobs\.Audit").unwrap())
            .on_converted(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .build(),
    );
    trigger.start(&dispatcher);

    let outcomes: Vec<bool> = ["jobs.Sync", "jobs.Audit", "web.Index"]
        .into_iter()
        .map(|service| {
            dispatcher
                .dispatch(&fail, &mut Invocation::new(service, DataBag::new()).scheduled(true))
                .unwrap_err()
                .is_recoverable()
        })
        .collect();

    assert_eq!(outcomes, vec![true, false, false]);
    assert_eq!(converted.load(Ordering::SeqCst), 1);
}

#[test]
fn stopped_trigger_converts_nothing() {
    let dispatcher = Dispatcher::new();
    let trigger = Arc::new(RetryTrigger::builder().build());
    trigger.start(&dispatcher);
    trigger.stop(&dispatcher);

    let err = dispatcher
        .dispatch(&fail, &mut Invocation::new("jobs.Sync", DataBag::new()).scheduled(true))
        .unwrap_err();
    assert!(!err.is_recoverable());
}
