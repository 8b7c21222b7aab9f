//! A full queue rejects without blocking.

use super::{task, SlowStore};
use crate::common::scratch_dir;
use interpose_capture::{AsyncCaptureSink, CaptureError, CaptureProcessor};
use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn full_queue_rejects_submissions() {
    let sink = AsyncCaptureSink::new(Arc::new(SlowStore::new(Duration::from_millis(500))), 2);
    sink.start().unwrap();

    let started = Instant::now();
    let outcomes: Vec<_> = (0..10).map(|n| sink.submit(task(n))).collect();
    assert!(started.elapsed() < Duration::from_millis(250));

    let accepted = outcomes.iter().filter(|o| o.is_ok()).count();
    assert!((2..=3).contains(&accepted), "accepted {accepted}");
    assert!(outcomes
        .iter()
        .filter_map(|o| o.as_ref().err())
        .all(|e| matches!(e, CaptureError::QueueFull)));

    let report = sink.stop(Duration::from_millis(20));
    assert_eq!(
        report.written + report.failed + report.cancelled,
        accepted as u64
    );
}

#[test]
fn rejected_captures_never_fail_the_invocation() {
    let dir = scratch_dir();
    let rejected = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&rejected);
    let dispatcher = Dispatcher::new();
    let capture = Arc::new(
        CaptureProcessor::builder()
            .directory(dir.path())
            .queue_capacity(1)
            .store(SlowStore::new(Duration::from_millis(200)))
            .on_rejected(move |_, reason| r.lock().push(reason))
            .build(),
    );
    capture.start(&dispatcher);

    let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
    for _ in 0..5 {
        dispatcher
            .dispatch(&ok, &mut Invocation::new("hot.Path", DataBag::new()))
            .unwrap();
    }

    let rejected = rejected.lock().clone();
    assert!(!rejected.is_empty());
    assert!(rejected.iter().all(|reason| *reason == "queue_full"));
    capture.shutdown(&dispatcher, Duration::from_millis(20));
}
