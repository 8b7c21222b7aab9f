//! Draining and cancelling on stop.

use super::{task, SlowStore};
use crate::common::{files, scratch_dir};
use interpose_capture::{AsyncCaptureSink, CaptureProcessor};
use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn generous_timeout_writes_every_file() {
    let dir = scratch_dir();
    let dispatcher = Dispatcher::new();
    let capture = Arc::new(
        CaptureProcessor::builder()
            .directory(dir.path())
            .host_name("it")
            .build(),
    );
    capture.start(&dispatcher);

    let ok = |inv: &mut Invocation| -> Result<()> {
        inv.output.insert("done", true);
        Ok(())
    };
    for n in 0..20 {
        let mut inv = Invocation::new("batch.Item", DataBag::new().with("n", n));
        dispatcher.dispatch(&ok, &mut inv).unwrap();
    }

    let report = capture.shutdown(&dispatcher, Duration::from_secs(10));
    assert_eq!(report.written, 40);
    assert_eq!(report.cancelled, 0);

    let files = files(dir.path());
    assert_eq!(files.len(), 40);
    assert_eq!(files.iter().filter(|f| f.ends_with("_input")).count(), 20);
    assert!(!capture.sink().is_running());
}

#[test]
fn tasks_are_stored_in_submission_order() {
    let store = SlowStore::new(Duration::from_millis(1));
    let sink = AsyncCaptureSink::new(Arc::new(store.clone()), 64);
    assert!(sink.start().unwrap());
    assert!(!sink.start().unwrap());

    for n in 0..30 {
        sink.submit(task(n)).unwrap();
    }
    let report = sink.stop(Duration::from_secs(10));

    assert_eq!(report.written, 30);
    let expected: Vec<String> = (0..30).map(|n| format!("task-{n:03}")).collect();
    assert_eq!(*store.stored.lock(), expected);
}

#[test]
fn short_timeout_returns_promptly_and_cancels_the_rest() {
    let store = SlowStore::new(Duration::from_millis(300));
    let sink = AsyncCaptureSink::new(Arc::new(store.clone()), 64);
    sink.start().unwrap();
    for n in 0..10 {
        sink.submit(task(n)).unwrap();
    }

    let started = Instant::now();
    let report = sink.stop(Duration::from_millis(50));
    assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());

    assert!(report.cancelled > 0);
    assert_eq!(report.written + report.failed + report.cancelled, 10);
    assert_eq!(store.stored.lock().len() as u64, report.written);
}

#[test]
fn stopping_twice_reports_nothing_the_second_time() {
    let sink = AsyncCaptureSink::new(Arc::new(SlowStore::default()), 4);
    sink.start().unwrap();
    sink.submit(task(0)).unwrap();

    assert_eq!(sink.stop(Duration::from_secs(5)).written, 1);
    assert_eq!(sink.stop(Duration::from_secs(5)), Default::default());
}

#[test]
fn sink_can_be_restarted() {
    let store = SlowStore::default();
    let sink = AsyncCaptureSink::new(Arc::new(store.clone()), 4);

    sink.start().unwrap();
    sink.submit(task(0)).unwrap();
    sink.stop(Duration::from_secs(5));

    sink.start().unwrap();
    sink.submit(task(1)).unwrap();
    let report = sink.stop(Duration::from_secs(5));

    // Counters are per run.
    assert_eq!(report.written, 1);
    assert_eq!(store.stored.lock().len(), 2);
}
