//! Capture stress tests

use super::hammer;
use interpose_capture::CaptureProcessor;
use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Test: Producers never block on a saturated worker, and shutdown is bounded
#[test]
#[ignore]
fn stress_saturated_queue() {
    let dir = tempfile::tempdir().unwrap();
    let rejected = Arc::new(AtomicU64::new(0));
    let r = Arc::clone(&rejected);
    let slowest = Arc::new(Mutex::new(Duration::ZERO));

    let dispatcher = Arc::new(Dispatcher::new());
    let capture = Arc::new(
        CaptureProcessor::builder()
            .directory(dir.path())
            .queue_capacity(64)
            .on_rejected(move |_, _| {
                r.fetch_add(1, Ordering::Relaxed);
            })
            .build(),
    );
    capture.start(&dispatcher);

    let s = Arc::clone(&slowest);
    hammer(&dispatcher, 8, 2_000, move |d, _, i| {
        let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
        let started = Instant::now();
        d.dispatch(&ok, &mut Invocation::new("hot", DataBag::new().with("i", i as i64)))
            .unwrap();
        let mut slowest = s.lock();
        *slowest = (*slowest).max(started.elapsed());
    });

    let start = Instant::now();
    let report = capture.shutdown(&dispatcher, Duration::from_millis(100));
    let shutdown = start.elapsed();

    println!("slowest dispatch: {:?}", *slowest.lock());
    println!("rejected: {}", rejected.load(Ordering::Relaxed));
    println!("report: {:?}, shutdown took {:?}", report, shutdown);

    assert_eq!(
        report.written + report.failed + report.cancelled + rejected.load(Ordering::Relaxed),
        32_000
    );
    assert!(shutdown < Duration::from_secs(2));
}
