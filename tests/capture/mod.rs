//! Capture tests.
//!
//! Test organization:
//! - shutdown.rs: draining and cancelling on stop
//! - backpressure.rs: a full queue rejects without blocking

mod backpressure;
mod shutdown;

use futures::future::BoxFuture;
use interpose_capture::{CaptureStore, CaptureTask};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Records file names in the order they are stored, taking `delay` for
/// each.
#[derive(Clone, Default)]
pub(crate) struct SlowStore {
    pub delay: Duration,
    pub stored: Arc<Mutex<Vec<String>>>,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            stored: Arc::default(),
        }
    }
}

impl CaptureStore for SlowStore {
    fn store<'a>(&'a self, task: &'a CaptureTask) -> BoxFuture<'a, interpose_capture::Result<()>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.stored.lock().push(task.file_name().to_string());
            Ok(())
        })
    }
}

pub(crate) fn task(n: usize) -> CaptureTask {
    CaptureTask::new(
        "captures",
        format!("task-{n:03}"),
        interpose_core::DataBag::new().with("n", n as i64),
    )
}
