//! Single-worker asynchronous capture sink.
//!
//! Captures are produced on host worker threads, which must never block on
//! disk. [`AsyncCaptureSink`] queues them on a bounded channel consumed by
//! one dedicated thread running a current-thread tokio runtime, so every
//! capture is persisted in submission order and a slow disk only ever fills
//! the queue.

use crate::error::{CaptureError, Result};
use crate::events::CaptureEvent;
use crate::store::CaptureStore;
use crate::task::CaptureTask;
use arc_swap::ArcSwapOption;
use interpose_core::EventListeners;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

#[cfg(feature = "metrics")]
use metrics::counter;

/// Default number of queued captures.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Name of the worker thread.
pub const WORKER_THREAD_NAME: &str = "interpose-capture";

/// How long a cancelled worker gets to report back.
const CANCEL_GRACE: Duration = Duration::from_millis(200);

/// Outcome of a shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Captures persisted since the sink started.
    pub written: u64,
    /// Captures whose persistence failed.
    pub failed: u64,
    /// Queued captures dropped because the timeout expired.
    pub cancelled: u64,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    /// Report for a worker that never answered: everything not yet written
    /// or failed counts as cancelled.
    fn abandoned(&self) -> ShutdownReport {
        let written = self.written.load(Ordering::Acquire);
        let failed = self.failed.load(Ordering::Acquire);
        let submitted = self.submitted.load(Ordering::Acquire);
        ShutdownReport {
            written,
            failed,
            cancelled: submitted.saturating_sub(written + failed),
        }
    }
}

struct Channel {
    tx: mpsc::Sender<CaptureTask>,
    counters: Arc<Counters>,
}

struct Worker {
    handle: JoinHandle<()>,
    cancel: watch::Sender<bool>,
    done: std_mpsc::Receiver<ShutdownReport>,
    counters: Arc<Counters>,
}

/// Bounded queue of captures drained by one dedicated worker thread.
pub struct AsyncCaptureSink {
    channel: ArcSwapOption<Channel>,
    worker: Mutex<Option<Worker>>,
    store: Arc<dyn CaptureStore>,
    capacity: usize,
    name: String,
    event_listeners: EventListeners<CaptureEvent>,
}

impl AsyncCaptureSink {
    /// Creates a stopped sink persisting through `store`, queueing at most
    /// `capacity` captures.
    pub fn new(store: Arc<dyn CaptureStore>, capacity: usize) -> Self {
        Self {
            channel: ArcSwapOption::empty(),
            worker: Mutex::new(None),
            store,
            capacity: capacity.max(1),
            name: "capture".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    pub(crate) fn with_events(
        mut self,
        name: String,
        event_listeners: EventListeners<CaptureEvent>,
    ) -> Self {
        self.name = name;
        self.event_listeners = event_listeners;
        self
    }

    /// Spawns the worker. Returns `Ok(false)` if it was already running.
    pub fn start(&self) -> Result<bool> {
        let mut slot = self.worker.lock();
        if slot.is_some() {
            return Ok(false);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(CaptureError::Worker)?;
        let (tx, rx) = mpsc::channel(self.capacity);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (done_tx, done_rx) = std_mpsc::channel();
        let counters = Arc::new(Counters::default());

        let context = WorkerContext {
            store: Arc::clone(&self.store),
            counters: Arc::clone(&counters),
            name: self.name.clone(),
            event_listeners: self.event_listeners.clone(),
        };
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let report = runtime.block_on(context.run(rx, cancel_rx));
                let _ = done_tx.send(report);
                runtime.shutdown_background();
            })
            .map_err(CaptureError::Worker)?;

        self.channel.store(Some(Arc::new(Channel {
            tx,
            counters: Arc::clone(&counters),
        })));
        *slot = Some(Worker {
            handle,
            cancel: cancel_tx,
            done: done_rx,
            counters,
        });
        tracing::debug!(capacity = self.capacity, "capture worker started");
        Ok(true)
    }

    /// Queues a capture without blocking.
    pub fn submit(&self, task: CaptureTask) -> Result<()> {
        let guard = self.channel.load();
        let channel = guard.as_ref().ok_or(CaptureError::ShutDown)?;
        channel.tx.try_send(task).map_err(|e| match e {
            TrySendError::Full(_) => CaptureError::QueueFull,
            TrySendError::Closed(_) => CaptureError::ShutDown,
        })?;
        channel.counters.submitted.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Stops accepting captures and waits up to `timeout` for the queue to
    /// drain. Captures still queued after that are cancelled. A stopped sink
    /// returns an empty report.
    pub fn stop(&self, timeout: Duration) -> ShutdownReport {
        let mut slot = self.worker.lock();
        let Some(worker) = slot.take() else {
            return ShutdownReport::default();
        };
        self.channel.store(None);

        let answered = match worker.done.recv_timeout(timeout) {
            Ok(report) => Some(report),
            Err(_) => {
                let _ = worker.cancel.send(true);
                worker.done.recv_timeout(CANCEL_GRACE).ok()
            }
        };

        let report = match answered {
            Some(report) => {
                if worker.handle.join().is_err() {
                    tracing::warn!("capture worker panicked during shutdown");
                }
                report
            }
            None => {
                tracing::warn!("capture worker did not stop in time, detaching it");
                worker.counters.abandoned()
            }
        };

        #[cfg(feature = "metrics")]
        if report.cancelled > 0 {
            counter!("capture_tasks_total", "result" => "cancelled").increment(report.cancelled);
        }

        tracing::debug!(
            written = report.written,
            failed = report.failed,
            cancelled = report.cancelled,
            "capture worker stopped"
        );
        self.event_listeners.emit(&CaptureEvent::Stopped {
            processor_name: self.name.clone(),
            timestamp: Instant::now(),
            written: report.written,
            failed: report.failed,
            cancelled: report.cancelled,
        });
        report
    }

    /// Returns true while captures are accepted.
    pub fn is_running(&self) -> bool {
        self.channel.load().is_some()
    }

    /// Captures waiting in the queue.
    pub fn pending(&self) -> usize {
        self.channel
            .load()
            .as_ref()
            .map_or(0, |c| c.tx.max_capacity() - c.tx.capacity())
    }

    /// Queue capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

struct WorkerContext {
    store: Arc<dyn CaptureStore>,
    counters: Arc<Counters>,
    name: String,
    event_listeners: EventListeners<CaptureEvent>,
}

impl WorkerContext {
    async fn run(
        self,
        mut rx: mpsc::Receiver<CaptureTask>,
        mut cancel: watch::Receiver<bool>,
    ) -> ShutdownReport {
        let mut cancelled = 0;
        loop {
            let task = tokio::select! {
                biased;
                _ = cancel.changed() => break,
                task = rx.recv() => match task {
                    Some(task) => task,
                    None => return self.report(0),
                },
            };

            let outcome = tokio::select! {
                biased;
                _ = cancel.changed() => None,
                outcome = self.store.store(&task) => Some(outcome),
            };
            match outcome {
                Some(Ok(())) => self.written(&task),
                Some(Err(e)) => self.failed(&task, e),
                None => {
                    cancelled += 1;
                    break;
                }
            }
        }

        rx.close();
        while rx.try_recv().is_ok() {
            cancelled += 1;
        }
        self.report(cancelled)
    }

    fn report(&self, cancelled: u64) -> ShutdownReport {
        ShutdownReport {
            written: self.counters.written.load(Ordering::Acquire),
            failed: self.counters.failed.load(Ordering::Acquire),
            cancelled,
        }
    }

    fn written(&self, task: &CaptureTask) {
        self.counters.written.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(file = task.file_name(), "capture written");

        #[cfg(feature = "metrics")]
        counter!("capture_tasks_total", "result" => "written").increment(1);

        if !self.event_listeners.is_empty() {
            self.event_listeners.emit(&CaptureEvent::Written {
                processor_name: self.name.clone(),
                timestamp: Instant::now(),
                file_name: task.file_name().to_string(),
            });
        }
    }

    fn failed(&self, task: &CaptureTask, error: CaptureError) {
        self.counters.failed.fetch_add(1, Ordering::AcqRel);
        tracing::warn!(file = task.file_name(), error = %error, "capture failed");

        #[cfg(feature = "metrics")]
        counter!("capture_tasks_total", "result" => "failed").increment(1);

        self.event_listeners.emit(&CaptureEvent::Failed {
            processor_name: self.name.clone(),
            timestamp: Instant::now(),
            file_name: task.file_name().to_string(),
            error: error.to_string(),
        });
    }
}
