//! Idempotent start/stop for processors.

use crate::chain::Processor;
use crate::dispatcher::Dispatcher;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Running flag for a processor.
///
/// Transitions are serialized by a small lock held only while starting or
/// stopping, never during an invocation. Readers on the invocation path use
/// [`Lifecycle::is_running`], a single atomic load.
#[derive(Debug, Default)]
pub struct Lifecycle {
    running: AtomicBool,
    transition: Mutex<()>,
}

impl Lifecycle {
    /// Creates a stopped lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true between a successful start and the next stop.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs `f` and marks the lifecycle running, unless it already is.
    /// Returns true if this call performed the transition.
    pub fn start_with(&self, f: impl FnOnce()) -> bool {
        let _guard = self.transition.lock();
        if self.running.load(Ordering::Acquire) {
            return false;
        }
        f();
        self.running.store(true, Ordering::Release);
        true
    }

    /// Marks the lifecycle stopped and runs `f`, unless it already was.
    /// Returns true if this call performed the transition.
    pub fn stop_with(&self, f: impl FnOnce()) -> bool {
        let _guard = self.transition.lock();
        if !self.running.load(Ordering::Acquire) {
            return false;
        }
        self.running.store(false, Ordering::Release);
        f();
        true
    }
}

/// A processor with a start/stop lifecycle bound to a [`Dispatcher`].
///
/// `start` runs [`ManagedProcessor::on_start`] and registers the processor;
/// `stop` deregisters it and runs [`ManagedProcessor::on_stop`] to release
/// owned resources. Both are idempotent and safe to call concurrently.
pub trait ManagedProcessor: Processor + Sized + 'static {
    /// The processor's lifecycle flag.
    fn lifecycle(&self) -> &Lifecycle;

    /// Called once per start, before registration.
    fn on_start(&self) {}

    /// Called once per stop, after deregistration.
    fn on_stop(&self) {}

    /// Starts the processor and registers it with `dispatcher`.
    fn start(self: &Arc<Self>, dispatcher: &Dispatcher) -> bool {
        let this = Arc::clone(self);
        self.lifecycle().start_with(|| {
            this.on_start();
            dispatcher.register(this);
        })
    }

    /// Deregisters the processor from `dispatcher` and stops it.
    fn stop(self: &Arc<Self>, dispatcher: &Dispatcher) -> bool {
        let this: Arc<dyn Processor> = Arc::clone(self) as Arc<dyn Processor>;
        self.lifecycle().stop_with(|| {
            dispatcher.deregister(&this);
            self.on_stop();
        })
    }

    /// Returns true while started.
    fn is_running(&self) -> bool {
        self.lifecycle().is_running()
    }
}
