//! Detection of background and scheduled workers.

use interpose_core::Invocation;
use regex::Regex;

/// Decides whether an invocation runs on a background or scheduled worker.
///
/// Hosts differ in how they mark such work, so the detector is chosen once
/// when the trigger policy is built.
pub trait WorkerDetector: Send + Sync {
    /// Returns true if `invocation` runs on a background worker.
    fn is_background(&self, invocation: &Invocation) -> bool;
}

impl<F> WorkerDetector for F
where
    F: Fn(&Invocation) -> bool + Send + Sync,
{
    fn is_background(&self, invocation: &Invocation) -> bool {
        self(invocation)
    }
}

/// Default detector: the invocation's `scheduled` flag, or optionally the
/// name of the current thread.
#[derive(Debug, Clone, Default)]
pub struct ScheduledWorkerDetector {
    thread_name: Option<Regex>,
}

impl ScheduledWorkerDetector {
    /// A detector that only honours the `scheduled` flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treats threads whose name matches `pattern` as background
    /// workers.
    pub fn with_thread_name(mut self, pattern: Regex) -> Self {
        self.thread_name = Some(pattern);
        self
    }
}

impl WorkerDetector for ScheduledWorkerDetector {
    fn is_background(&self, invocation: &Invocation) -> bool {
        if invocation.is_scheduled() {
            return true;
        }
        match &self.thread_name {
            Some(pattern) => std::thread::current()
                .name()
                .is_some_and(|name| pattern.is_match(name)),
            None => false,
        }
    }
}
