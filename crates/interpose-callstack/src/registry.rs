//! Per-thread call stacks of in-flight invocations.

use crate::clone::{bounded_clone, CloneLimits};
use dashmap::DashMap;
use interpose_core::{epoch_millis, Caller, ContextKey, DataBag, Invocation};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Snapshot of one nested invocation, taken at entry.
#[derive(Debug, Clone)]
pub struct CallFrame {
    service: Arc<str>,
    input: DataBag,
    started_at: SystemTime,
    started: Instant,
    caller: Caller,
}

impl CallFrame {
    fn capture(invocation: &Invocation, limits: CloneLimits) -> Self {
        Self {
            service: invocation.service_arc(),
            input: bounded_clone(&invocation.input, limits),
            started_at: invocation.started_at(),
            started: invocation.started(),
            caller: invocation.caller().clone(),
        }
    }

    /// The service this frame belongs to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Bounded copy of the input at entry.
    pub fn input(&self) -> &DataBag {
        &self.input
    }

    fn snapshot(&self, now: Instant) -> FrameSnapshot {
        FrameSnapshot {
            service: self.service.to_string(),
            started_at_millis: epoch_millis(self.started_at),
            elapsed_ms: now.saturating_duration_since(self.started).as_secs_f64() * 1000.0,
            caller: self.caller.clone(),
            input: self.input.clone(),
        }
    }
}

/// Serializable view of one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub service: String,
    pub started_at_millis: u64,
    pub elapsed_ms: f64,
    pub caller: Caller,
    pub input: DataBag,
}

/// Serializable view of one thread's stack, outermost frame first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadStackSnapshot {
    pub context: String,
    pub depth: usize,
    pub frames: Vec<FrameSnapshot>,
}

/// Diagnostics report over every thread with an in-flight invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStackSnapshot {
    pub taken_at_millis: u64,
    pub invocations_started: u64,
    pub invocations_failed: u64,
    pub threads: Vec<ThreadStackSnapshot>,
}

/// Registry of per-thread call stacks.
///
/// A thread's entry exists only while it has at least one in-flight
/// invocation; popping the last frame removes it.
#[derive(Debug)]
pub struct CallStackRegistry {
    stacks: DashMap<ContextKey, Vec<CallFrame>>,
    started: AtomicU64,
    failed: AtomicU64,
    limits: CloneLimits,
}

impl CallStackRegistry {
    /// Creates an empty registry.
    pub fn new(limits: CloneLimits) -> Self {
        Self {
            stacks: DashMap::new(),
            started: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            limits,
        }
    }

    /// Pushes a frame for `invocation` onto its owner's stack and returns
    /// the new depth.
    pub fn push(&self, invocation: &Invocation) -> usize {
        let frame = CallFrame::capture(invocation, self.limits);
        self.started.fetch_add(1, Ordering::Relaxed);
        let mut stack = self.stacks.entry(invocation.owner()).or_default();
        stack.push(frame);
        stack.len()
    }

    /// Pops the top frame of `owner`'s stack, removing the entry when it
    /// becomes empty.
    pub fn pop(&self, owner: ContextKey) -> Option<CallFrame> {
        let frame = self.stacks.get_mut(&owner).and_then(|mut stack| stack.pop());
        self.stacks.remove_if(&owner, |_, stack| stack.is_empty());
        frame
    }

    /// Counts one invocation that raised an error.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Current stack depth of `owner`.
    pub fn depth(&self, owner: ContextKey) -> usize {
        self.stacks.get(&owner).map_or(0, |stack| stack.len())
    }

    /// Returns true if `owner` has a stack entry.
    pub fn contains(&self, owner: ContextKey) -> bool {
        self.stacks.contains_key(&owner)
    }

    /// Number of threads with in-flight invocations.
    pub fn active_threads(&self) -> usize {
        self.stacks.len()
    }

    /// Total invocations started since creation.
    pub fn invocations_started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Total invocations that raised since creation.
    pub fn invocations_failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Limits applied to input snapshots.
    pub fn limits(&self) -> CloneLimits {
        self.limits
    }

    /// Drops every stack. Counters are kept.
    pub fn clear(&self) {
        self.stacks.clear();
    }

    /// Builds a diagnostics report.
    ///
    /// Other threads keep pushing and popping while this runs, so a stack
    /// may be observed mid-transition.
    pub fn snapshot(&self) -> CallStackSnapshot {
        let now = Instant::now();
        let mut threads: Vec<ThreadStackSnapshot> = self
            .stacks
            .iter()
            .map(|entry| ThreadStackSnapshot {
                context: entry.key().to_string(),
                depth: entry.value().len(),
                frames: entry.value().iter().map(|f| f.snapshot(now)).collect(),
            })
            .collect();
        threads.sort_by(|a, b| a.context.cmp(&b.context));

        CallStackSnapshot {
            taken_at_millis: epoch_millis(SystemTime::now()),
            invocations_started: self.invocations_started(),
            invocations_failed: self.invocations_failed(),
            threads,
        }
    }
}

impl Default for CallStackRegistry {
    fn default() -> Self {
        Self::new(CloneLimits::default())
    }
}
