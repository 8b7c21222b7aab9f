use interpose_core::InterceptEvent;
use std::time::{Duration, Instant};

/// Events emitted by the call-stack processor.
#[derive(Debug, Clone)]
pub enum CallStackEvent {
    /// A frame was pushed for a monitored invocation.
    FramePushed {
        processor_name: String,
        timestamp: Instant,
        service: String,
        depth: usize,
    },
    /// A monitored invocation raised an error.
    InvocationFailed {
        processor_name: String,
        timestamp: Instant,
        service: String,
        elapsed: Duration,
    },
}

impl InterceptEvent for CallStackEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CallStackEvent::FramePushed { .. } => "FramePushed",
            CallStackEvent::InvocationFailed { .. } => "InvocationFailed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CallStackEvent::FramePushed { timestamp, .. }
            | CallStackEvent::InvocationFailed { timestamp, .. } => *timestamp,
        }
    }

    fn processor_name(&self) -> &str {
        match self {
            CallStackEvent::FramePushed { processor_name, .. }
            | CallStackEvent::InvocationFailed { processor_name, .. } => processor_name,
        }
    }
}
