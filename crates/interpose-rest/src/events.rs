use http::StatusCode;
use interpose_core::InterceptEvent;
use std::time::{Duration, Instant};

/// Events emitted by the REST negotiator.
#[derive(Debug, Clone)]
pub enum RestEvent {
    /// A negotiated response was written.
    Responded {
        processor_name: String,
        timestamp: Instant,
        signature: String,
        status: StatusCode,
        content_type: String,
        elapsed: Duration,
    },
    /// The service had already committed its own response.
    PassedThrough {
        processor_name: String,
        timestamp: Instant,
        signature: String,
    },
    /// Writing the response failed.
    ResponseFailed {
        processor_name: String,
        timestamp: Instant,
        signature: String,
        error: String,
    },
}

impl InterceptEvent for RestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RestEvent::Responded { .. } => "Responded",
            RestEvent::PassedThrough { .. } => "PassedThrough",
            RestEvent::ResponseFailed { .. } => "ResponseFailed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RestEvent::Responded { timestamp, .. }
            | RestEvent::PassedThrough { timestamp, .. }
            | RestEvent::ResponseFailed { timestamp, .. } => *timestamp,
        }
    }

    fn processor_name(&self) -> &str {
        match self {
            RestEvent::Responded { processor_name, .. }
            | RestEvent::PassedThrough { processor_name, .. }
            | RestEvent::ResponseFailed { processor_name, .. } => processor_name,
        }
    }
}
