use interpose_core::InterceptEvent;
use std::time::Instant;

/// Events emitted by the capture processor and its worker.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// A capture file was persisted.
    Written {
        processor_name: String,
        timestamp: Instant,
        file_name: String,
    },
    /// Persisting a capture failed.
    Failed {
        processor_name: String,
        timestamp: Instant,
        file_name: String,
        error: String,
    },
    /// A capture could not be queued.
    Rejected {
        processor_name: String,
        timestamp: Instant,
        file_name: String,
        reason: &'static str,
    },
    /// The sink shut down.
    Stopped {
        processor_name: String,
        timestamp: Instant,
        written: u64,
        failed: u64,
        cancelled: u64,
    },
}

impl InterceptEvent for CaptureEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CaptureEvent::Written { .. } => "Written",
            CaptureEvent::Failed { .. } => "Failed",
            CaptureEvent::Rejected { .. } => "Rejected",
            CaptureEvent::Stopped { .. } => "Stopped",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CaptureEvent::Written { timestamp, .. }
            | CaptureEvent::Failed { timestamp, .. }
            | CaptureEvent::Rejected { timestamp, .. }
            | CaptureEvent::Stopped { timestamp, .. } => *timestamp,
        }
    }

    fn processor_name(&self) -> &str {
        match self {
            CaptureEvent::Written { processor_name, .. }
            | CaptureEvent::Failed { processor_name, .. }
            | CaptureEvent::Rejected { processor_name, .. }
            | CaptureEvent::Stopped { processor_name, .. } => processor_name,
        }
    }
}
