use interpose_core::InterceptEvent;
use std::fmt;
use std::time::Instant;

/// The policy that classified an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// The service registered itself as retryable.
    OptIn,
    /// The invocation ran on a background worker.
    Trigger,
}

impl RetryPolicy {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryPolicy::OptIn => "opt_in",
            RetryPolicy::Trigger => "trigger",
        }
    }
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an error was left unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The error was already unrecoverable.
    Unrecoverable,
    /// The error message matched an exclusion pattern.
    Excluded,
}

/// Events emitted by the retry processors.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// An error was wrapped as recoverable.
    Converted {
        processor_name: String,
        timestamp: Instant,
        service: String,
        policy: RetryPolicy,
    },
    /// An error from an eligible invocation was left as is.
    Skipped {
        processor_name: String,
        timestamp: Instant,
        service: String,
        policy: RetryPolicy,
        reason: SkipReason,
    },
}

impl InterceptEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Converted { .. } => "Converted",
            RetryEvent::Skipped { .. } => "Skipped",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Converted { timestamp, .. } | RetryEvent::Skipped { timestamp, .. } => {
                *timestamp
            }
        }
    }

    fn processor_name(&self) -> &str {
        match self {
            RetryEvent::Converted { processor_name, .. }
            | RetryEvent::Skipped { processor_name, .. } => processor_name,
        }
    }
}
