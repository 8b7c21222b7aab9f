use interpose_core::InterceptEvent;
use std::time::Instant;

/// Events emitted by the statistics processor.
#[derive(Debug, Clone)]
pub enum StatisticsEvent {
    /// A new sampling window started; all accumulators were reset.
    SamplingStarted {
        processor_name: String,
        timestamp: Instant,
    },
    /// Sampling stopped; accumulators for `services` services were dropped.
    SamplingStopped {
        processor_name: String,
        timestamp: Instant,
        services: usize,
    },
}

impl InterceptEvent for StatisticsEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StatisticsEvent::SamplingStarted { .. } => "SamplingStarted",
            StatisticsEvent::SamplingStopped { .. } => "SamplingStopped",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            StatisticsEvent::SamplingStarted { timestamp, .. }
            | StatisticsEvent::SamplingStopped { timestamp, .. } => *timestamp,
        }
    }

    fn processor_name(&self) -> &str {
        match self {
            StatisticsEvent::SamplingStarted { processor_name, .. }
            | StatisticsEvent::SamplingStopped { processor_name, .. } => processor_name,
        }
    }
}
