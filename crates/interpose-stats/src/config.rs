//! Configuration for the statistics processor.

use crate::estimator::DEFAULT_BUFFER_CAPACITY;
use crate::events::StatisticsEvent;
use crate::processor::StatisticsProcessor;
use interpose_core::{EventListeners, ServicePattern};

/// Configuration for [`StatisticsProcessor`].
#[derive(Clone)]
pub struct StatisticsConfig {
    pub(crate) pattern: ServicePattern,
    pub(crate) buffer_capacity: usize,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<StatisticsEvent>,
}

impl StatisticsConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> StatisticsConfigBuilder {
        StatisticsConfigBuilder::new()
    }
}

/// Builder for [`StatisticsConfig`].
pub struct StatisticsConfigBuilder {
    pattern: ServicePattern,
    buffer_capacity: usize,
    name: String,
    event_listeners: EventListeners<StatisticsEvent>,
}

impl StatisticsConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            pattern: ServicePattern::any(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            name: "statistics".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Only sample services matching `pattern`.
    ///
    /// Default: every service
    pub fn service_pattern(mut self, pattern: ServicePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Samples buffered per service before a writer drains them.
    ///
    /// Default: 64
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets the name of this processor instance.
    ///
    /// Default: "statistics"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked when a sampling window starts.
    pub fn on_sampling_started<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let StatisticsEvent::SamplingStarted { .. } = event {
                f();
            }
        });
        self
    }

    /// Registers a callback invoked when sampling stops.
    ///
    /// # Callback Signature
    /// `Fn(usize)` - number of services whose accumulators were dropped.
    pub fn on_sampling_stopped<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let StatisticsEvent::SamplingStopped { services, .. } = event {
                f(*services);
            }
        });
        self
    }

    /// Builds the processor.
    pub fn build(self) -> StatisticsProcessor {
        StatisticsProcessor::new(StatisticsConfig {
            pattern: self.pattern,
            buffer_capacity: self.buffer_capacity,
            name: self.name,
            event_listeners: self.event_listeners,
        })
    }
}

impl Default for StatisticsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
