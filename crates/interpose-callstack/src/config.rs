//! Configuration for the call-stack processor.

use crate::clone::CloneLimits;
use crate::events::CallStackEvent;
use crate::processor::CallStackProcessor;
use interpose_core::{EventListeners, ServicePattern};
use std::time::Duration;

/// Configuration for [`CallStackProcessor`].
#[derive(Clone)]
pub struct CallStackConfig {
    pub(crate) pattern: ServicePattern,
    pub(crate) limits: CloneLimits,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<CallStackEvent>,
}

impl CallStackConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CallStackConfigBuilder {
        CallStackConfigBuilder::new()
    }
}

/// Builder for [`CallStackConfig`].
pub struct CallStackConfigBuilder {
    pattern: ServicePattern,
    limits: CloneLimits,
    name: String,
    event_listeners: EventListeners<CallStackEvent>,
}

impl CallStackConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            pattern: ServicePattern::any(),
            limits: CloneLimits::default(),
            name: "callstack".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Only record services matching `pattern`.
    ///
    /// Default: every service
    pub fn service_pattern(mut self, pattern: ServicePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Nesting levels kept in input snapshots, counting the top-level bag.
    ///
    /// Default: 3
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.limits.max_depth = max_depth;
        self
    }

    /// Entries kept per level in input snapshots.
    ///
    /// Default: 20
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.limits.max_length = max_length;
        self
    }

    /// Sets the name of this processor instance.
    ///
    /// Default: "callstack"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked after a frame is pushed.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - service name and the thread's stack depth after
    /// the push.
    pub fn on_frame_pushed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CallStackEvent::FramePushed { service, depth, .. } = event {
                f(service, *depth);
            }
        });
        self
    }

    /// Registers a callback invoked when a monitored invocation fails.
    ///
    /// # Callback Signature
    /// `Fn(&str, Duration)` - service name and time spent before failing.
    pub fn on_invocation_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CallStackEvent::InvocationFailed {
                service, elapsed, ..
            } = event
            {
                f(service, *elapsed);
            }
        });
        self
    }

    /// Builds the processor.
    pub fn build(self) -> CallStackProcessor {
        CallStackProcessor::new(CallStackConfig {
            pattern: self.pattern,
            limits: self.limits,
            name: self.name,
            event_listeners: self.event_listeners,
        })
    }
}

impl Default for CallStackConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
