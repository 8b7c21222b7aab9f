//! Configuration for the retry processors.

use crate::events::RetryEvent;
use crate::detector::{ScheduledWorkerDetector, WorkerDetector};
use crate::registration::RetryRegistration;
use crate::trigger::RetryTrigger;
use interpose_core::{EventListeners, ServicePattern};
use regex::Regex;
use std::sync::Arc;

macro_rules! event_callbacks {
    ($builder:ident) => {
        impl $builder {
            /// Registers a callback invoked when an error is wrapped as
            /// recoverable.
            ///
            /// # Callback Signature
            /// `Fn(&str)` - the service whose error was converted.
            pub fn on_converted<F>(mut self, f: F) -> Self
            where
                F: Fn(&str) + Send + Sync + 'static,
            {
                self.event_listeners.add(move |event| {
                    if let RetryEvent::Converted { service, .. } = event {
                        f(service);
                    }
                });
                self
            }

            /// Registers a callback invoked when an eligible error is left
            /// unclassified because it is unrecoverable or excluded. Only the
            /// opt-in policy skips; the trigger policy converts every error.
            ///
            /// # Callback Signature
            /// `Fn(&str, SkipReason)` - the service and why it was skipped.
            pub fn on_skipped<F>(mut self, f: F) -> Self
            where
                F: Fn(&str, crate::events::SkipReason) + Send + Sync + 'static,
            {
                self.event_listeners.add(move |event| {
                    if let RetryEvent::Skipped {
                        service, reason, ..
                    } = event
                    {
                        f(service, *reason);
                    }
                });
                self
            }
        }
    };
}

/// Configuration for [`RetryRegistration`].
#[derive(Clone)]
pub struct RegistrationConfig {
    pub(crate) exclusions: Vec<Regex>,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
}

/// Builder for [`RetryRegistration`].
pub struct RegistrationConfigBuilder {
    exclusions: Vec<Regex>,
    name: String,
    event_listeners: EventListeners<RetryEvent>,
}

impl RegistrationConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            exclusions: Vec::new(),
            name: "retry-registration".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Never converts errors whose message matches `pattern`.
    ///
    /// Patterns are searched, not anchored. May be called repeatedly.
    pub fn exclude_message(mut self, pattern: Regex) -> Self {
        self.exclusions.push(pattern);
        self
    }

    /// Sets the name of this processor instance.
    ///
    /// Default: "retry-registration"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds the processor.
    pub fn build(self) -> RetryRegistration {
        RetryRegistration::new(RegistrationConfig {
            exclusions: self.exclusions,
            name: self.name,
            event_listeners: self.event_listeners,
        })
    }
}

impl Default for RegistrationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

event_callbacks!(RegistrationConfigBuilder);

/// Configuration for [`RetryTrigger`].
#[derive(Clone)]
pub struct TriggerConfig {
    pub(crate) include: ServicePattern,
    pub(crate) exclude: Option<ServicePattern>,
    pub(crate) detector: Arc<dyn WorkerDetector>,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
}

/// Builder for [`RetryTrigger`].
pub struct TriggerConfigBuilder {
    include: ServicePattern,
    exclude: Option<ServicePattern>,
    detector: Arc<dyn WorkerDetector>,
    name: String,
    event_listeners: EventListeners<RetryEvent>,
}

impl TriggerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            include: ServicePattern::any(),
            exclude: None,
            detector: Arc::new(ScheduledWorkerDetector::new()),
            name: "retry-trigger".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Services eligible for conversion.
    ///
    /// Default: every service
    pub fn include_pattern(mut self, pattern: ServicePattern) -> Self {
        self.include = pattern;
        self
    }

    /// Services never converted, even when included.
    ///
    /// Default: none
    pub fn exclude_pattern(mut self, pattern: ServicePattern) -> Self {
        self.exclude = Some(pattern);
        self
    }

    /// How background workers are recognised.
    ///
    /// Default: [`ScheduledWorkerDetector`] honouring the `scheduled` flag
    pub fn worker_detector<P>(mut self, detector: P) -> Self
    where
        P: WorkerDetector + 'static,
    {
        self.detector = Arc::new(detector);
        self
    }

    /// Sets the name of this processor instance.
    ///
    /// Default: "retry-trigger"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds the processor.
    pub fn build(self) -> RetryTrigger {
        RetryTrigger::new(TriggerConfig {
            include: self.include,
            exclude: self.exclude,
            detector: self.detector,
            name: self.name,
            event_listeners: self.event_listeners,
        })
    }
}

impl Default for TriggerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

event_callbacks!(TriggerConfigBuilder);
