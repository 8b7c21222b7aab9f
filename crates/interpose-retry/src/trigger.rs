//! Blanket retry classification for background work.

use crate::config::{TriggerConfig, TriggerConfigBuilder};
use crate::events::{RetryEvent, RetryPolicy};
use interpose_core::{
    BasicProcessor, Chain, Invocation, InvocationError, Lifecycle, ManagedProcessor, Processor,
    Result,
};
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Dispatch priority of [`RetryTrigger`]; outside [`RetryRegistration`](crate::RetryRegistration).
pub const TRIGGER_PRIORITY: i32 = -200;

/// Wraps every error leaving an eligible background invocation as
/// recoverable.
///
/// An invocation is eligible when the worker detector reports a background
/// worker, its service matches the include pattern and does not match the
/// exclude pattern. Unrecoverable errors are wrapped too; the cause stays
/// reachable through [`InvocationError::cause`].
pub struct RetryTrigger {
    config: TriggerConfig,
    lifecycle: Lifecycle,
}

impl RetryTrigger {
    pub(crate) fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Creates a configuration builder.
    pub fn builder() -> TriggerConfigBuilder {
        TriggerConfigBuilder::new()
    }

    /// Returns true if errors from `invocation` would be converted.
    pub fn is_eligible(&self, invocation: &Invocation) -> bool {
        let service = invocation.service();
        self.config.include.matches(service)
            && !self
                .config
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.matches(service))
            && self.config.detector.is_background(invocation)
    }
}

impl BasicProcessor for RetryTrigger {
    type Frame = bool;

    fn frame(&self, invocation: &Invocation) -> bool {
        self.is_eligible(invocation)
    }

    fn catch(
        &self,
        eligible: &mut bool,
        invocation: &mut Invocation,
        error: InvocationError,
    ) -> InvocationError {
        if !*eligible || error.is_recoverable() {
            return error;
        }

        tracing::debug!(
            service = invocation.service(),
            policy = %RetryPolicy::Trigger,
            "error classified as recoverable"
        );

        #[cfg(feature = "metrics")]
        counter!("retry_conversions_total", "policy" => RetryPolicy::Trigger.as_str()).increment(1);

        self.config.event_listeners.emit(&RetryEvent::Converted {
            processor_name: self.config.name.clone(),
            timestamp: Instant::now(),
            service: invocation.service().to_string(),
            policy: RetryPolicy::Trigger,
        });
        error.into_recoverable()
    }
}

impl Processor for RetryTrigger {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> i32 {
        TRIGGER_PRIORITY
    }

    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        self.run(chain, invocation)
    }
}

impl ManagedProcessor for RetryTrigger {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
