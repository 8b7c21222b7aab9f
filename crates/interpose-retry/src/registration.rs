//! Opt-in retry classification.

use crate::config::{RegistrationConfig, RegistrationConfigBuilder};
use crate::events::{RetryEvent, RetryPolicy, SkipReason};
use crate::registry::RetryRegistry;
use interpose_core::{
    BasicProcessor, Chain, Invocation, InvocationError, Lifecycle, ManagedProcessor, Processor,
    Result,
};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Dispatch priority of [`RetryRegistration`]; inside [`RetryTrigger`](crate::RetryTrigger).
pub const REGISTRATION_PRIORITY: i32 = -100;

/// Converts errors of services that registered themselves as retryable.
///
/// A service calls [`RetryRegistration::register`] with its own invocation.
/// If that invocation then fails, and the thread's registration is still
/// for the same service, the error is wrapped as recoverable unless it is
/// unrecoverable or its message matches an exclusion. The registration is
/// removed whenever the registered frame exits.
pub struct RetryRegistration {
    config: RegistrationConfig,
    registry: Arc<RetryRegistry>,
    lifecycle: Lifecycle,
}

impl RetryRegistration {
    pub(crate) fn new(config: RegistrationConfig) -> Self {
        Self {
            config,
            registry: Arc::new(RetryRegistry::new()),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Creates a configuration builder.
    pub fn builder() -> RegistrationConfigBuilder {
        RegistrationConfigBuilder::new()
    }

    /// Marks `invocation`'s service as retryable for the rest of the
    /// invocation.
    pub fn register(&self, invocation: &Invocation) {
        tracing::debug!(service = invocation.service(), "registered for retry");
        self.registry.register(invocation);
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<RetryRegistry> {
        &self.registry
    }

    fn excluded(&self, error: &InvocationError) -> bool {
        let message = error.fault().message();
        self.config.exclusions.iter().any(|re| re.is_match(message))
    }

    fn emit(&self, event: RetryEvent) {
        self.config.event_listeners.emit(&event);
    }
}

impl BasicProcessor for RetryRegistration {
    type Frame = ();

    fn catch(
        &self,
        _frame: &mut (),
        invocation: &mut Invocation,
        error: InvocationError,
    ) -> InvocationError {
        if !self
            .registry
            .consume(invocation.owner(), invocation.service())
        {
            return error;
        }

        let skipped = if error.is_unrecoverable() {
            Some(SkipReason::Unrecoverable)
        } else if self.excluded(&error) {
            Some(SkipReason::Excluded)
        } else {
            None
        };

        if let Some(reason) = skipped {
            self.emit(RetryEvent::Skipped {
                processor_name: self.config.name.clone(),
                timestamp: Instant::now(),
                service: invocation.service().to_string(),
                policy: RetryPolicy::OptIn,
                reason,
            });
            return error;
        }

        if error.is_recoverable() {
            return error;
        }

        tracing::debug!(
            service = invocation.service(),
            policy = %RetryPolicy::OptIn,
            "error classified as recoverable"
        );

        #[cfg(feature = "metrics")]
        counter!("retry_conversions_total", "policy" => RetryPolicy::OptIn.as_str()).increment(1);

        self.emit(RetryEvent::Converted {
            processor_name: self.config.name.clone(),
            timestamp: Instant::now(),
            service: invocation.service().to_string(),
            policy: RetryPolicy::OptIn,
        });
        error.into_recoverable()
    }

    fn finally(&self, _frame: (), invocation: &mut Invocation) {
        self.registry
            .consume(invocation.owner(), invocation.service());
    }
}

impl Processor for RetryRegistration {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> i32 {
        REGISTRATION_PRIORITY
    }

    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        self.run(chain, invocation)
    }
}

impl ManagedProcessor for RetryRegistration {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn on_stop(&self) {
        self.registry.clear();
    }
}
