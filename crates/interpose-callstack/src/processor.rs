use crate::config::{CallStackConfig, CallStackConfigBuilder};
use crate::events::CallStackEvent;
use crate::registry::{CallStackRegistry, CallStackSnapshot};
use interpose_core::{
    BasicProcessor, Chain, Invocation, InvocationError, Lifecycle, ManagedProcessor, Processor,
    Result,
};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Dispatch priority of [`CallStackProcessor`]; just inside logging.
pub const CALLSTACK_PRIORITY: i32 = -900;

/// Records every matching invocation on its thread's call stack.
pub struct CallStackProcessor {
    config: CallStackConfig,
    registry: Arc<CallStackRegistry>,
    lifecycle: Lifecycle,
}

impl CallStackProcessor {
    pub(crate) fn new(config: CallStackConfig) -> Self {
        Self {
            registry: Arc::new(CallStackRegistry::new(config.limits)),
            config,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Creates a configuration builder.
    pub fn builder() -> CallStackConfigBuilder {
        CallStackConfigBuilder::new()
    }

    /// The registry this processor records into.
    pub fn registry(&self) -> &Arc<CallStackRegistry> {
        &self.registry
    }

    /// Diagnostics report over every thread with an in-flight invocation.
    pub fn snapshot(&self) -> CallStackSnapshot {
        self.registry.snapshot()
    }
}

/// Per-invocation state: whether the frame was pushed and whether the
/// outcome has been recorded.
#[derive(Debug, Default)]
pub struct Tracking {
    tracked: bool,
    settled: bool,
}

impl CallStackProcessor {
    fn record_failure(&self, invocation: &Invocation) {
        self.registry.record_failure();

        #[cfg(feature = "metrics")]
        counter!("interpose_invocation_errors_total", "processor" => self.config.name.clone())
            .increment(1);

        if !self.config.event_listeners.is_empty() {
            self.config.event_listeners.emit(&CallStackEvent::InvocationFailed {
                processor_name: self.config.name.clone(),
                timestamp: Instant::now(),
                service: invocation.service().to_string(),
                elapsed: invocation.started().elapsed(),
            });
        }
    }
}

impl BasicProcessor for CallStackProcessor {
    type Frame = Tracking;

    fn frame(&self, invocation: &Invocation) -> Tracking {
        Tracking {
            tracked: self.config.pattern.matches(invocation.service()),
            settled: false,
        }
    }

    fn before(&self, frame: &mut Tracking, invocation: &mut Invocation) -> Result<()> {
        if !frame.tracked {
            return Ok(());
        }

        let depth = self.registry.push(invocation);

        #[cfg(feature = "metrics")]
        counter!("interpose_invocations_total", "processor" => self.config.name.clone())
            .increment(1);

        if !self.config.event_listeners.is_empty() {
            self.config.event_listeners.emit(&CallStackEvent::FramePushed {
                processor_name: self.config.name.clone(),
                timestamp: Instant::now(),
                service: invocation.service().to_string(),
                depth,
            });
        }
        Ok(())
    }

    fn after(&self, frame: &mut Tracking, _invocation: &mut Invocation) -> Result<()> {
        frame.settled = true;
        Ok(())
    }

    fn catch(
        &self,
        frame: &mut Tracking,
        invocation: &mut Invocation,
        error: InvocationError,
    ) -> InvocationError {
        if frame.tracked {
            frame.settled = true;
            self.record_failure(invocation);
        }
        error
    }

    fn finally(&self, frame: Tracking, invocation: &mut Invocation) {
        if !frame.tracked {
            return;
        }
        // Neither after nor catch ran: the chain is unwinding.
        if !frame.settled {
            self.record_failure(invocation);
        }
        self.registry.pop(invocation.owner());
    }
}

impl Processor for CallStackProcessor {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> i32 {
        CALLSTACK_PRIORITY
    }

    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        self.run(chain, invocation)
    }
}

impl ManagedProcessor for CallStackProcessor {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn on_start(&self) {
        tracing::debug!(processor = %self.config.name, "call-stack recording started");
    }

    fn on_stop(&self) {
        self.registry.clear();
        tracing::debug!(processor = %self.config.name, "call-stack recording stopped");
    }
}
