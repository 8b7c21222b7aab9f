use crate::config::{StatisticsConfig, StatisticsConfigBuilder};
use crate::estimator::{StatisticsEstimator, StatisticsSnapshot};
use crate::events::StatisticsEvent;
use interpose_core::{
    BasicProcessor, Chain, Invocation, Lifecycle, ManagedProcessor, Processor, Result,
};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::histogram;

/// Dispatch priority of [`StatisticsProcessor`].
pub const STATISTICS_PRIORITY: i32 = -800;

/// Samples the duration of every matching invocation, in milliseconds.
///
/// Durations are measured from the invocation's start to its completion,
/// whether it succeeded or failed.
pub struct StatisticsProcessor {
    config: StatisticsConfig,
    estimator: Arc<StatisticsEstimator>,
    lifecycle: Lifecycle,
}

impl StatisticsProcessor {
    pub(crate) fn new(config: StatisticsConfig) -> Self {
        Self {
            estimator: Arc::new(StatisticsEstimator::new(config.buffer_capacity)),
            config,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Creates a configuration builder.
    pub fn builder() -> StatisticsConfigBuilder {
        StatisticsConfigBuilder::new()
    }

    /// The estimator samples are recorded into.
    pub fn estimator(&self) -> &Arc<StatisticsEstimator> {
        &self.estimator
    }

    /// Statistics for every sampled service.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        self.estimator.snapshot()
    }
}

impl BasicProcessor for StatisticsProcessor {
    type Frame = bool;

    fn frame(&self, invocation: &Invocation) -> bool {
        self.config.pattern.matches(invocation.service())
    }

    fn finally(&self, sampled: bool, invocation: &mut Invocation) {
        // A stopped processor keeps no entries until the next start.
        if !sampled || !self.lifecycle.is_running() {
            return;
        }
        let elapsed_ms = invocation.started().elapsed().as_secs_f64() * 1000.0;
        self.estimator.record(invocation.service(), elapsed_ms);

        #[cfg(feature = "metrics")]
        histogram!("interpose_service_duration_ms", "service" => invocation.service().to_string())
            .record(elapsed_ms);
    }
}

impl Processor for StatisticsProcessor {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> i32 {
        STATISTICS_PRIORITY
    }

    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        self.run(chain, invocation)
    }
}

impl ManagedProcessor for StatisticsProcessor {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn on_start(&self) {
        self.estimator.reset();
        tracing::debug!(processor = %self.config.name, "statistics sampling started");
        self.config
            .event_listeners
            .emit(&StatisticsEvent::SamplingStarted {
                processor_name: self.config.name.clone(),
                timestamp: Instant::now(),
            });
    }

    fn on_stop(&self) {
        let services = self.estimator.len();
        self.estimator.clear();
        tracing::debug!(processor = %self.config.name, services, "statistics sampling stopped");
        self.config
            .event_listeners
            .emit(&StatisticsEvent::SamplingStopped {
                processor_name: self.config.name.clone(),
                timestamp: Instant::now(),
                services,
            });
    }
}
