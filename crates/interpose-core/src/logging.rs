//! Invocation logging processor.

use crate::basic::BasicProcessor;
use crate::chain::{Chain, Processor};
use crate::error::{InvocationError, Result};
use crate::invocation::Invocation;
use crate::lifecycle::{Lifecycle, ManagedProcessor};
use crate::pattern::ServicePattern;
use tracing::Level;

/// Emits a `tracing` event at a level chosen at runtime.
#[macro_export]
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {{
        let level: ::tracing::Level = $level;
        if level == ::tracing::Level::ERROR {
            ::tracing::error!($($arg)+)
        } else if level == ::tracing::Level::WARN {
            ::tracing::warn!($($arg)+)
        } else if level == ::tracing::Level::INFO {
            ::tracing::info!($($arg)+)
        } else if level == ::tracing::Level::DEBUG {
            ::tracing::debug!($($arg)+)
        } else {
            ::tracing::trace!($($arg)+)
        }
    }};
}

/// Dispatch priority of [`LoggingProcessor`]; it runs outermost.
pub const LOGGING_PRIORITY: i32 = -1000;

/// Configuration for [`LoggingProcessor`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub(crate) pattern: ServicePattern,
    pub(crate) top_service_only: bool,
    pub(crate) level: Level,
}

impl LoggingConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> LoggingConfigBuilder {
        LoggingConfigBuilder::new()
    }
}

/// Builder for [`LoggingConfig`].
#[derive(Debug, Clone)]
pub struct LoggingConfigBuilder {
    pattern: ServicePattern,
    top_service_only: bool,
    level: Level,
}

impl LoggingConfigBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - pattern: every service
    /// - top_service_only: false
    /// - level: INFO
    pub fn new() -> Self {
        Self {
            pattern: ServicePattern::any(),
            top_service_only: false,
            level: Level::INFO,
        }
    }

    /// Only log services matching `pattern`.
    pub fn service_pattern(mut self, pattern: ServicePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Only log outermost invocations.
    pub fn top_service_only(mut self, top_only: bool) -> Self {
        self.top_service_only = top_only;
        self
    }

    /// Level used for entry and exit events. Failures are always logged at
    /// WARN or the configured level, whichever is more severe.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Builds the processor.
    pub fn build(self) -> LoggingProcessor {
        LoggingProcessor {
            config: LoggingConfig {
                pattern: self.pattern,
                top_service_only: self.top_service_only,
                level: self.level,
            },
            lifecycle: Lifecycle::new(),
        }
    }
}

impl Default for LoggingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs entry, exit and failure of matching invocations.
#[derive(Debug)]
pub struct LoggingProcessor {
    config: LoggingConfig,
    lifecycle: Lifecycle,
}

impl LoggingProcessor {
    /// Creates a builder.
    pub fn builder() -> LoggingConfigBuilder {
        LoggingConfigBuilder::new()
    }

    fn enabled_for(&self, invocation: &Invocation) -> bool {
        (!self.config.top_service_only || invocation.is_top_level())
            && self.config.pattern.matches(invocation.service())
    }

    fn failure_level(&self) -> Level {
        // Level orders more verbose as greater.
        if self.config.level < Level::WARN {
            self.config.level
        } else {
            Level::WARN
        }
    }
}

impl BasicProcessor for LoggingProcessor {
    type Frame = bool;

    fn frame(&self, invocation: &Invocation) -> bool {
        self.enabled_for(invocation)
    }

    fn before(&self, enabled: &mut bool, invocation: &mut Invocation) -> Result<()> {
        if *enabled {
            log_at!(
                self.config.level,
                service = invocation.service(),
                depth = invocation.depth(),
                user = invocation.caller().user.as_deref().unwrap_or("-"),
                "invocation started"
            );
        }
        Ok(())
    }

    fn after(&self, enabled: &mut bool, invocation: &mut Invocation) -> Result<()> {
        if *enabled {
            log_at!(
                self.config.level,
                service = invocation.service(),
                elapsed_ms = invocation.started().elapsed().as_millis() as u64,
                outputs = invocation.output.len(),
                "invocation completed"
            );
        }
        Ok(())
    }

    fn catch(
        &self,
        enabled: &mut bool,
        invocation: &mut Invocation,
        error: InvocationError,
    ) -> InvocationError {
        if *enabled {
            log_at!(
                self.failure_level(),
                service = invocation.service(),
                elapsed_ms = invocation.started().elapsed().as_millis() as u64,
                classification = ?error.classification(),
                error = %error,
                "invocation failed"
            );
        }
        error
    }
}

impl Processor for LoggingProcessor {
    fn name(&self) -> &str {
        "logging"
    }

    fn priority(&self) -> i32 {
        LOGGING_PRIORITY
    }

    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        self.run(chain, invocation)
    }
}

impl ManagedProcessor for LoggingProcessor {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
