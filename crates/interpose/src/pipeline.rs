//! One-stop construction and lifecycle of every processor.

use crate::settings::{Settings, SettingsError};
use interpose_callstack::CallStackProcessor;
use interpose_capture::{default_host_name, CaptureProcessor, CaptureSettings, ShutdownReport};
use interpose_core::{Dispatcher, LoggingProcessor, ManagedProcessor};
use interpose_rest::{Codec, RestNegotiator};
use interpose_retry::{RetryRegistration, RetryTrigger};
use interpose_stats::StatisticsProcessor;
use std::sync::Arc;
use std::time::Duration;

/// Every interpose processor, built from one [`Settings`] and started or
/// stopped together.
///
/// ```
/// use interpose::{Interpose, Settings};
/// use interpose_core::{DataBag, Dispatcher, Invocation, Result};
/// use interpose_rest::{CodecError, MediaType};
/// use std::time::Duration;
///
/// let codec = |_: &MediaType, _: &DataBag| -> std::result::Result<Vec<u8>, CodecError> {
///     Ok(b"{}".to_vec())
/// };
/// let interpose = Interpose::from_settings(&Settings::default(), codec).unwrap();
/// let dispatcher = Dispatcher::new();
/// interpose.start(&dispatcher);
///
/// let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
/// dispatcher
///     .dispatch(&ok, &mut Invocation::new("orders.Create", DataBag::new()))
///     .unwrap();
/// assert_eq!(interpose.statistics().snapshot().services.len(), 1);
///
/// interpose.stop(&dispatcher, Duration::from_secs(1));
/// assert!(dispatcher.is_empty());
/// ```
pub struct Interpose {
    logging: Arc<LoggingProcessor>,
    callstack: Arc<CallStackProcessor>,
    statistics: Arc<StatisticsProcessor>,
    capture: Arc<CaptureProcessor>,
    rest: Arc<RestNegotiator>,
    trigger: Arc<RetryTrigger>,
    registration: Arc<RetryRegistration>,
}

impl Interpose {
    /// Builds every processor. Nothing is registered until
    /// [`Interpose::start`].
    pub fn from_settings<C>(settings: &Settings, codec: C) -> Result<Self, SettingsError>
    where
        C: Codec + 'static,
    {
        settings.validate()?;
        let pattern = settings.service_pattern()?;
        let level = settings.level()?;
        let limits = settings.limits()?;

        let logging = LoggingProcessor::builder()
            .service_pattern(pattern.clone())
            .top_service_only(settings.top_service_only)
            .level(level)
            .build();

        let callstack = CallStackProcessor::builder()
            .service_pattern(pattern.clone())
            .max_depth(limits.max_depth)
            .max_length(limits.max_length)
            .build();

        let statistics = StatisticsProcessor::builder()
            .service_pattern(pattern.clone())
            .build();

        let defaults = CaptureSettings::default();
        let capture = CaptureProcessor::builder()
            .service_pattern(pattern)
            .directory(settings.directory.clone().unwrap_or(defaults.directory))
            .enabled(settings.capture_enabled)
            .host_name(settings.host_name.clone().unwrap_or_else(default_host_name))
            .queue_capacity(settings.queue_capacity)
            .build();

        let rest = RestNegotiator::builder(codec).logging_level(level).build();

        let mut trigger = RetryTrigger::builder().include_pattern(settings.include_pattern()?);
        if let Some(exclude) = settings.exclude_pattern()? {
            trigger = trigger.exclude_pattern(exclude);
        }

        let registration = settings
            .exclusions()?
            .into_iter()
            .fold(RetryRegistration::builder(), |builder, re| builder.exclude_message(re))
            .build();

        Ok(Self {
            logging: Arc::new(logging),
            callstack: Arc::new(callstack),
            statistics: Arc::new(statistics),
            capture: Arc::new(capture),
            rest: Arc::new(rest),
            trigger: Arc::new(trigger.build()),
            registration: Arc::new(registration),
        })
    }

    /// Starts every processor and registers it with `dispatcher`. Returns
    /// true if any processor changed state.
    pub fn start(&self, dispatcher: &Dispatcher) -> bool {
        let started = [
            self.logging.start(dispatcher),
            self.callstack.start(dispatcher),
            self.statistics.start(dispatcher),
            self.capture.start(dispatcher),
            self.rest.start(dispatcher),
            self.trigger.start(dispatcher),
            self.registration.start(dispatcher),
        ];
        let changed = started.iter().any(|s| *s);
        if changed {
            tracing::info!(processors = dispatcher.len(), "interpose started");
        }
        changed
    }

    /// Deregisters every processor, then stops capture, waiting up to
    /// `timeout` for queued captures.
    pub fn stop(&self, dispatcher: &Dispatcher, timeout: Duration) -> ShutdownReport {
        self.registration.stop(dispatcher);
        self.trigger.stop(dispatcher);
        self.rest.stop(dispatcher);
        let report = self.capture.shutdown(dispatcher, timeout);
        self.statistics.stop(dispatcher);
        self.callstack.stop(dispatcher);
        self.logging.stop(dispatcher);
        tracing::info!(
            written = report.written,
            cancelled = report.cancelled,
            "interpose stopped"
        );
        report
    }

    /// Applies the capture-related options of `settings` to the running
    /// capture processor.
    pub fn reconfigure_capture(&self, settings: &Settings) -> Result<(), SettingsError> {
        let current = self.capture.settings();
        let next = CaptureSettings {
            pattern: settings.service_pattern()?,
            directory: settings
                .directory
                .clone()
                .unwrap_or_else(|| current.directory.clone()),
            enabled: settings.capture_enabled,
            host_name: settings
                .host_name
                .clone()
                .unwrap_or_else(|| current.host_name.clone()),
        };
        self.capture.update_settings(next);
        Ok(())
    }

    pub fn logging(&self) -> &Arc<LoggingProcessor> {
        &self.logging
    }

    pub fn callstack(&self) -> &Arc<CallStackProcessor> {
        &self.callstack
    }

    pub fn statistics(&self) -> &Arc<StatisticsProcessor> {
        &self.statistics
    }

    pub fn capture(&self) -> &Arc<CaptureProcessor> {
        &self.capture
    }

    /// The negotiator services call [`RestNegotiator::register`] on.
    pub fn rest(&self) -> &Arc<RestNegotiator> {
        &self.rest
    }

    pub fn trigger(&self) -> &Arc<RetryTrigger> {
        &self.trigger
    }

    /// The processor services call [`RetryRegistration::register`] on.
    pub fn registration(&self) -> &Arc<RetryRegistration> {
        &self.registration
    }
}
