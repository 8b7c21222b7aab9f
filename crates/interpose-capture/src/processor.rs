use crate::config::{CaptureConfig, CaptureConfigBuilder, CaptureSettings};
use crate::events::CaptureEvent;
use crate::sink::{AsyncCaptureSink, ShutdownReport};
use crate::task::{CaptureKind, CaptureTask, FileStem};
use arc_swap::ArcSwap;
use interpose_core::{
    epoch_millis, BasicProcessor, Chain, DataBag, Dispatcher, Invocation, Lifecycle,
    ManagedProcessor, Processor, Result,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

#[cfg(feature = "metrics")]
use metrics::counter;

/// Dispatch priority of [`CaptureProcessor`].
pub const CAPTURE_PRIORITY: i32 = -400;

/// Where the output of a captured invocation goes. Fixed at entry so a
/// settings change mid-invocation keeps both files together.
#[derive(Debug)]
pub struct PendingOutput {
    directory: PathBuf,
    stem: FileStem,
}

/// Captures the input and output of matching invocations.
pub struct CaptureProcessor {
    config: CaptureConfig,
    settings: ArcSwap<CaptureSettings>,
    sink: AsyncCaptureSink,
    process_start: u64,
    sequence: AtomicU64,
    lifecycle: Lifecycle,
}

impl CaptureProcessor {
    pub(crate) fn new(config: CaptureConfig) -> Self {
        let sink = AsyncCaptureSink::new(Arc::clone(&config.store), config.queue_capacity)
            .with_events(config.name.clone(), config.event_listeners.clone());
        Self {
            settings: ArcSwap::from_pointee(config.settings.clone()),
            sink,
            process_start: epoch_millis(SystemTime::now()),
            sequence: AtomicU64::new(0),
            lifecycle: Lifecycle::new(),
            config,
        }
    }

    /// Creates a configuration builder.
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::new()
    }

    /// Current settings.
    pub fn settings(&self) -> Arc<CaptureSettings> {
        self.settings.load_full()
    }

    /// Replaces the settings. Invocations already in flight finish with the
    /// directory they started with.
    pub fn update_settings(&self, settings: CaptureSettings) {
        tracing::debug!(
            enabled = settings.enabled,
            directory = %settings.directory.display(),
            "capture settings updated"
        );
        self.settings.store(Arc::new(settings));
    }

    /// The sink captures are queued on.
    pub fn sink(&self) -> &AsyncCaptureSink {
        &self.sink
    }

    /// Deregisters from `dispatcher` and stops the sink, waiting up to
    /// `timeout` for queued captures. Returns an empty report if the
    /// processor was not running.
    pub fn shutdown(self: &Arc<Self>, dispatcher: &Dispatcher, timeout: Duration) -> ShutdownReport {
        let this: Arc<dyn Processor> = Arc::clone(self) as Arc<dyn Processor>;
        let mut report = ShutdownReport::default();
        self.lifecycle.stop_with(|| {
            dispatcher.deregister(&this);
            report = self.sink.stop(timeout);
        });
        report
    }

    fn submit(&self, directory: PathBuf, file_name: String, contents: DataBag) {
        let task = CaptureTask::new(directory, file_name, contents);
        let file_name = task.file_name().to_string();
        if let Err(e) = self.sink.submit(task) {
            tracing::warn!(file = %file_name, error = %e, "capture dropped");

            #[cfg(feature = "metrics")]
            counter!("capture_tasks_total", "result" => "rejected").increment(1);

            self.config.event_listeners.emit(&CaptureEvent::Rejected {
                processor_name: self.config.name.clone(),
                timestamp: Instant::now(),
                file_name,
                reason: e.as_str(),
            });
        }
    }
}

impl BasicProcessor for CaptureProcessor {
    type Frame = Option<PendingOutput>;

    fn frame(&self, invocation: &Invocation) -> Option<PendingOutput> {
        let settings = self.settings.load();
        if !settings.enabled || !settings.pattern.matches(invocation.service()) {
            return None;
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Some(PendingOutput {
            directory: settings.directory.clone(),
            stem: FileStem::new(
                &settings.host_name,
                self.process_start,
                sequence,
                invocation.started_at_millis(),
                invocation.service(),
            ),
        })
    }

    fn before(&self, pending: &mut Option<PendingOutput>, invocation: &mut Invocation) -> Result<()> {
        if let Some(pending) = pending {
            self.submit(
                pending.directory.clone(),
                pending.stem.file_name(CaptureKind::Input),
                invocation.input.clone(),
            );
        }
        Ok(())
    }

    fn finally(&self, pending: Option<PendingOutput>, invocation: &mut Invocation) {
        if let Some(pending) = pending {
            self.submit(
                pending.directory,
                pending.stem.file_name(CaptureKind::Output),
                invocation.output.clone(),
            );
        }
    }
}

impl Processor for CaptureProcessor {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> i32 {
        CAPTURE_PRIORITY
    }

    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        self.run(chain, invocation)
    }
}

impl ManagedProcessor for CaptureProcessor {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn on_start(&self) {
        if let Err(e) = self.sink.start() {
            tracing::error!(error = %e, "capture worker failed to start; captures will be dropped");
        }
    }

    fn on_stop(&self) {
        self.sink.stop(self.config.shutdown_timeout);
    }
}
