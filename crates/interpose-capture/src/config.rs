//! Configuration for the capture processor.

use crate::events::CaptureEvent;
use crate::processor::CaptureProcessor;
use crate::sink::DEFAULT_QUEUE_CAPACITY;
use crate::store::{CaptureStore, FileStore};
use interpose_core::{EventListeners, ServicePattern};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default time `stop` waits for queued captures.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings read on every invocation. They can be replaced while the
/// processor runs with [`CaptureProcessor::update_settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    /// Services to capture.
    pub pattern: ServicePattern,
    /// Directory capture files are written to.
    pub directory: PathBuf,
    /// Master switch.
    pub enabled: bool,
    /// Host name prefixed to file names.
    pub host_name: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            pattern: ServicePattern::any(),
            directory: std::env::temp_dir().join("interpose-capture"),
            enabled: true,
            host_name: default_host_name(),
        }
    }
}

/// The `HOSTNAME` environment variable, then `/etc/hostname`, then
/// `localhost`.
pub fn default_host_name() -> String {
    pick_host_name(
        std::env::var("HOSTNAME").ok(),
        std::fs::read_to_string("/etc/hostname").ok(),
    )
}

fn pick_host_name(env: Option<String>, file: Option<String>) -> String {
    [env, file]
        .into_iter()
        .flatten()
        .map(|h| h.trim().to_string())
        .find(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Configuration for [`CaptureProcessor`].
#[derive(Clone)]
pub struct CaptureConfig {
    pub(crate) settings: CaptureSettings,
    pub(crate) queue_capacity: usize,
    pub(crate) shutdown_timeout: Duration,
    pub(crate) store: Arc<dyn CaptureStore>,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<CaptureEvent>,
}

impl CaptureConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::new()
    }
}

/// Builder for [`CaptureConfig`].
pub struct CaptureConfigBuilder {
    settings: CaptureSettings,
    queue_capacity: usize,
    shutdown_timeout: Duration,
    store: Arc<dyn CaptureStore>,
    name: String,
    event_listeners: EventListeners<CaptureEvent>,
}

impl CaptureConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            settings: CaptureSettings::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            store: Arc::new(FileStore),
            name: "capture".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Only capture services matching `pattern`.
    ///
    /// Default: every service
    pub fn service_pattern(mut self, pattern: ServicePattern) -> Self {
        self.settings.pattern = pattern;
        self
    }

    /// Directory capture files are written to.
    ///
    /// Default: `interpose-capture` under the system temp directory
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.settings.directory = directory.into();
        self
    }

    /// Enables or disables capturing.
    ///
    /// Default: true
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.settings.enabled = enabled;
        self
    }

    /// Host name prefixed to file names.
    ///
    /// Default: `$HOSTNAME`, or `localhost`
    pub fn host_name(mut self, host_name: impl Into<String>) -> Self {
        self.settings.host_name = host_name.into();
        self
    }

    /// Captures queued before submissions are rejected.
    ///
    /// Default: 1024
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// How long stopping the processor waits for queued captures.
    ///
    /// Default: 5 seconds
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Where captures are persisted.
    ///
    /// Default: [`FileStore`]
    pub fn store<S>(mut self, store: S) -> Self
    where
        S: CaptureStore,
    {
        self.store = Arc::new(store);
        self
    }

    /// Sets the name of this processor instance.
    ///
    /// Default: "capture"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked on the worker after a capture is
    /// persisted.
    ///
    /// # Callback Signature
    /// `Fn(&str)` - the capture's file name.
    pub fn on_written<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CaptureEvent::Written { file_name, .. } = event {
                f(file_name);
            }
        });
        self
    }

    /// Registers a callback invoked on the worker when persisting fails.
    ///
    /// # Callback Signature
    /// `Fn(&str, &str)` - file name and error message.
    pub fn on_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CaptureEvent::Failed {
                file_name, error, ..
            } = event
            {
                f(file_name, error);
            }
        });
        self
    }

    /// Registers a callback invoked when a capture cannot be queued.
    ///
    /// # Callback Signature
    /// `Fn(&str, &'static str)` - file name and reason (`queue_full` or
    /// `shut_down`).
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &'static str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CaptureEvent::Rejected {
                file_name, reason, ..
            } = event
            {
                f(file_name, reason);
            }
        });
        self
    }

    /// Builds the processor.
    pub fn build(self) -> CaptureProcessor {
        CaptureProcessor::new(CaptureConfig {
            settings: self.settings,
            queue_capacity: self.queue_capacity,
            shutdown_timeout: self.shutdown_timeout,
            store: self.store,
            name: self.name,
            event_listeners: self.event_listeners,
        })
    }
}

impl Default for CaptureConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
