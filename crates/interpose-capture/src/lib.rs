//! Invocation capture for interpose.
//!
//! [`CaptureProcessor`] records the input of every matching invocation when
//! it enters the chain and its output when it leaves, as pretty-printed JSON
//! files named
//!
//! ```text
//! {host}_{processStart}_{sequence}_{invocationStart}_{service}_input
//! {host}_{processStart}_{sequence}_{invocationStart}_{service}_output
//! ```
//!
//! Files are never written on the invocation thread. Captures are queued on a
//! bounded channel and persisted by a dedicated worker thread running its own
//! single-threaded tokio runtime; when the queue is full the capture is
//! dropped with a warning rather than slowing the caller down.
//!
//! Stopping the processor drains the queue for up to the configured shutdown
//! timeout, then cancels what is left and reports the tally.
//!
//! # Example
//!
//! ```rust,no_run
//! use interpose_capture::CaptureProcessor;
//! use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let dispatcher = Dispatcher::new();
//! let capture = Arc::new(
//!     CaptureProcessor::builder()
//!         .directory("/var/tmp/captures")
//!         .queue_capacity(256)
//!         .on_rejected(|file, reason| eprintln!("dropped {file}: {reason}"))
//!         .build(),
//! );
//! capture.start(&dispatcher);
//!
//! let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
//! dispatcher
//!     .dispatch(&ok, &mut Invocation::new("orders.Create", DataBag::new()))
//!     .unwrap();
//!
//! let report = capture.shutdown(&dispatcher, Duration::from_secs(2));
//! println!("{} written, {} cancelled", report.written, report.cancelled);
//! ```
//!
//! # Custom stores
//!
//! Implement [`CaptureStore`] to send captures somewhere other than the
//! local filesystem; the worker awaits each store call in order.

pub mod config;
pub mod error;
pub mod events;
pub mod processor;
pub mod sink;
pub mod store;
pub mod task;

pub use config::{
    default_host_name, CaptureConfig, CaptureConfigBuilder, CaptureSettings,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use error::{CaptureError, Result};
pub use events::CaptureEvent;
pub use processor::{CaptureProcessor, PendingOutput, CAPTURE_PRIORITY};
pub use sink::{AsyncCaptureSink, ShutdownReport, DEFAULT_QUEUE_CAPACITY, WORKER_THREAD_NAME};
pub use store::{CaptureStore, FileStore};
pub use task::{sanitize, CaptureKind, CaptureTask, FileStem};
