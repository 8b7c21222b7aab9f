//! Core infrastructure for interpose.
//!
//! This crate provides the pieces every interception processor builds on:
//! - [`DataBag`] and [`Invocation`], the unit of work flowing through the chain
//! - [`Processor`], [`Chain`] and [`Dispatcher`], the dispatch contract
//! - [`BasicProcessor`], a hook-based processor template
//! - [`ManagedProcessor`] and [`Lifecycle`], idempotent start/stop
//! - [`InvocationError`] and [`Fault`], the shared error taxonomy
//! - [`events`], the observability event system
//! - [`LoggingProcessor`], invocation logging through `tracing`
//! - `layer` (feature `layer`), a tower bridge for async hosts

pub mod bag;
pub mod basic;
pub mod chain;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod exchange;
pub mod invocation;
pub mod lifecycle;
pub mod logging;
pub mod pattern;

#[cfg(feature = "layer")]
pub mod layer;

pub use bag::{DataBag, Value};
pub use basic::BasicProcessor;
pub use chain::{Chain, Processor, ServiceExecutor, DEFAULT_PRIORITY};
pub use dispatcher::{Dispatcher, SIGNATURE_SEPARATOR};
pub use error::{Classification, Fault, FaultKind, InvocationError, Origin, Result};
pub use events::{EventListeners, InterceptEvent};
pub use exchange::{Exchange, ExchangeError, Response};
pub use invocation::{epoch_millis, Caller, ContextKey, Invocation};
pub use lifecycle::{Lifecycle, ManagedProcessor};
pub use logging::{LoggingConfig, LoggingConfigBuilder, LoggingProcessor, LOGGING_PRIORITY};
pub use pattern::ServicePattern;

// Re-exported for hosts building responses.
pub use http::StatusCode;
