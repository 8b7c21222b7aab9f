//! Service-invocation interception pipeline.
//!
//! `interpose` wraps every unit of work a host executes in a chain of
//! processors. The host owns a [`Dispatcher`](core::Dispatcher) and calls
//! `dispatch` for each invocation; processors registered with it observe,
//! reclassify or answer the invocation around the host's executor.
//!
//! # Processors
//!
//! Outermost first:
//!
//! | Processor | Crate | Does |
//! |-----------|-------|------|
//! | `LoggingProcessor` | `interpose-core` | entry/exit logs through `tracing` |
//! | `CallStackProcessor` | `interpose-callstack` | per-thread stacks of bounded input snapshots |
//! | `StatisticsProcessor` | `interpose-stats` | online duration mean/variance per service |
//! | `CaptureProcessor` | `interpose-capture` | input/output files written off-thread |
//! | `RestNegotiator` | `interpose-rest` | content negotiation and error-to-status mapping |
//! | `RetryTrigger` | `interpose-retry` | background-job errors become retryable |
//! | `RetryRegistration` | `interpose-retry` | opt-in retryable errors |
//!
//! Each is usable on its own through its crate; [`Interpose`] builds and
//! manages all of them from one [`Settings`].
//!
//! # Features
//!
//! - `metrics`: counters and histograms through the `metrics` facade
//! - `layer`: `interpose_core::layer::DispatchLayer`, a tower bridge

pub mod pipeline;
pub mod settings;

pub use pipeline::Interpose;
pub use settings::{Settings, SettingsError};

pub use interpose_callstack as callstack;
pub use interpose_capture as capture;
pub use interpose_core as core;
pub use interpose_rest as rest;
pub use interpose_retry as retry;
pub use interpose_stats as stats;
