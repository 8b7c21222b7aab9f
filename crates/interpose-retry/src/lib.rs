//! Retry classification for interpose.
//!
//! Errors leaving an invocation are classified as recoverable (safe to
//! retry), unrecoverable, or left unclassified. Two independent policies
//! decide when to wrap an error as recoverable:
//!
//! - [`RetryRegistration`]: a service opts in by calling
//!   [`RetryRegistration::register`] with its own invocation. If that same
//!   invocation then fails, the error is converted unless it is
//!   unrecoverable or its message matches an exclusion.
//! - [`RetryTrigger`]: every error leaving an invocation that runs on a
//!   background worker (see [`WorkerDetector`]) and matches the include and
//!   exclude patterns is converted, unrecoverable ones included.
//!
//! The trigger runs outside the opt-in policy; an error matched by both is
//! wrapped once.
//!
//! # Example
//!
//! ```rust
//! use interpose_core::{DataBag, Dispatcher, Fault, Invocation, ManagedProcessor, Result};
//! use interpose_retry::RetryRegistration;
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new();
//! let retry = Arc::new(RetryRegistration::builder().build());
//! retry.start(&dispatcher);
//!
//! let r = Arc::clone(&retry);
//! let service = move |inv: &mut Invocation| -> Result<()> {
//!     r.register(inv);
//!     Err(Fault::general("upstream timed out").into())
//! };
//!
//! let err = dispatcher
//!     .dispatch(&service, &mut Invocation::new("orders.Sync", DataBag::new()))
//!     .unwrap_err();
//! assert!(err.is_recoverable());
//! ```

pub mod config;
pub mod events;
pub mod detector;
pub mod registration;
pub mod registry;
pub mod trigger;

pub use config::{
    RegistrationConfig, RegistrationConfigBuilder, TriggerConfig, TriggerConfigBuilder,
};
pub use events::{RetryEvent, RetryPolicy, SkipReason};
pub use detector::{ScheduledWorkerDetector, WorkerDetector};
pub use registration::{RetryRegistration, REGISTRATION_PRIORITY};
pub use registry::RetryRegistry;
pub use trigger::{RetryTrigger, TRIGGER_PRIORITY};
