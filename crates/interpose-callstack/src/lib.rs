//! Call-stack diagnostics for interpose.
//!
//! [`CallStackProcessor`] keeps, for every thread with an in-flight
//! invocation, a stack of [`CallFrame`]s describing the nested services it is
//! executing. Each frame holds a depth- and length-bounded copy of the
//! invocation's input, so a snapshot of a stuck or slow thread shows what it
//! was asked to do without copying arbitrarily large payloads.
//!
//! # Example
//!
//! ```rust
//! use interpose_callstack::CallStackConfig;
//! use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new();
//! let callstack = Arc::new(
//!     CallStackConfig::builder()
//!         .max_depth(2)
//!         .max_length(10)
//!         .build(),
//! );
//! callstack.start(&dispatcher);
//!
//! let handle = Arc::clone(&callstack);
//! let executor = move |_: &mut Invocation| -> Result<()> {
//!     let report = handle.snapshot();
//!     assert_eq!(report.threads[0].frames[0].service, "orders.Create");
//!     Ok(())
//! };
//! dispatcher
//!     .dispatch(&executor, &mut Invocation::new("orders.Create", DataBag::new()))
//!     .unwrap();
//!
//! assert_eq!(callstack.registry().active_threads(), 0);
//! assert_eq!(callstack.registry().invocations_started(), 1);
//! ```

pub mod clone;
pub mod config;
pub mod events;
pub mod processor;
pub mod registry;

pub use clone::{bounded_clone, CloneLimits, DEPTH_PLACEHOLDER, TRUNCATION_KEY};
pub use config::{CallStackConfig, CallStackConfigBuilder};
pub use events::CallStackEvent;
pub use processor::{CallStackProcessor, Tracking, CALLSTACK_PRIORITY};
pub use registry::{
    CallFrame, CallStackRegistry, CallStackSnapshot, FrameSnapshot, ThreadStackSnapshot,
};
