//! The chain-of-responsibility dispatch contract.
//!
//! A [`Processor`] receives the invocation together with a [`Chain`] holding
//! the processors that have not run yet. Calling [`Chain::proceed`] hands the
//! invocation to the next processor, or to the host's [`ServiceExecutor`]
//! once every processor has run. `Chain` is consumed by `proceed`, so a
//! processor can delegate at most once.
//!
//! # Examples
//!
//! ```
//! use interpose_core::{Chain, DataBag, Dispatcher, Invocation, Processor, Result};
//! use std::sync::Arc;
//!
//! struct Stamp;
//!
//! impl Processor for Stamp {
//!     fn name(&self) -> &str {
//!         "stamp"
//!     }
//!
//!     fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
//!         invocation.input.insert("stamped", true);
//!         chain.proceed(invocation)
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register(Arc::new(Stamp));
//!
//! let executor = |inv: &mut Invocation| -> Result<()> {
//!     let stamped = inv.input.contains_key("stamped");
//!     inv.output.insert("saw_stamp", stamped);
//!     Ok(())
//! };
//!
//! let mut inv = Invocation::new("demo.Echo", DataBag::new());
//! dispatcher.dispatch(&executor, &mut inv).unwrap();
//! assert!(inv.output.contains_key("saw_stamp"));
//! ```

use crate::error::Result;
use crate::invocation::Invocation;
use std::sync::Arc;

/// Default priority for processors that do not care about their position.
pub const DEFAULT_PRIORITY: i32 = 0;

/// A link in the interception chain.
pub trait Processor: Send + Sync {
    /// Name used in logs, events and diagnostics.
    fn name(&self) -> &str;

    /// Position in the dispatch list; lower values run further out.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Handles one invocation.
    ///
    /// To let handling continue, delegate to `chain.proceed(invocation)`.
    /// Errors returned by the delegate must be propagated; a processor may
    /// only replace an error with a reclassified one carrying the same
    /// cause, never drop it.
    fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()>;
}

/// The host collaborator that actually runs a service.
pub trait ServiceExecutor: Send + Sync {
    /// Executes the service named by the invocation.
    fn execute(&self, invocation: &mut Invocation) -> Result<()>;
}

impl<F> ServiceExecutor for F
where
    F: Fn(&mut Invocation) -> Result<()> + Send + Sync,
{
    fn execute(&self, invocation: &mut Invocation) -> Result<()> {
        self(invocation)
    }
}

/// The remaining processors for one invocation.
///
/// Each hop hands the next processor a shorter slice; nothing is shared or
/// mutated between invocations.
pub struct Chain<'a> {
    remaining: &'a [Arc<dyn Processor>],
    executor: &'a dyn ServiceExecutor,
}

impl<'a> Chain<'a> {
    /// Creates a chain over `processors` that ends at `executor`.
    pub fn new(processors: &'a [Arc<dyn Processor>], executor: &'a dyn ServiceExecutor) -> Self {
        Self {
            remaining: processors,
            executor,
        }
    }

    /// Number of processors still to run before the executor.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Hands the invocation to the next link.
    pub fn proceed(self, invocation: &mut Invocation) -> Result<()> {
        match self.remaining.split_first() {
            Some((head, rest)) => head.process(
                Chain {
                    remaining: rest,
                    executor: self.executor,
                },
                invocation,
            ),
            None => self.executor.execute(invocation),
        }
    }
}
