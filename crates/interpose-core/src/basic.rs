//! Hook-based processor template.
//!
//! Most processors follow the same shape: do something before delegating,
//! something after, react to errors and always clean up. [`BasicProcessor`]
//! provides that shape once so implementors only override the hooks they
//! need:
//!
//! ```text
//! frame -> before -> chain -> after
//!             \________\________\___ catch (on error)
//!                                    finally (always, last)
//! ```
//!
//! A processor implements [`Processor`](crate::Processor) by forwarding to
//! [`BasicProcessor::run`].
//!
//! # Examples
//!
//! ```
//! use interpose_core::{BasicProcessor, Chain, DataBag, Dispatcher, Invocation, Processor, Result};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct CountCompletions(AtomicUsize);
//!
//! impl BasicProcessor for CountCompletions {
//!     type Frame = ();
//!
//!     fn finally(&self, _frame: (), _invocation: &mut Invocation) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! impl Processor for CountCompletions {
//!     fn name(&self) -> &str {
//!         "count-completions"
//!     }
//!
//!     fn process(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
//!         self.run(chain, invocation)
//!     }
//! }
//!
//! let counter = Arc::new(CountCompletions::default());
//! let dispatcher = Dispatcher::new();
//! dispatcher.register(counter.clone());
//!
//! let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
//! dispatcher.dispatch(&ok, &mut Invocation::new("a", DataBag::new())).unwrap();
//! assert_eq!(counter.0.load(Ordering::SeqCst), 1);
//! ```

use crate::chain::Chain;
use crate::error::{InvocationError, Result};
use crate::invocation::Invocation;
use std::panic::{self, AssertUnwindSafe};

/// Template decomposing [`Processor::process`](crate::Processor::process)
/// into hooks.
pub trait BasicProcessor: Send + Sync {
    /// Per-invocation state shared between the hooks.
    type Frame: Default;

    /// Creates the frame for one invocation. Defaults to `Frame::default()`.
    fn frame(&self, _invocation: &Invocation) -> Self::Frame {
        Self::Frame::default()
    }

    /// Runs before delegating to the chain.
    fn before(&self, _frame: &mut Self::Frame, _invocation: &mut Invocation) -> Result<()> {
        Ok(())
    }

    /// Runs after the chain completed successfully.
    fn after(&self, _frame: &mut Self::Frame, _invocation: &mut Invocation) -> Result<()> {
        Ok(())
    }

    /// Runs when `before`, the chain or `after` failed. The returned error
    /// replaces the original; the default returns it unchanged.
    fn catch(
        &self,
        _frame: &mut Self::Frame,
        _invocation: &mut Invocation,
        error: InvocationError,
    ) -> InvocationError {
        error
    }

    /// Runs last on every exit path, including a panic unwinding out of the
    /// chain (the panic resumes afterwards).
    fn finally(&self, _frame: Self::Frame, _invocation: &mut Invocation) {}

    /// Drives the hooks around `chain`.
    fn run(&self, chain: Chain<'_>, invocation: &mut Invocation) -> Result<()> {
        let mut frame = self.frame(invocation);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.before(&mut frame, invocation)?;
            chain.proceed(invocation)?;
            self.after(&mut frame, invocation)
        }));

        match outcome {
            Ok(Ok(())) => {
                self.finally(frame, invocation);
                Ok(())
            }
            Ok(Err(error)) => {
                let error = self.catch(&mut frame, invocation, error);
                self.finally(frame, invocation);
                Err(error)
            }
            Err(payload) => {
                self.finally(frame, invocation);
                panic::resume_unwind(payload)
            }
        }
    }
}
