//! Observation hooks for processors.
//!
//! Each processor crate has an event enum implementing [`InterceptEvent`]
//! and hands it to [`EventListeners`]; the `on_*` builder callbacks are
//! closures filtered down to one variant.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// An event emitted by a processor.
pub trait InterceptEvent: Send + Sync + fmt::Debug {
    /// Variant name, e.g. `"Converted"`.
    fn event_type(&self) -> &'static str;

    fn timestamp(&self) -> Instant;

    /// Name of the emitting processor instance.
    fn processor_name(&self) -> &str;
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Callbacks for one processor's events, cheap to clone.
pub struct EventListeners<E> {
    listeners: Vec<Listener<E>>,
}

impl<E: InterceptEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Adds a callback receiving every event.
    pub fn add<F>(&mut self, listener: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Calls every listener in registration order. Listeners run inside
    /// invocations; a panic is logged and does not reach the invocation or
    /// the remaining listeners.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::warn!(
                    processor = event.processor_name(),
                    event = event.event_type(),
                    "event listener panicked"
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E: InterceptEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}
