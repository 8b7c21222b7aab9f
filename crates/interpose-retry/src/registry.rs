//! Opt-in retry registrations.

use dashmap::DashMap;
use interpose_core::{ContextKey, Invocation};
use std::sync::Arc;

/// Thread to service-name markers of services that declared themselves
/// retryable.
///
/// Each thread holds at most one registration; a nested registration
/// replaces the outer one, so the innermost frame consumes it first.
#[derive(Debug, Default)]
pub struct RetryRegistry {
    entries: DashMap<ContextKey, Arc<str>>,
}

impl RetryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `invocation`'s service is retryable on its thread.
    pub fn register(&self, invocation: &Invocation) {
        self.entries
            .insert(invocation.owner(), invocation.service_arc());
    }

    /// Returns true if `owner` is registered for exactly `service`.
    pub fn is_registered(&self, owner: ContextKey, service: &str) -> bool {
        self.entries
            .get(&owner)
            .is_some_and(|registered| &**registered == service)
    }

    /// Removes the registration iff it is `(owner, service)`. Returns true
    /// if it was removed.
    pub fn consume(&self, owner: ContextKey, service: &str) -> bool {
        self.entries
            .remove_if(&owner, |_, registered| &**registered == service)
            .is_some()
    }

    /// Number of threads holding a registration.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every registration.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
