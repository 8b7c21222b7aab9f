//! Invocations that asked for a negotiated REST response.

use dashmap::DashMap;
use interpose_core::{ContextKey, DataBag, Invocation};
use std::sync::Arc;
use std::time::Instant;

/// Marker left by [`RestNegotiator::register`](crate::RestNegotiator::register).
#[derive(Debug, Clone)]
pub struct RestRegistration {
    /// Input of the invocation when it registered.
    pub input: DataBag,
    /// When it registered.
    pub registered_at: Instant,
}

type Key = (ContextKey, Arc<str>);

/// Registrations keyed by thread and call-stack signature.
#[derive(Debug, Default)]
pub struct RestRegistry {
    entries: DashMap<Key, RestRegistration>,
}

impl RestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `invocation`, replacing an earlier registration for the
    /// same signature.
    pub fn register(&self, invocation: &Invocation) {
        self.entries.insert(
            key(invocation),
            RestRegistration {
                input: invocation.input.clone(),
                registered_at: Instant::now(),
            },
        );
    }

    /// Removes and returns the registration for `invocation`.
    pub fn take(&self, invocation: &Invocation) -> Option<RestRegistration> {
        self.entries.remove(&key(invocation)).map(|(_, r)| r)
    }

    /// Returns true if `invocation` is registered.
    pub fn contains(&self, invocation: &Invocation) -> bool {
        self.entries.contains_key(&key(invocation))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

fn key(invocation: &Invocation) -> Key {
    (invocation.owner(), invocation.signature_arc())
}
