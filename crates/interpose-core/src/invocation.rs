//! The unit of work flowing through the processor chain.

use crate::bag::DataBag;
use crate::exchange::Exchange;
use std::fmt;
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Identity of the execution context that owns an invocation.
///
/// Per-context registries are keyed by this value instead of relying on
/// thread-local storage. The dispatcher stamps it on every invocation at
/// entry; with OS threads it wraps the thread id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey(ThreadId);

impl ContextKey {
    /// Returns the key of the calling thread.
    pub fn current() -> Self {
        ContextKey(std::thread::current().id())
    }

    /// The underlying thread id.
    pub fn thread_id(&self) -> ThreadId {
        self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Who asked for an invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Caller {
    /// Authenticated user, if any.
    pub user: Option<String>,
    /// Session identifier, if any.
    pub session: Option<String>,
}

impl Caller {
    /// Creates a caller identity.
    pub fn new(user: Option<String>, session: Option<String>) -> Self {
        Self { user, session }
    }

    /// Caller with only a user.
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            session: None,
        }
    }
}

/// One execution of a named service.
pub struct Invocation {
    service: Arc<str>,
    /// Input parameters.
    pub input: DataBag,
    /// Output produced by the service.
    pub output: DataBag,
    caller: Caller,
    owner: ContextKey,
    started_at: SystemTime,
    started: Instant,
    signature: Arc<str>,
    depth: usize,
    scheduled: bool,
    exchange: Option<Arc<dyn Exchange>>,
}

impl Invocation {
    /// Creates an invocation of `service` with the given input.
    pub fn new(service: impl Into<Arc<str>>, input: DataBag) -> Self {
        let service = service.into();
        Self {
            signature: Arc::clone(&service),
            service,
            input,
            output: DataBag::new(),
            caller: Caller::default(),
            owner: ContextKey::current(),
            started_at: SystemTime::now(),
            started: Instant::now(),
            depth: 0,
            scheduled: false,
            exchange: None,
        }
    }

    /// Sets the caller identity.
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = caller;
        self
    }

    /// Marks the invocation as started by a background scheduler.
    pub fn scheduled(mut self, scheduled: bool) -> Self {
        self.scheduled = scheduled;
        self
    }

    /// Attaches the request/response exchange the invocation serves.
    pub fn with_exchange(mut self, exchange: Arc<dyn Exchange>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    /// Fully-qualified service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Shared handle to the service name.
    pub fn service_arc(&self) -> Arc<str> {
        Arc::clone(&self.service)
    }

    /// Caller identity.
    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Context that owns the invocation.
    pub fn owner(&self) -> ContextKey {
        self.owner
    }

    /// Wall-clock start time.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Wall-clock start time in milliseconds since the Unix epoch.
    pub fn started_at_millis(&self) -> u64 {
        epoch_millis(self.started_at)
    }

    /// Monotonic start instant.
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Call-stack signature: the `>`-joined names of every active invocation
    /// on the owning context, outermost first, ending with this one.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Shared handle to the signature.
    pub fn signature_arc(&self) -> Arc<str> {
        Arc::clone(&self.signature)
    }

    /// Nesting depth; zero for the outermost invocation.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns true for the outermost invocation of its context.
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }

    /// Returns true if a background scheduler started this invocation.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// The request/response exchange, if the invocation serves one.
    pub fn exchange(&self) -> Option<&Arc<dyn Exchange>> {
        self.exchange.as_ref()
    }

    /// Called by the dispatcher on entry.
    pub(crate) fn enter(&mut self, owner: ContextKey, signature: Arc<str>, depth: usize) {
        self.owner = owner;
        self.signature = signature;
        self.depth = depth;
        self.started_at = SystemTime::now();
        self.started = Instant::now();
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("service", &self.service)
            .field("signature", &self.signature)
            .field("depth", &self.depth)
            .field("owner", &self.owner)
            .field("caller", &self.caller)
            .field("scheduled", &self.scheduled)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("exchange", &self.exchange.is_some())
            .finish()
    }
}

/// Milliseconds since the Unix epoch, saturating at zero for earlier times.
pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
