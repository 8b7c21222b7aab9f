//! Host-side ordered dispatch list.

use crate::chain::{Chain, Processor, ServiceExecutor};
use crate::error::Result;
use crate::invocation::{ContextKey, Invocation};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Separator between service names in a call-stack signature.
pub const SIGNATURE_SEPARATOR: char = '>';

type ProcessorList = Vec<Arc<dyn Processor>>;

/// Ordered list of processors every invocation is driven through.
///
/// The list is swapped atomically on registration changes, so an invocation
/// keeps the processors it started with even if a processor is stopped while
/// it is in flight. The dispatcher also tracks, per context, the names of the
/// active invocations to derive call-stack signatures and nesting depth.
pub struct Dispatcher {
    processors: ArcSwap<ProcessorList>,
    paths: DashMap<ContextKey, Vec<Arc<str>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no processors.
    pub fn new() -> Self {
        Self {
            processors: ArcSwap::from_pointee(Vec::new()),
            paths: DashMap::new(),
        }
    }

    /// Adds a processor, ordered by [`Processor::priority`]. Processors with
    /// equal priority keep registration order. Registering the same instance
    /// twice has no effect.
    ///
    /// Returns true if the processor was added.
    pub fn register(&self, processor: Arc<dyn Processor>) -> bool {
        let mut added = false;
        self.processors.rcu(|current| {
            added = false;
            if current.iter().any(|p| same_processor(p, &processor)) {
                return ProcessorList::clone(current);
            }
            let mut next = ProcessorList::clone(current);
            let at = next
                .iter()
                .position(|p| p.priority() > processor.priority())
                .unwrap_or(next.len());
            next.insert(at, Arc::clone(&processor));
            added = true;
            next
        });
        if added {
            tracing::debug!(processor = processor.name(), "processor registered");
        }
        added
    }

    /// Removes a processor instance. Returns true if it was registered.
    pub fn deregister(&self, processor: &Arc<dyn Processor>) -> bool {
        let mut removed = false;
        self.processors.rcu(|current| {
            let next: ProcessorList = current
                .iter()
                .filter(|p| !same_processor(p, processor))
                .cloned()
                .collect();
            removed = next.len() != current.len();
            next
        });
        if removed {
            tracing::debug!(processor = processor.name(), "processor deregistered");
        }
        removed
    }

    /// The registered processors, outermost first.
    pub fn processors(&self) -> Arc<Vec<Arc<dyn Processor>>> {
        self.processors.load_full()
    }

    /// Names of the registered processors, outermost first.
    pub fn processor_names(&self) -> Vec<String> {
        self.processors
            .load()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Number of registered processors.
    pub fn len(&self) -> usize {
        self.processors.load().len()
    }

    /// Returns true if no processor is registered.
    pub fn is_empty(&self) -> bool {
        self.processors.load().is_empty()
    }

    /// Number of contexts with at least one invocation in flight.
    pub fn active_contexts(&self) -> usize {
        self.paths.len()
    }

    /// Drives `invocation` through every registered processor and then
    /// `executor`.
    pub fn dispatch(&self, executor: &dyn ServiceExecutor, invocation: &mut Invocation) -> Result<()> {
        let owner = ContextKey::current();
        let (signature, depth) = self.enter(owner, invocation.service_arc());
        invocation.enter(owner, signature, depth);
        let _path = PathGuard {
            dispatcher: self,
            owner,
        };

        let processors = self.processors.load_full();
        Chain::new(&processors, executor).proceed(invocation)
    }

    fn enter(&self, owner: ContextKey, service: Arc<str>) -> (Arc<str>, usize) {
        let mut path = self.paths.entry(owner).or_default();
        path.push(service);
        let depth = path.len() - 1;
        let signature = join_signature(&path);
        (signature, depth)
    }

    fn exit(&self, owner: ContextKey) {
        let now_empty = match self.paths.get_mut(&owner) {
            Some(mut path) => {
                path.pop();
                path.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.paths.remove_if(&owner, |_, path| path.is_empty());
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("processors", &self.processor_names())
            .field("active_contexts", &self.paths.len())
            .finish()
    }
}

// Pops the context path on every exit, including unwinding.
struct PathGuard<'a> {
    dispatcher: &'a Dispatcher,
    owner: ContextKey,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.dispatcher.exit(self.owner);
    }
}

fn join_signature(path: &[Arc<str>]) -> Arc<str> {
    let mut signature = String::new();
    for (i, name) in path.iter().enumerate() {
        if i > 0 {
            signature.push(SIGNATURE_SEPARATOR);
        }
        signature.push_str(name);
    }
    Arc::from(signature)
}

fn same_processor(a: &Arc<dyn Processor>, b: &Arc<dyn Processor>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}
