//! Tower bridge for hosts built on `tower` services.
//!
//! The interception chain is synchronous: each invocation is driven to
//! completion on one thread. [`DispatchLayer`] lets an async host mount a
//! [`Dispatcher`] in front of a synchronous [`ServiceExecutor`]; every call
//! runs on tokio's blocking pool and resolves to the completed invocation.
//!
//! # Examples
//!
//! ```rust
//! use interpose_core::layer::DispatchLayer;
//! use interpose_core::{DataBag, Dispatcher, Invocation, Result};
//! use std::sync::Arc;
//! use tower::{Layer, Service, ServiceExt};
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Arc::new(Dispatcher::new());
//! let executor = |inv: &mut Invocation| -> Result<()> {
//!     inv.output.insert("echo", inv.input.get("msg").cloned());
//!     Ok(())
//! };
//!
//! let mut service = DispatchLayer::new(dispatcher).layer(executor);
//! let inv = Invocation::new("demo.Echo", DataBag::new().with("msg", "hi"));
//! let done = service.ready().await?.call(inv).await?;
//! assert!(done.output.contains_key("echo"));
//! # Ok(())
//! # }
//! ```

use crate::chain::ServiceExecutor;
use crate::dispatcher::Dispatcher;
use crate::error::{Fault, InvocationError};
use crate::invocation::Invocation;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

/// A Tower layer that drives requests through a [`Dispatcher`].
#[derive(Clone)]
pub struct DispatchLayer {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchLayer {
    /// Creates a layer dispatching through `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl<S> Layer<S> for DispatchLayer {
    type Service = DispatchService<S>;

    fn layer(&self, executor: S) -> Self::Service {
        DispatchService {
            executor: Arc::new(executor),
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

/// Service produced by [`DispatchLayer`].
pub struct DispatchService<S> {
    executor: Arc<S>,
    dispatcher: Arc<Dispatcher>,
}

impl<S> Clone for DispatchService<S> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<S> Service<Invocation> for DispatchService<S>
where
    S: ServiceExecutor + 'static,
{
    type Response = Invocation;
    type Error = InvocationError;
    type Future = BoxFuture<'static, Result<Invocation, InvocationError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, invocation: Invocation) -> Self::Future {
        let executor = Arc::clone(&self.executor);
        let dispatcher = Arc::clone(&self.dispatcher);

        Box::pin(async move {
            let joined = tokio::task::spawn_blocking(move || {
                let mut invocation = invocation;
                dispatcher
                    .dispatch(&*executor, &mut invocation)
                    .map(|()| invocation)
            })
            .await;

            match joined {
                Ok(result) => result,
                Err(join_error) => Err(Fault::internal("dispatch task failed")
                    .with_source(join_error)
                    .into()),
            }
        })
    }
}
