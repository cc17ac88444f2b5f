//! Minimal async middleware chain for RPC dispatch.

use crate::context::RpcContext;
use async_trait::async_trait;
use std::sync::Arc;
use tracewire_core::Result;

/// Final stage of the chain: the service method itself.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: &mut RpcContext) -> Result<()>;
}

/// A stage wrapped around the rest of the chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handle the call; `next.run(ctx)` invokes the remaining stages.
    async fn handle(&self, ctx: &mut RpcContext, next: Next<'_>) -> Result<()>;
}

/// The remaining stages after the current middleware.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub fn new(middleware: &'a [Arc<dyn Middleware>], handler: &'a dyn Handler) -> Self {
        Self {
            middleware,
            handler,
        }
    }

    /// Run the next stage and wait for it to complete.
    pub async fn run(self, ctx: &mut RpcContext) -> Result<()> {
        match self.middleware.split_first() {
            Some((first, rest)) => first.handle(ctx, Next::new(rest, self.handler)).await,
            None => self.handler.call(ctx).await,
        }
    }
}

/// Ordered middleware in front of a handler.
#[derive(Clone)]
pub struct Chain {
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
}

impl Chain {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            middleware: Vec::new(),
            handler,
        }
    }

    /// Append a middleware; earlier ones run first.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Dispatch one call through every stage.
    pub async fn dispatch(&self, ctx: &mut RpcContext) -> Result<()> {
        Next::new(&self.middleware, self.handler.as_ref()).run(ctx).await
    }
}
