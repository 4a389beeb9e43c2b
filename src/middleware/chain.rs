//! Middleware chain and continuation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Middleware;
use crate::core::{Error, Request, Response, Result};
use crate::server::routing::{BoxFuture, Handler};

/// Single-use continuation handed to each middleware.
///
/// Running it invokes the next middleware, or the final handler once the
/// chain is exhausted. `run` takes `self`, so a second call does not compile:
///
/// ```compile_fail
/// use tokio_accounts::core::{Request, Response, Result};
/// use tokio_accounts::middleware::Next;
///
/// async fn twice(req: &mut Request, res: &mut Response, next: Next<'_>) -> Result<()> {
///     next.run(req, res).await?;
///     next.run(req, res).await
/// }
/// ```
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Handler,
    invoked: &'a AtomicBool,
}

impl<'a> Next<'a> {
    /// Continue the chain.
    pub async fn run(self, req: &mut Request, res: &mut Response) -> Result<()> {
        self.invoked.store(true, Ordering::Release);
        dispatch(self.remaining, self.endpoint, req, res).await
    }

    /// Number of middleware still ahead of the final handler.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

fn dispatch<'a>(
    chain: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Handler,
    req: &'a mut Request,
    res: &'a mut Response,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let Some((mw, rest)) = chain.split_first() else {
            return endpoint.call(req, res).await;
        };

        let invoked = AtomicBool::new(false);
        let next = Next {
            remaining: rest,
            endpoint,
            invoked: &invoked,
        };
        mw.handle(req, res, next).await?;

        if !invoked.load(Ordering::Acquire) {
            if !res.is_finalized() {
                return Err(Error::ContinuationSkipped {
                    middleware: mw.name(),
                });
            }
            tracing::debug!(
                middleware = mw.name(),
                status = res.status_code().as_u16(),
                "middleware short-circuited request"
            );
        }
        Ok(())
    })
}

/// Run `middlewares` in order, then `final_handler` if every middleware
/// continued.
pub async fn run_pipeline(
    middlewares: &[Arc<dyn Middleware>],
    req: &mut Request,
    res: &mut Response,
    final_handler: &dyn Handler,
) -> Result<()> {
    dispatch(middlewares, final_handler, req, res).await
}

/// Ordered list of middleware.
///
/// Middleware execute in registration order.
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create a new empty middleware chain.
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware to the chain.
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Append a middleware wrapped in Arc to the chain.
    pub fn add_arc(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Append in place.
    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Get the number of middleware in the chain.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Get middleware names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Run the chain with `endpoint` as the final handler.
    pub async fn run(
        &self,
        req: &mut Request,
        res: &mut Response,
        endpoint: &dyn Handler,
    ) -> Result<()> {
        run_pipeline(&self.middlewares, req, res, endpoint).await
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MiddlewareChain {
    fn clone(&self) -> Self {
        Self {
            middlewares: self.middlewares.clone(),
        }
    }
}
