//! Middleware pipeline run before final dispatch.
//!
//! Middleware form a chain of responsibility. Each one receives the shared
//! request/response pair plus a single-use [`Next`] continuation and may act
//! before and after running it:
//!
//! ```text
//! Request → MW1 ─next→ MW2 ─next→ final handler (route dispatch)
//!            ↑           ↑                 │
//!            └─ after ───┴──── after ──────┘
//! ```
//!
//! Contract:
//! - Middleware run strictly in registration order, one at a time.
//! - `Next` is consumed by [`Next::run`], so a continuation cannot run twice.
//! - A middleware that neither runs `next` nor writes a response fails the
//!   request with [`Error::ContinuationSkipped`](crate::core::Error::ContinuationSkipped).
//!   Writing a response and skipping `next` is a legitimate short-circuit.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use tokio_accounts::core::{Request, Response, Result};
//! use tokio_accounts::middleware::{Middleware, Next};
//!
//! struct RequireApiKey;
//!
//! #[async_trait]
//! impl Middleware for RequireApiKey {
//!     fn name(&self) -> &'static str { "api_key" }
//!
//!     async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> Result<()> {
//!         if req.header("x-api-key").is_none() {
//!             return res.status(http::StatusCode::UNAUTHORIZED).send("missing key");
//!         }
//!         next.run(req, res).await
//!     }
//! }
//! ```

mod chain;

pub mod json_body;

pub use chain::{run_pipeline, MiddlewareChain, Next};

use async_trait::async_trait;

use crate::core::{Request, Response, Result};

/// Trait for implementing middleware.
///
/// Middleware hold no per-request state; they communicate through the
/// request, its [`Context`](crate::core::Context) and the response.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Unique name for this middleware (used for logging/debugging).
    fn name(&self) -> &'static str;

    /// Process the request, running `next` to continue the chain.
    async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> Result<()>;
}
