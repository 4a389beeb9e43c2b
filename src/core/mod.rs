//! Core types for HTTP request/response handling.
//!
//! This module provides the fundamental types used throughout the middleware
//! pipeline, the router and the exception filters:
//!
//! - [`Request`] - per-call request with decoded body and route parameters
//! - [`Response`] - per-call response, finalized exactly once
//! - [`Context`] - request-scoped data for middleware communication
//! - [`Error`] - failures raised on the dispatch path
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_accounts::core::{Request, Response, Result};
//!
//! async fn show_user(req: &mut Request, res: &mut Response) -> Result<()> {
//!     let id = req.param("id").unwrap_or_default();
//!     res.json(&serde_json::json!({ "id": id }))
//! }
//! ```

mod context;
mod error;
mod request;
mod response;

pub use context::{generate_request_id, Context};
pub use error::{BoxError, Error, Result};
pub use request::{ParamMap, RawBody, Request};
pub use response::Response;
