//! Exception filters mapping failures to responses.
//!
//! Every failure raised while a request moves through the middleware chain,
//! route resolution or a handler ends up here exactly once. Filters form an
//! ordered decision list:
//!
//! ```text
//! Error → filter 1: can_handle? ─no→ filter 2: can_handle? ─no→ ... → fallback (500)
//!                     │ yes                 │ yes
//!                   catch                 catch
//! ```
//!
//! Predicates may overlap. Registration order is the only disambiguation, so
//! broad filters must be registered after the specific ones.

mod chain;

pub use chain::FilterChain;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;

use crate::core::{Error, Request, Response, Result};

/// Predicate plus terminal response writer for a class of failures.
#[async_trait]
pub trait ExceptionFilter: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this filter takes responsibility for `err`.
    fn can_handle(&self, err: &Error) -> bool;

    /// Write the terminal response for `err`.
    async fn catch(&self, err: &Error, req: &Request, res: &mut Response) -> Result<()>;
}

/// Maps the framework's own failures to their HTTP status.
///
/// - [`Error::NotFound`] → 404 `{"error":"Not Found"}`
/// - [`Error::MalformedInput`] → 400 with the decode message
/// - [`Error::Status`] → the carried status and message
///
/// Internal faults (panics, stalls, contract violations) are left to the
/// fallback so their details never reach the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpErrorFilter;

#[async_trait]
impl ExceptionFilter for HttpErrorFilter {
    fn name(&self) -> &'static str {
        "http_error"
    }

    fn can_handle(&self, err: &Error) -> bool {
        matches!(
            err,
            Error::NotFound { .. } | Error::MalformedInput(_) | Error::Status { .. }
        )
    }

    async fn catch(&self, err: &Error, _req: &Request, res: &mut Response) -> Result<()> {
        let (status, message) = match err {
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            Error::MalformedInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Status { status, message } => (*status, message.clone()),
            _ => return Err(Error::status(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())),
        };
        res.status(status).json(&json!({ "error": message }))
    }
}
