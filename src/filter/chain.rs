//! Ordered exception filter list with a generic fallback.

use std::sync::Arc;

use http::StatusCode;
use serde_json::json;

use super::ExceptionFilter;
use crate::core::{Error, Request, Response};

/// Ordered list of exception filters.
///
/// Filters are consulted in registration order; the first whose
/// `can_handle` accepts the error writes the response.
pub struct FilterChain {
    filters: Vec<Arc<dyn ExceptionFilter>>,
}

impl FilterChain {
    /// Create a new empty filter chain.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Append a filter to the chain.
    pub fn add<F: ExceptionFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append a filter wrapped in Arc to the chain.
    pub fn add_arc(mut self, filter: Arc<dyn ExceptionFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Append in place.
    pub fn push(&mut self, filter: Arc<dyn ExceptionFilter>) {
        self.filters.push(filter);
    }

    /// Get the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Get filter names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Turn `err` into a terminal response.
    ///
    /// Always leaves `res` finalized, unless it was finalized before the
    /// call, in which case it is left untouched.
    pub async fn handle(&self, err: &Error, req: &Request, res: &mut Response) {
        if let Some(filter) = self.filters.iter().find(|f| f.can_handle(err)) {
            match filter.catch(err, req, res).await {
                Ok(()) if res.is_finalized() => {
                    tracing::debug!(
                        filter = filter.name(),
                        status = res.status_code().as_u16(),
                        request_id = %req.context().request_id,
                        "error handled: {}",
                        err
                    );
                    return;
                }
                Ok(()) => {
                    tracing::error!(
                        filter = filter.name(),
                        request_id = %req.context().request_id,
                        "exception filter returned without writing a response"
                    );
                }
                Err(filter_err) => {
                    tracing::error!(
                        filter = filter.name(),
                        request_id = %req.context().request_id,
                        error = %filter_err,
                        "exception filter failed"
                    );
                }
            }
        }

        Self::fallback(err, req, res);
    }

    /// Log the full error and write a detail-free 500.
    fn fallback(err: &Error, req: &Request, res: &mut Response) {
        tracing::error!(
            method = %req.method(),
            path = %req.path(),
            request_id = %req.context().request_id,
            error = ?err,
            "unhandled error: {}",
            err
        );

        if res.is_finalized() {
            return;
        }
        *res = Response::new();
        if let Err(e) = res
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .json(&json!({ "error": "Internal Server Error" }))
        {
            tracing::error!(error = %e, "failed to write fallback response");
        }
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FilterChain {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}
