//! Access logging.
//!
//! One INFO event with target `access` per request, emitted by the
//! dispatcher once the response is final, so failed requests carry the
//! status the exception filters chose.

use crate::core::{Request, Response};

/// Log a completed request.
pub(crate) fn log_request(req: &Request, res: &Response) {
    let ctx = req.context();
    let status = res.status_code().as_u16();

    tracing::info!(
        target: "access",
        method = %req.method(),
        path = %req.path(),
        query = req.query(),
        status = status,
        bytes = res.body_len() as u64,
        duration_ms = ctx.elapsed_ms(),
        ip = %ctx.client_ip,
        ua = req.header("user-agent"),
        request_id = %ctx.request_id,
        "{} {} {}",
        req.method(),
        req.path(),
        status
    );
}
