//! HTTP request abstraction for middleware and handlers.

use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use serde_json::Value;

use super::context::Context;
use super::error::Result;

/// Route parameter bindings (name → decoded value).
pub type ParamMap = HashMap<String, String>;

static X_REQUEST_ID: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-request-id"));

/// Unread request body.
#[derive(Debug)]
pub enum RawBody {
    /// Body already in memory.
    Buffered(Bytes),
    /// Body still on the connection.
    Streaming(Incoming),
}

impl RawBody {
    /// Read the whole body.
    pub async fn collect(self) -> Result<Bytes> {
        match self {
            RawBody::Buffered(bytes) => Ok(bytes),
            RawBody::Streaming(body) => Ok(body.collect().await?.to_bytes()),
        }
    }
}

/// HTTP request for middleware and handlers.
///
/// The decoded body slot starts empty and is filled by a body-decoding
/// middleware. Parameters stay empty until route resolution injects them.
///
/// Note: Clone is intentionally not derived; the raw body is single-use.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    raw_body: Option<RawBody>,
    body: Option<Value>,
    params: ParamMap,
    context: Context,
}

impl Request {
    /// Create a request with an in-memory body.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let context = Context::new(
            IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            headers.get(&*X_REQUEST_ID).and_then(|v| v.to_str().ok()),
        );
        Self {
            method,
            uri,
            headers,
            raw_body: Some(RawBody::Buffered(body)),
            body: None,
            params: ParamMap::new(),
            context,
        }
    }

    /// Wrap an incoming transport request.
    pub fn from_hyper(req: http::Request<Incoming>, client_ip: IpAddr) -> Self {
        let (parts, body) = req.into_parts();
        let context = Context::new(
            client_ip,
            parts.headers.get(&*X_REQUEST_ID).and_then(|v| v.to_str().ok()),
        );
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            raw_body: Some(RawBody::Streaming(body)),
            body: None,
            params: ParamMap::new(),
            context,
        }
    }

    /// Get the HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request path (query string excluded).
    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the query string.
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Get the full URI.
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get Content-Type header.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Take the unread body. Returns `None` once taken.
    #[inline]
    pub fn take_raw_body(&mut self) -> Option<RawBody> {
        self.raw_body.take()
    }

    /// Get the decoded body, if a decoding stage populated it.
    #[inline]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Set the decoded body.
    #[inline]
    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Get the route parameters.
    #[inline]
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// Get a single route parameter.
    #[inline]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Replace the route parameters after resolution.
    #[inline]
    pub fn set_params(&mut self, params: ParamMap) {
        self.params = params;
    }

    /// Get the request context.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Get a mutable reference to the request context.
    #[inline]
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}
