//! HTTP response abstraction for middleware and handlers.

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;
use serde::Serialize;

use super::error::{Error, Result};

/// Pre-allocated static header values for the terminal writers.
mod content_types {
    use super::*;
    pub static TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
    pub static APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");
}

/// Mutable HTTP response for one request.
///
/// The status and headers may be changed freely until one of the terminal
/// writers ([`Response::json`] or [`Response::send`]) finalizes the response.
/// A second terminal write fails with [`Error::ResponseAlreadySent`].
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    finalized: bool,
}

impl Response {
    /// Create an unwritten 200 response.
    #[inline]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            finalized: false,
        }
    }

    /// Set the status code.
    #[inline]
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Add a header by string name and value. Invalid pairs are ignored.
    #[inline]
    pub fn header(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Serialize `data` as JSON and finalize the response.
    pub fn json<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<()> {
        self.ensure_writable()?;
        let body = serde_json::to_vec(data).map_err(Error::upstream)?;
        self.finalize(content_types::APPLICATION_JSON.clone(), Bytes::from(body));
        Ok(())
    }

    /// Write a plain-text body and finalize the response.
    pub fn send(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_writable()?;
        self.finalize(
            content_types::TEXT_PLAIN.clone(),
            Bytes::from(text.into()),
        );
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.finalized {
            tracing::error!(
                status = self.status.as_u16(),
                "terminal write attempted on finalized response"
            );
            return Err(Error::ResponseAlreadySent);
        }
        Ok(())
    }

    fn finalize(&mut self, content_type: HeaderValue, body: Bytes) {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.body = body;
        self.finalized = true;
    }

    // Getters

    /// Get the status code.
    #[inline]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get Content-Type header.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.get_header(header::CONTENT_TYPE.as_str())
    }

    /// Get the response body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get body length.
    #[inline]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Check whether a terminal write already happened.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Convert into a transport response.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
