//! JSON body decoding middleware.
//!
//! Reads the whole request body when `Content-Type` announces JSON and stores
//! the decoded value in the request's body slot before continuing.

use async_trait::async_trait;

use crate::core::{Error, Request, Response, Result};

use super::{Middleware, Next};

/// Decodes `application/json` bodies into [`serde_json::Value`].
///
/// An empty body leaves the slot empty. A body that fails to parse fails the
/// request with [`Error::MalformedInput`] and the chain stops there.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBodyMiddleware;

impl JsonBodyMiddleware {
    pub fn new() -> Self {
        Self
    }
}

/// Check whether a Content-Type value names JSON (`application/json`,
/// optionally with parameters).
fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case("application/json")
}

#[async_trait]
impl Middleware for JsonBodyMiddleware {
    fn name(&self) -> &'static str {
        "json_body"
    }

    async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> Result<()> {
        if req.content_type().is_some_and(is_json) {
            if let Some(raw) = req.take_raw_body() {
                let bytes = raw.collect().await?;
                if !bytes.is_empty() {
                    let value = serde_json::from_slice(&bytes).map_err(|e| {
                        Error::MalformedInput(format!("Malformed JSON body: {}", e))
                    })?;
                    req.set_body(value);
                }
            }
        }

        next.run(req, res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::MiddlewareChain;
    use crate::server::routing::Handler;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Records the body the final handler observed.
    #[derive(Default)]
    struct Capture {
        seen: Mutex<Option<Option<serde_json::Value>>>,
    }

    #[async_trait]
    impl Handler for Capture {
        async fn call(&self, req: &mut Request, res: &mut Response) -> Result<()> {
            *self.seen.lock().unwrap() = Some(req.body().cloned());
            res.send("ok")
        }
    }

    fn request(content_type: Option<&str>, body: &'static [u8]) -> Request {
        let mut headers = http::HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(http::header::CONTENT_TYPE, ct.parse().unwrap());
        }
        Request::new(
            http::Method::POST,
            "/register".parse().unwrap(),
            headers,
            Bytes::from_static(body),
        )
    }

    async fn run(req: &mut Request, capture: &Capture) -> Result<()> {
        let chain = MiddlewareChain::new().add(JsonBodyMiddleware::new());
        let mut res = Response::new();
        chain.run(req, &mut res, capture).await
    }

    #[test]
    fn test_is_json() {
        assert!(is_json("application/json"));
        assert!(is_json("Application/JSON; charset=utf-8"));
        assert!(!is_json("text/plain"));
        assert!(!is_json("application/jsonp"));
    }

    #[tokio::test]
    async fn test_decodes_json_body() {
        let capture = Capture::default();
        let mut req = request(Some("application/json"), br#"{"email":"a@b.c"}"#);

        run(&mut req, &capture).await.unwrap();

        let seen = capture.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.unwrap()["email"], "a@b.c");
    }

    #[tokio::test]
    async fn test_malformed_json_stops_before_handler() {
        let capture = Capture::default();
        let mut req = request(Some("application/json"), b"{not json");

        let err = run(&mut req, &capture).await.unwrap_err();

        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("Malformed JSON body"));
        assert!(capture.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_json_left_untouched() {
        let capture = Capture::default();
        let mut req = request(Some("text/plain"), b"{not json");

        run(&mut req, &capture).await.unwrap();

        assert_eq!(*capture.seen.lock().unwrap(), Some(None));
        assert!(req.take_raw_body().is_some());
    }

    #[tokio::test]
    async fn test_empty_json_body_leaves_slot_empty() {
        let capture = Capture::default();
        let mut req = request(Some("application/json"), b"");

        run(&mut req, &capture).await.unwrap();

        assert_eq!(*capture.seen.lock().unwrap(), Some(None));
    }
}
