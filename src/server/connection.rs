//! Per-connection and per-request handling.

use std::any::Any;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::FutureExt;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;
use tracing::debug;

use super::access_log;
use super::routing::{Handler, Router};
use crate::core::{Error, Request, Response, Result};
use crate::filter::FilterChain;
use crate::middleware::MiddlewareChain;

/// Check if error is a common connection error that shouldn't be logged.
fn is_connection_error(err_str: &str) -> bool {
    err_str.contains("connection reset")
        || err_str.contains("broken pipe")
        || err_str.contains("Connection reset")
        || err_str.contains("os error 104")
        || err_str.contains("os error 32")
        || err_str.contains("timed out")
        || err_str.contains("HeaderTimeout") // Slowloris protection timeout
}

/// Final handler of the pipeline: resolve the route, inject params, call it.
struct RouteDispatch<'r> {
    router: &'r Router,
}

#[async_trait]
impl<'r> Handler for RouteDispatch<'r> {
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<()> {
        let Some(matched) = self.router.match_route(req.method().as_str(), req.path()) else {
            return Err(Error::NotFound {
                method: req.method().to_string(),
                path: req.path().to_string(),
            });
        };

        req.set_params(matched.params);
        matched.handler.call(req, res).await
    }
}

/// Read-only dispatch state shared by every connection.
///
/// Built once when the server starts listening; nothing in it changes
/// afterwards.
pub struct Dispatcher {
    router: Router,
    middleware: MiddlewareChain,
    filters: FilterChain,
    pipeline_deadline: Option<Duration>,
    access_log: bool,
}

impl Dispatcher {
    pub(crate) fn new(
        router: Router,
        middleware: MiddlewareChain,
        filters: FilterChain,
        pipeline_deadline: Option<Duration>,
        access_log: bool,
    ) -> Self {
        Self {
            router,
            middleware,
            filters,
            pipeline_deadline,
            access_log,
        }
    }

    /// Get the route table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run one request through middleware, routing and the handler.
    ///
    /// Always returns a finalized response. Any failure on the way is handed
    /// to the filter chain exactly once; the access log entry, if enabled,
    /// is written after that with the final status.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let mut res = Response::new();

        let outcome = {
            let endpoint = RouteDispatch {
                router: &self.router,
            };
            let pipeline =
                AssertUnwindSafe(self.middleware.run(&mut req, &mut res, &endpoint)).catch_unwind();

            match self.pipeline_deadline {
                Some(limit) => match tokio::time::timeout(limit, pipeline).await {
                    Ok(result) => result,
                    Err(_) => Ok(Err(Error::Stalled { after: limit })),
                },
                None => pipeline.await,
            }
        };

        let result = match outcome {
            Ok(Ok(())) if res.is_finalized() => Ok(()),
            Ok(Ok(())) => Err(Error::ResponseNotWritten),
            Ok(Err(err)) => Err(err),
            Err(payload) => Err(Error::Panicked(panic_message(payload.as_ref()))),
        };

        if let Err(err) = result {
            if res.is_finalized() {
                tracing::error!(
                    method = %req.method(),
                    path = %req.path(),
                    request_id = %req.context().request_id,
                    status = res.status_code().as_u16(),
                    "error after response was written, keeping response: {}",
                    err
                );
            } else {
                self.filters.handle(&err, &req, &mut res).await;
            }
        }

        res.header("x-request-id", &req.context().request_id);
        if self.access_log {
            access_log::log_request(&req, &res);
        }
        res
    }

    /// Hyper service entry point.
    async fn handle_request(
        &self,
        req: http::Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> std::result::Result<http::Response<Full<Bytes>>, Infallible> {
        let req = Request::from_hyper(req, remote_addr.ip());
        Ok(self.dispatch(req).await.into_http())
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Configure an accepted socket and spawn its HTTP/1.1 connection task.
///
/// The connection is registered with `graceful` so shutdown can wait for it.
pub(crate) fn spawn_connection(
    dispatcher: &Arc<Dispatcher>,
    stream: TcpStream,
    remote_addr: SocketAddr,
    header_timeout: Duration,
    graceful: &GracefulShutdown,
) {
    let _ = stream.set_nodelay(true);

    // Set TCP keepalive
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(5))
        .with_interval(Duration::from_secs(1));
    let sock_ref = SockRef::from(&stream);
    let _ = sock_ref.set_tcp_keepalive(&keepalive);

    let dispatcher = Arc::clone(dispatcher);
    let service = service_fn(move |req| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.handle_request(req, remote_addr).await }
    });

    let conn = http1::Builder::new()
        .timer(TokioTimer::new())
        .header_read_timeout(header_timeout)
        .keep_alive(true)
        .serve_connection(TokioIo::new(stream), service);
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            let err_str = format!("{:?}", err);
            if !is_connection_error(&err_str) {
                debug!("Connection error from {}: {:?}", remote_addr, err);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::HttpErrorFilter;
    use crate::middleware::json_body::JsonBodyMiddleware;
    use crate::middleware::{Middleware, Next};
    use crate::server::routing::handler_fn;
    use http::StatusCode;
    use serde_json::{json, Value};

    /// Never continues and never finishes.
    struct Hang;

    #[async_trait]
    impl Middleware for Hang {
        fn name(&self) -> &'static str {
            "hang"
        }

        async fn handle(&self, _req: &mut Request, _res: &mut Response, _next: Next<'_>) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    /// Returns without continuing or responding.
    struct Forgetful;

    #[async_trait]
    impl Middleware for Forgetful {
        fn name(&self) -> &'static str {
            "forgetful"
        }

        async fn handle(&self, _req: &mut Request, _res: &mut Response, _next: Next<'_>) -> Result<()> {
            Ok(())
        }
    }

    struct Exploding;

    #[async_trait]
    impl Handler for Exploding {
        async fn call(&self, _req: &mut Request, _res: &mut Response) -> Result<()> {
            panic!("handler exploded");
        }
    }

    fn router() -> Router {
        let mut router = Router::new();
        router
            .add_route(
                "GET",
                "/users/:id",
                handler_fn(|req, res| {
                    Box::pin(async move {
                        let id = req.param("id").unwrap_or_default().to_string();
                        res.json(&json!({ "id": id }))
                    })
                }),
            )
            .add_route(
                "POST",
                "/echo",
                handler_fn(|req, res| {
                    Box::pin(async move {
                        let body = req.body().cloned().unwrap_or(Value::Null);
                        res.status(StatusCode::CREATED).json(&body)
                    })
                }),
            )
            .add_route("GET", "/panic", Exploding)
            .add_route(
                "GET",
                "/silent",
                handler_fn(|_req, _res| Box::pin(async move { Ok::<(), Error>(()) })),
            )
            .add_route(
                "GET",
                "/late-failure",
                handler_fn(|_req, res| {
                    Box::pin(async move {
                        res.send("written")?;
                        Err(Error::status(StatusCode::CONFLICT, "too late"))
                    })
                }),
            );
        router
    }

    fn dispatcher(middleware: MiddlewareChain, deadline: Option<Duration>) -> Dispatcher {
        Dispatcher::new(
            router(),
            middleware,
            FilterChain::new().add(HttpErrorFilter),
            deadline,
            false,
        )
    }

    fn request(method: http::Method, uri: &str, body: &'static [u8]) -> Request {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        Request::new(method, uri.parse().unwrap(), headers, Bytes::from_static(body))
    }

    fn json_body(res: &Response) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn test_params_injected_before_handler() {
        let d = dispatcher(MiddlewareChain::new(), None);
        let res = d.dispatch(request(http::Method::GET, "/users/a%20b", b"")).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(json_body(&res), json!({"id": "a b"}));
        assert!(res.get_header("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let d = dispatcher(MiddlewareChain::new(), None);
        let res = d.dispatch(request(http::Method::DELETE, "/users/1", b"")).await;

        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(&res), json!({"error": "Not Found"}));
    }

    #[tokio::test]
    async fn test_decoded_body_reaches_handler() {
        let d = dispatcher(MiddlewareChain::new().add(JsonBodyMiddleware), None);
        let res = d
            .dispatch(request(http::Method::POST, "/echo", br#"{"a":1}"#))
            .await;

        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(json_body(&res), json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let d = dispatcher(MiddlewareChain::new().add(JsonBodyMiddleware), None);
        let res = d.dispatch(request(http::Method::POST, "/echo", b"{")).await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body = json_body(&res);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Malformed JSON body"));
    }

    #[tokio::test]
    async fn test_panic_becomes_generic_500() {
        let d = dispatcher(MiddlewareChain::new(), None);
        let res = d.dispatch(request(http::Method::GET, "/panic", b"")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&res), json!({"error": "Internal Server Error"}));

        // Dispatcher still usable
        let res = d.dispatch(request(http::Method::GET, "/users/1", b"")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handler_without_response_is_500() {
        let d = dispatcher(MiddlewareChain::new(), None);
        let res = d.dispatch(request(http::Method::GET, "/silent", b"")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_skipped_continuation_is_500() {
        let d = dispatcher(MiddlewareChain::new().add(Forgetful), None);
        let res = d.dispatch(request(http::Method::GET, "/users/1", b"")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&res), json!({"error": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn test_hung_middleware_hits_deadline() {
        let d = dispatcher(
            MiddlewareChain::new().add(Hang),
            Some(Duration::from_millis(50)),
        );
        let res = d.dispatch(request(http::Method::GET, "/users/1", b"")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_failure_after_write_keeps_response() {
        let d = dispatcher(MiddlewareChain::new(), None);
        let res = d
            .dispatch(request(http::Method::GET, "/late-failure", b""))
            .await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"written");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
