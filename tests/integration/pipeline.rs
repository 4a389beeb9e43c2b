//! Dispatch pipeline behaviour: routing misses, decode failures and the
//! internal faults that must end in a generic 500.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use tokio_accounts::config::Config;
use tokio_accounts::core::{Request, Response, Result};
use tokio_accounts::middleware::{Middleware, Next};
use tokio_accounts::server::{Handler, Server};

use crate::helpers::*;

struct Ping;

#[async_trait]
impl Handler for Ping {
    async fn call(&self, _req: &mut Request, res: &mut Response) -> Result<()> {
        res.send("pong")
    }
}

struct Explode;

#[async_trait]
impl Handler for Explode {
    async fn call(&self, _req: &mut Request, _res: &mut Response) -> Result<()> {
        panic!("handler exploded");
    }
}

struct Hang;

#[async_trait]
impl Handler for Hang {
    async fn call(&self, _req: &mut Request, res: &mut Response) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        res.send("too late")
    }
}

/// Returns without continuing on `/skip`.
struct SkipOnPath;

#[async_trait]
impl Middleware for SkipOnPath {
    fn name(&self) -> &'static str {
        "skip_on_path"
    }

    async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> Result<()> {
        if req.path() == "/skip" {
            return Ok(());
        }
        next.run(req, res).await
    }
}

fn with_test_routes(server: &mut Server) {
    server
        .router_mut()
        .add_route("GET", "/ping", Ping)
        .add_route("GET", "/boom", Explode)
        .add_route("GET", "/hang", Hang)
        .add_route("GET", "/skip", Ping);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = TestServer::start().await;
    let resp = server.get("/nowhere").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_has_header(&resp, "x-request-id");
    assert_eq!(json_body(resp).await, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn test_wrong_method_is_not_found() {
    let server = TestServer::start().await;
    let resp = server.get("/register").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let server = TestServer::start().await;
    let resp = server
        .post_raw("/register", "application/json", "{\"email\": ")
        .await;

    assert_status(&resp, StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.starts_with("Malformed JSON body"), "got {}", message);
}

#[tokio::test]
async fn test_non_json_body_is_not_decoded() {
    let server = TestServer::start().await;
    let resp = server
        .post_raw("/register", "text/plain", "email=ada@example.com")
        .await;

    assert_status(&resp, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_panic_is_internal_error_and_server_survives() {
    let server = TestServer::start_with(Config::default(), with_test_routes).await;

    assert_internal_error(server.get("/boom").await).await;

    let resp = server.get("/ping").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "pong");
}

#[tokio::test]
async fn test_stalled_pipeline_is_internal_error() {
    let mut config = Config::default();
    config.server.pipeline_deadline = Some(Duration::from_millis(200));
    let server = TestServer::start_with(config, with_test_routes).await;

    assert_internal_error(server.get("/hang").await).await;
}

#[tokio::test]
async fn test_skipped_continuation_is_internal_error() {
    let server = TestServer::start_with(Config::default(), |server| {
        with_test_routes(server);
        server.use_middleware(SkipOnPath);
    })
    .await;

    assert_internal_error(server.get("/skip").await).await;
    assert_status(&server.get("/ping").await, StatusCode::OK);
}
