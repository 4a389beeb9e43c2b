//! Registration and login over HTTP.

use crate::helpers::*;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_returns_created_user_without_password() {
    let server = TestServer::start().await;
    let resp = server.register("ada@example.com", "secret123").await;

    assert_status(&resp, StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["dateOfBirth"], "1815-12-10");
    assert!(body["id"].is_i64());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let server = TestServer::start().await;
    server.register("ada@example.com", "secret123").await;

    let resp = server.register("ada@example.com", "another1").await;

    assert_status(&resp, StatusCode::CONFLICT);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "User with email ada@example.com already exists");
}

#[tokio::test]
async fn test_register_invalid_payload_is_unprocessable() {
    let server = TestServer::start().await;
    let resp = server
        .post_json("/register", &json!({"email": "not-an-email", "password": "12"}))
        .await;

    assert_status(&resp, StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    let errors = body["errors"].as_array().expect("errors array");
    assert!(!errors.is_empty());
    assert!(errors.contains(&json!("email must be an email")));
}

#[tokio::test]
async fn test_login_returns_all_users() {
    let server = TestServer::start().await;
    server.register("ada@example.com", "secret123").await;
    server.register("alan@example.com", "enigma42").await;

    let resp = server
        .post_json(
            "/login",
            &json!({"email": "ada@example.com", "password": "secret123"}),
        )
        .await;

    assert_status(&resp, StatusCode::OK);
    let body = json_body(resp).await;
    let users = body.as_array().expect("user list");
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let server = TestServer::start().await;
    server.register("ada@example.com", "secret123").await;

    let resp = server
        .post_json(
            "/login",
            &json!({"email": "ada@example.com", "password": "wrong-password"}),
        )
        .await;

    assert_status(&resp, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await, json!({"error": "Invalid credentials"}));
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let server = TestServer::start().await;
    let resp = server
        .post_json(
            "/login",
            &json!({"email": "ghost@example.com", "password": "secret123"}),
        )
        .await;

    assert_status(&resp, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_invalid_payload_is_unprocessable() {
    let server = TestServer::start().await;
    let resp = server.post_json("/login", &json!({"email": "nope"})).await;

    assert_status(&resp, StatusCode::UNPROCESSABLE_ENTITY);
}
