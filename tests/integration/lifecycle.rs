//! Listen/close lifecycle.

use reqwest::StatusCode;

use crate::helpers::*;

#[tokio::test]
async fn test_binds_ephemeral_port() {
    let server = TestServer::start().await;

    assert_ne!(server.addr().port(), 0);
    assert_status(&server.get("/nowhere").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_close_refuses_new_connections() {
    let server = TestServer::start().await;
    let port = server.addr().port();

    server.register("ada@example.com", "secret123").await;
    server.close().await;

    let refused = tokio::net::TcpStream::connect(("127.0.0.1", port)).await;
    assert!(refused.is_err(), "listener still accepting after close");
}

#[tokio::test]
async fn test_data_survives_restart_on_same_database() {
    use std::sync::Arc;
    use tokio_accounts::app::build_server_with;
    use tokio_accounts::config::Config;
    use tokio_accounts::users::Argon2Hasher;

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.database.path = dir.path().join("users.db").to_string_lossy().into_owned();
    let hasher = Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap());
    let client = reqwest::Client::new();

    let first = build_server_with(&config, hasher.clone())
        .unwrap()
        .listen(0)
        .await
        .unwrap();
    let resp = client
        .post(format!("http://127.0.0.1:{}/register", first.local_addr().port()))
        .json(&registration("ada@example.com", "secret123"))
        .send()
        .await
        .unwrap();
    assert_status(&resp, StatusCode::CREATED);
    first.close().await.unwrap();

    let second = build_server_with(&config, hasher)
        .unwrap()
        .listen(0)
        .await
        .unwrap();
    let resp = client
        .post(format!("http://127.0.0.1:{}/register", second.local_addr().port()))
        .json(&registration("ada@example.com", "secret123"))
        .send()
        .await
        .unwrap();
    assert_status(&resp, StatusCode::CONFLICT);
    second.close().await.unwrap();
}
