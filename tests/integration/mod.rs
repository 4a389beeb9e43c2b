//! Integration tests for tokio_accounts
//!
//! Each test starts its own server in-process on an ephemeral port and talks
//! to it over real HTTP. Nothing external needs to be running.
//!
//! Run with: cargo test --test integration

mod helpers;

mod lifecycle;
mod pipeline;
mod users_api;
