//! tokio_accounts - user registration and login over a hand-built HTTP core.
//!
//! The interesting part is the dispatch core: each request flows through an
//! ordered middleware chain to a first-match router and a handler, and every
//! failure on that path is turned into a response exactly once by an ordered
//! list of exception filters.
//!
//! # Features
//!
//! - **Single-use continuations**: `Next` is consumed by value; skipped or
//!   stalled continuations are detected at runtime
//! - **Ordered exception filters**: first accepting filter wins, generic 500 fallback
//! - **Panic isolation**: a panicking handler yields a 500, the server keeps serving
//! - **Graceful shutdown**: `close()` drains in-flight connections
//! - **Structured logging**: JSON or text output through `tracing`
//!
//! # Architecture
//!
//! - [`core`] - request/response/context and the error taxonomy
//! - [`server`] - listener, routing and per-request dispatch
//! - [`middleware`] - pipeline plus JSON body and access log stages
//! - [`filter`] - exception filter chain
//! - [`users`] - the user domain (SQLite storage, Argon2id hashing)
//! - [`app`] - composition root
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_accounts::{app, Config};
//!
//! let config = Config::from_env()?;
//! let server = app::build_server(&config)?;
//! let running = server.listen(config.server.port).await?;
//! tokio::signal::ctrl_c().await?;
//! running.close().await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod app;
pub mod config;
pub mod core;
pub mod filter;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod users;

// Re-exports for convenience
pub use config::Config;
pub use server::{RunningServer, Server, ServerConfig};
