//! Runtime server configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use tokio_accounts::server::ServerConfig;
//!
//! let config = ServerConfig::new()
//!     .with_pipeline_deadline(Some(Duration::from_secs(10)))
//!     .with_drain_timeout(Duration::from_secs(5));
//! ```

use std::time::Duration;

/// Server configuration.
///
/// # Environment Variables
///
/// When built from [`crate::config::Config::from_env()`], these environment
/// variables are used:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `PORT` | `3000` | Listen port on 0.0.0.0 |
/// | `PIPELINE_DEADLINE` | `30s` | Per-request pipeline deadline (`off` disables) |
/// | `DRAIN_TIMEOUT_SECS` | `30` | Graceful shutdown timeout |
/// | `HEADER_TIMEOUT_SECS` | `5` | Time to receive the request head |
/// | `ACCESS_LOG` | off | Per-request access events (set via [`ServerConfig::with_access_log`]) |
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Deadline for the whole middleware + handler run of one request.
    pub pipeline_deadline: Option<Duration>,
    /// Graceful shutdown drain timeout
    pub drain_timeout: Duration,
    /// Header read timeout (slowloris protection)
    pub header_timeout: Duration,
    /// Emit one `access` event per request
    pub access_log: bool,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            pipeline_deadline: Some(Duration::from_secs(30)),
            drain_timeout: Duration::from_secs(30),
            header_timeout: Duration::from_secs(5),
            access_log: false,
        }
    }

    pub fn with_pipeline_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.pipeline_deadline = deadline;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn with_header_timeout(mut self, timeout: Duration) -> Self {
        self.header_timeout = timeout;
        self
    }

    pub fn with_access_log(mut self, enabled: bool) -> Self {
        self.access_log = enabled;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&crate::config::ServerConfig> for ServerConfig {
    fn from(env: &crate::config::ServerConfig) -> Self {
        Self::new()
            .with_pipeline_deadline(env.pipeline_deadline)
            .with_drain_timeout(env.drain_timeout)
            .with_header_timeout(env.header_timeout)
    }
}
