//! Server configuration.

use std::time::Duration;

use super::parse::{env_duration, env_parse};
use super::ConfigError;

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen port on 0.0.0.0 (default: 3000, 0 picks a free port).
    pub port: u16,
    /// Upper bound on one request's middleware + handler run (default: 30s).
    /// `None` when PIPELINE_DEADLINE is off or zero.
    pub pipeline_deadline: Option<Duration>,
    /// Graceful shutdown drain timeout.
    pub drain_timeout: Duration,
    /// Time allowed for a client to send the request head.
    pub header_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = env_parse("PORT", 3000)?;
        let pipeline_deadline = env_duration("PIPELINE_DEADLINE", "30s")?;
        let drain_timeout_secs: u64 = env_parse("DRAIN_TIMEOUT_SECS", 30)?;
        let header_timeout_secs: u64 = env_parse("HEADER_TIMEOUT_SECS", 5)?;

        if header_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "HEADER_TIMEOUT_SECS".into(),
                message: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            port,
            pipeline_deadline,
            drain_timeout: Duration::from_secs(drain_timeout_secs),
            header_timeout: Duration::from_secs(header_timeout_secs),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            pipeline_deadline: Some(Duration::from_secs(30)),
            drain_timeout: Duration::from_secs(30),
            header_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.pipeline_deadline, Some(Duration::from_secs(30)));
        assert_eq!(config.drain_timeout, Duration::from_secs(30));
        assert_eq!(config.header_timeout, Duration::from_secs(5));
    }
}
