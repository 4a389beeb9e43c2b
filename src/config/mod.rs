//! Configuration module for tokio_accounts.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_accounts::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Port: {}", config.server.port);
//! ```

mod database;
mod error;
mod logging;
mod parse;
mod server;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_duration;
pub use server::ServerConfig;

use parse::env_bool;

/// Complete application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Access logging enabled (ACCESS_LOG).
    pub access_log: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            access_log: env_bool("ACCESS_LOG", false),
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Port: {}", self.server.port);
        if self.database.is_in_memory() {
            info!("  Database: in-memory");
        } else {
            info!("  Database: {}", self.database.path);
        }

        match self.server.pipeline_deadline {
            Some(d) => info!("  Pipeline deadline: {}ms", d.as_millis()),
            None => info!("  Pipeline deadline: disabled"),
        }
        info!("  Drain timeout: {}s", self.server.drain_timeout.as_secs());

        if self.access_log {
            info!("  Access log: enabled");
        }
    }
}
