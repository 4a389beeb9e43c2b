//! Logging configuration.

use super::parse::{env_opt, env_or};
use super::ConfigError;

/// Default filter when neither LOG_LEVEL nor RUST_LOG is set.
const DEFAULT_FILTER: &str = "tokio_accounts=info";

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line (see [`crate::logging::JsonFormatter`]).
    Json,
    /// Human-readable `tracing-subscriber` fmt output.
    Text,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "fmt" | "pretty" => Ok(LogFormat::Text),
            _ => Err(ConfigError::Invalid {
                key: "LOG_FORMAT".into(),
                message: format!("expected json or text, got '{}'", value),
            }),
        }
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Line format.
    pub format: LogFormat,
    /// Service name for structured logging.
    pub service_name: String,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: tokio_accounts=debug,hyper=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        let filter = resolve_log_filter(
            std::env::var("LOG_LEVEL").ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
        );
        let format = match env_opt("LOG_FORMAT") {
            Some(value) => LogFormat::parse(&value)?,
            None => LogFormat::Text,
        };
        Ok(Self {
            filter,
            format,
            service_name: env_or("SERVICE_NAME", "tokio_accounts"),
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Text,
            service_name: "tokio_accounts".to_string(),
        }
    }
}

/// Resolve the log filter.
///
/// Priority: LOG_LEVEL > RUST_LOG > default (info)
fn resolve_log_filter(log_level: Option<&str>, rust_log: Option<&str>) -> String {
    // 1. LOG_LEVEL (simple: debug, info, warn, error)
    if let Some(level) = log_level {
        let level = level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                return format!("tokio_accounts={}", level);
            }
            _ => {
                // Subscriber is not installed yet
                eprintln!(
                    "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                    level
                );
            }
        }
    }

    // 2. RUST_LOG (full tracing filter syntax)
    if let Some(filter) = rust_log.filter(|f| !f.is_empty()) {
        return filter.to_string();
    }

    // 3. Default
    DEFAULT_FILTER.to_string()
}
