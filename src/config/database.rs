//! Storage configuration.

use super::parse::env_or;
use super::ConfigError;

/// SQLite location used for the in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Database configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:` (default).
    pub path: String,
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            path: env_or("DATABASE_PATH", IN_MEMORY),
        })
    }

    /// Check if the database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: IN_MEMORY.to_string(),
        }
    }
}
