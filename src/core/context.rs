//! Per-request context shared across middleware and handlers.

use std::any::Any;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Instant;

/// Request-scoped data carried through the middleware pipeline:
/// - Client information (IP, request ID)
/// - Timing information
/// - Custom key-value storage for middleware communication
pub struct Context {
    /// Client IP address.
    pub client_ip: IpAddr,

    /// Request ID for log correlation.
    pub request_id: String,

    /// Request start time.
    pub started_at: Instant,

    /// Custom key-value storage for middleware.
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    /// Create a context for a request from `client_ip`.
    ///
    /// Uses the propagated request ID when present, otherwise generates one.
    pub fn new(client_ip: IpAddr, request_id: Option<&str>) -> Self {
        let request_id = match request_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_request_id(),
        };

        Self {
            client_ip,
            request_id,
            started_at: Instant::now(),
            values: HashMap::new(),
        }
    }

    /// Set a custom value.
    #[inline]
    pub fn set<T: Send + Sync + 'static>(&mut self, key: &str, value: T) {
        self.values.insert(key.to_string(), Box::new(value));
    }

    /// Get a custom value.
    #[inline]
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    /// Remove a custom value.
    #[inline]
    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        self.values
            .remove(key)
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Get elapsed time in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), None)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("client_ip", &self.client_ip)
            .field("request_id", &self.request_id)
            .field("values", &self.values.len())
            .finish()
    }
}

/// Generate a short request ID (12 hex chars).
#[inline]
pub fn generate_request_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}
