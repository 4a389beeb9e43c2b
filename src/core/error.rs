//! Core error types.

use std::fmt;
use std::time::Duration;

use http::StatusCode;

/// Boxed collaborator error carried by [`Error::Upstream`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised anywhere on the dispatch path.
///
/// Every variant reaching the server boundary is handed to the exception
/// filter chain exactly once.
#[derive(Debug)]
pub enum Error {
    /// No route matched method + path.
    NotFound { method: String, path: String },

    /// Request body could not be decoded.
    MalformedInput(String),

    /// Explicit HTTP failure raised by a handler or middleware.
    Status { status: StatusCode, message: String },

    /// Classified fault raised by a collaborator (conflict, unauthorized, ...).
    ///
    /// Filters recognise the concrete type with [`Error::downcast_ref`].
    Upstream(BoxError),

    /// A middleware returned without running its continuation and without
    /// writing a response.
    ContinuationSkipped { middleware: &'static str },

    /// The pipeline did not complete before the per-request deadline.
    Stalled { after: Duration },

    /// A terminal write was attempted on an already finalized response.
    ResponseAlreadySent,

    /// The pipeline completed but nothing wrote a response.
    ResponseNotWritten,

    /// A handler or middleware panicked.
    Panicked(String),

    /// I/O error.
    Io(std::io::Error),

    /// Transport error.
    Hyper(hyper::Error),
}

impl Error {
    /// Wrap a collaborator error.
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Upstream(Box::new(err))
    }

    /// Build an explicit status failure.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Error::Status {
            status,
            message: message.into(),
        }
    }

    /// Downcast an upstream error to its concrete type.
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Error::Upstream(inner) => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Check if this error is a not-found failure.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error is a body decoding failure.
    #[inline]
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Error::MalformedInput(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { method, path } => write!(f, "no route for {} {}", method, path),
            Error::MalformedInput(msg) => write!(f, "malformed input: {}", msg),
            Error::Status { status, message } => write!(f, "{}: {}", status, message),
            Error::Upstream(e) => write!(f, "{}", e),
            Error::ContinuationSkipped { middleware } => write!(
                f,
                "middleware '{}' returned without calling next or writing a response",
                middleware
            ),
            Error::Stalled { after } => {
                write!(f, "request pipeline stalled after {}ms", after.as_millis())
            }
            Error::ResponseAlreadySent => write!(f, "response already finalized"),
            Error::ResponseNotWritten => write!(f, "pipeline completed without writing a response"),
            Error::Panicked(msg) => write!(f, "handler panicked: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Hyper(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Upstream(e) => Some(e.as_ref()),
            Error::Io(e) => Some(e),
            Error::Hyper(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Error::Hyper(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedInput(e.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
