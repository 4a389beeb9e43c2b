//! User domain errors.

use std::fmt;

use crate::core::Error;

/// Failures raised by the user service and its collaborators.
#[derive(Debug)]
pub enum UserError {
    /// Payload failed validation; one message per violated constraint.
    Validation(Vec<String>),

    /// A user with this email is already registered.
    AlreadyExists(String),

    /// Unknown email or wrong password. Deliberately indistinguishable.
    InvalidCredentials,

    /// Storage backend failure.
    Storage(String),

    /// Password hashing or verification failure.
    Hashing(String),
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::Validation(_) => f.write_str("Validation failed"),
            UserError::AlreadyExists(email) => {
                write!(f, "User with email {} already exists", email)
            }
            UserError::InvalidCredentials => f.write_str("Invalid credentials"),
            UserError::Storage(msg) => write!(f, "storage error: {}", msg),
            UserError::Hashing(msg) => write!(f, "password hashing error: {}", msg),
        }
    }
}

impl std::error::Error for UserError {}

impl From<rusqlite::Error> for UserError {
    fn from(e: rusqlite::Error) -> Self {
        UserError::Storage(e.to_string())
    }
}

impl From<UserError> for Error {
    fn from(e: UserError) -> Self {
        Error::upstream(e)
    }
}
