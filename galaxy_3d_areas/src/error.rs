//! Error types for the Galaxy3D area system
//!
//! Mutations and queries have no recoverable failure path: misuse of an area id
//! is a contract violation and panics. Only construction-time configuration and
//! checked group lookups report errors through this type.

use std::fmt;

/// Result type for Galaxy3D area system operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D area system errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The area system configuration is inconsistent (sizes, band, quotas)
    InvalidConfig(String),

    /// A group key does not refer to a live group
    InvalidGroup(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidGroup(msg) => write!(f, "Invalid group: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
