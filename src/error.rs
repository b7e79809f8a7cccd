//! Error types for cypher-cells.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for cypher-cells operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CypherError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (runtime errors, constraint violations, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Pre-flight inspection failed (syntax error, unknown query type, etc.)
    #[error("Classification error: {0}")]
    Classification(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid magic invocation (unknown flag, bad parameters, etc.)
    #[error("Magic error: {0}")]
    Magic(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CypherError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a classification error with the given message.
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a magic usage error with the given message.
    pub fn magic(msg: impl Into<String>) -> Self {
        Self::Magic(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Classification(_) => "Classification Error",
            Self::Config(_) => "Configuration Error",
            Self::Magic(_) => "Magic Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(m)
            | Self::Query(m)
            | Self::Classification(m)
            | Self::Config(m)
            | Self::Magic(m)
            | Self::Internal(m) => m,
        }
    }
}

/// Result type alias using CypherError.
pub type Result<T> = std::result::Result<T, CypherError>;
