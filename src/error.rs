//! Error types for the CSQL client.
//!
//! Defines the main error enum used throughout the crate.

use std::time::Duration;
use thiserror::Error;

/// Main error type for CSQL client operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsqlError {
    /// The engine could not be reached, or the socket failed mid-exchange.
    #[error("Connection error: {0}")]
    Connection(String),

    /// No terminator arrived before the deadline.
    #[error("Timeout error: no response terminator within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Write failures and oversized responses.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The statement was rejected before it was sent (empty input, unsafe value).
    #[error("Query error: {0}")]
    Query(String),

    /// The engine replied with error text instead of data.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Configuration errors (invalid config file, bad endpoint, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CsqlError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a timeout error for the given deadline.
    pub fn timeout(deadline: Duration) -> Self {
        Self::Timeout(deadline)
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an engine error with the given message.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Timeout(_) => "Timeout Error",
            Self::Transport(_) => "Transport Error",
            Self::Query(_) => "Query Error",
            Self::Engine(_) => "Engine Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Socket failures while reading a reply.
impl From<std::io::Error> for CsqlError {
    fn from(err: std::io::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

/// Result type alias using CsqlError.
pub type Result<T> = std::result::Result<T, CsqlError>;
