//! Error types for athena-frame.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for connector operations.
#[derive(Error, Debug)]
pub enum AthenaError {
    /// Invalid or missing input (empty profile, malformed output location, bad config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// AWS configuration or credentials could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Athena rejected a request (submission or status check).
    #[error("Service error: {0}")]
    Service(String),

    /// The query execution finished in FAILED or CANCELLED.
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// The result object could not be read from S3.
    #[error("Result not found: {0}")]
    ResultNotFound(String),

    /// The result payload is not valid CSV.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured maximum wait elapsed before the query finished.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Polling was cancelled by the caller.
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl AthenaError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a service error with the given message.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Creates a query execution error with the given message.
    pub fn query_execution(msg: impl Into<String>) -> Self {
        Self::QueryExecution(msg.into())
    }

    /// Creates a result-not-found error with the given message.
    pub fn result_not_found(msg: impl Into<String>) -> Self {
        Self::ResultNotFound(msg.into())
    }

    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Creates a timeout error with the given message.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a cancellation error with the given message.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Connection(_) => "Connection Error",
            Self::Service(_) => "Service Error",
            Self::QueryExecution(_) => "Query Execution Error",
            Self::ResultNotFound(_) => "Result Not Found",
            Self::Parse(_) => "Parse Error",
            Self::Timeout(_) => "Timeout",
            Self::Cancelled(_) => "Cancelled",
        }
    }
}

/// Result type alias using AthenaError.
pub type Result<T> = std::result::Result<T, AthenaError>;
