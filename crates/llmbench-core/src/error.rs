// Error types for the benchmark harness

use thiserror::Error;

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur while benchmarking
///
/// Provider, HTTP and decode errors only ever surface inside an
/// `OutcomeRecord` as text. Configuration, report and I/O errors end the run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Completion provider returned an error response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Request could not be sent or the connection failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Report or chart generation error
    #[error("Report error: {0}")]
    Report(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl BenchError {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        BenchError::Provider(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        BenchError::Http(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        BenchError::Decode(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        BenchError::Configuration(msg.into())
    }

    /// Create a report error
    pub fn report(msg: impl Into<String>) -> Self {
        BenchError::Report(msg.into())
    }
}
