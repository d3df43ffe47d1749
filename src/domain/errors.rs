//! Domain error types
//!
//! This module defines the error hierarchy for the exporter. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the application.
/// Adapters convert driver errors into one of these variants at the boundary.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller could not be identified
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Caller was identified but may not access the resource
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document rendering errors
    #[error("Render error: {0}")]
    Render(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Database-specific errors
///
/// Errors that occur when reading clinical data. These errors don't expose
/// the PostgreSQL driver or pool types.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to obtain a connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Connection pool could not be built
    #[error("Failed to create connection pool: {0}")]
    PoolCreationFailed(String),

    /// A query failed
    #[error("Query failed on {table}: {message}")]
    QueryFailed { table: &'static str, message: String },

    /// A row could not be mapped to a domain record
    #[error("Invalid row in {table}: {message}")]
    InvalidRow { table: &'static str, message: String },

    /// TLS connector could not be created
    #[error("TLS setup failed: {0}")]
    Tls(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<std::fmt::Error> for ExportError {
    fn from(err: std::fmt::Error) -> Self {
        ExportError::Render(err.to_string())
    }
}
