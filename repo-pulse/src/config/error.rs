//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading, validating or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write a file.
    #[error("Failed to access file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or serialize the JSON document.
    #[error("Failed to parse configuration '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Validation error in the configuration document.
    #[error("Validation error in '{path}': {message}")]
    ValidationError { path: String, message: String },

    /// No configuration has been saved yet.
    #[error("No configuration found at '{path}'")]
    NotConfigured { path: String },
}
