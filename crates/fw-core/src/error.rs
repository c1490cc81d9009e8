//! Core error types for Formwright

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a tool transport.
///
/// Only these surface from the session client. A tool call that reaches the
/// server but yields no usable reply is not an error; it produces an absent
/// result instead.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The server refused the `initialize` handshake
    #[error("Initialize failed: HTTP {status}")]
    HandshakeRejected { status: u16 },

    /// The HTTP request could not be completed
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The client was closed
    #[error("Client is closed")]
    Closed,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// JSON task file error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}
