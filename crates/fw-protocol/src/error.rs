//! Protocol error types

use thiserror::Error;

/// Errors that can occur while framing or decoding protocol messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Event stream line was not valid UTF-8
    #[error("Invalid UTF-8 in event stream at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
