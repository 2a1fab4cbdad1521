//! Error types for ssdbkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SsdbError
pub type Result<T> = std::result::Result<T, SsdbError>;

/// Unified error type for ssdbkv operations
#[derive(Debug, Error)]
pub enum SsdbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// An argument has no wire representation; raised before any I/O
    #[error("Malformed request: {0}")]
    RequestMalformed(String),

    /// The peer sent bytes that do not follow the block framing
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Value Decoding Errors
    // -------------------------------------------------------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
