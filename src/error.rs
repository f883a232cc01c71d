//! Error types for colwire
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ColwireError
pub type Result<T> = std::result::Result<T, ColwireError>;

/// Unified error type for colwire operations
#[derive(Debug, Error)]
pub enum ColwireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of stream")]
    UnexpectedEof,

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Codec error: {0}")]
    Codec(String),

    // -------------------------------------------------------------------------
    // Column Errors
    // -------------------------------------------------------------------------
    #[error("Column error: {0}")]
    Column(String),

    #[error("Unimplemented column type: {0}")]
    UnimplementedType(String),

    // -------------------------------------------------------------------------
    // Block Errors
    // -------------------------------------------------------------------------
    #[error("Block error: {0}")]
    Block(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
