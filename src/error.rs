//! Error types for dictwire
//!
//! Provides a unified error type for all operations. Every failure of a
//! dictionary operation surfaces as exactly one of these variants; nothing
//! is retried.

use thiserror::Error;

use crate::network::SessionState;

/// Result type alias using DictError
pub type Result<T> = std::result::Result<T, DictError>;

/// Unified error type for dictwire operations
#[derive(Debug, Error)]
pub enum DictError {
    // -------------------------------------------------------------------------
    // Connection Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Unknown host: {host}")]
    UnknownHost { host: String },

    #[error("Unable to connect to {addr}: {source}")]
    ConnectionFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to get streams from server: {0}")]
    StreamUnavailable(#[source] std::io::Error),

    #[error("Unable to close streams or socket: {0}")]
    CloseFailed(#[source] std::io::Error),

    #[error("Timed out while {phase}")]
    Timeout { phase: SessionState },

    #[error("Session cannot proceed from state {state}")]
    InvalidState { state: SessionState },

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Frame too large: {len} bytes (max {max})", max = u16::MAX)]
    FrameTooLarge { len: usize },

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DictError {
    /// True for failures that happened before a connection was established
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            DictError::UnknownHost { .. } | DictError::ConnectionFailed { .. }
        )
    }
}
