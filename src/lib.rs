//! # dictwire
//!
//! Client for a remote dictionary server, plus a reference server that
//! speaks the same protocol:
//! - One TCP connection per operation (query / add / remove)
//! - Server greeting before every request
//! - Length-prefixed modified UTF-8 frames
//! - Guaranteed close on every exit path
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Caller (CLI / UI front end)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ query / add / remove
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   DictionaryClient                           │
//! │        (validates operands, one Session per call)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Session                                │
//! │  Connecting → AwaitingGreeting → SendingRequest →            │
//! │  AwaitingResponse → Closed                                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ TCP, u16 length + payload frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Server (acceptor + worker pool)                 │
//! │                 Connection → Dictionary                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod dictionary;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DictError, Result};
pub use config::{ClientConfig, ServerConfig};
pub use client::DictionaryClient;
pub use dictionary::Dictionary;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of dictwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
