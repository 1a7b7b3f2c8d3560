//! Dictionary Client
//!
//! Public entry point for callers. Each operation opens its own
//! [`Session`], performs one exchange and closes it before returning, so a
//! client holds no connection state between calls and can be shared across
//! threads freely.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{DictError, Result};
use crate::network::{Resolver, Session, SystemResolver};
use crate::protocol::{is_not_found, Request};

/// Client for a remote dictionary server
#[derive(Debug, Clone)]
pub struct DictionaryClient {
    config: ClientConfig,
    resolver: Arc<dyn Resolver>,
}

impl DictionaryClient {
    /// Create a client that resolves hosts through the operating system
    pub fn new(config: ClientConfig) -> Self {
        Self::with_resolver(config, SystemResolver)
    }

    /// Create a client with a custom host resolver
    pub fn with_resolver(config: ClientConfig, resolver: impl Resolver + 'static) -> Self {
        Self {
            config,
            resolver: Arc::new(resolver),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.config.host = host.into();
    }

    pub fn set_port(&mut self, port: u16) {
        self.config.port = port;
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Look up a word
    ///
    /// Returns the server's text verbatim: either the meaning or
    /// [`WORD_NOT_FOUND`](crate::protocol::WORD_NOT_FOUND).
    pub fn query(&self, word: &str) -> Result<String> {
        self.execute(&Request::query(word)?)
    }

    /// Look up a word, mapping the not-found reply to `None`
    pub fn lookup(&self, word: &str) -> Result<Option<String>> {
        let response = self.query(word)?;
        if is_not_found(&response) {
            Ok(None)
        } else {
            Ok(Some(response))
        }
    }

    /// Add a word or replace its meaning; returns the server's status text
    pub fn add(&self, word: &str, meaning: &str) -> Result<String> {
        self.execute(&Request::add(word, meaning)?)
    }

    /// Remove a word; returns the server's status text
    pub fn remove(&self, word: &str) -> Result<String> {
        self.execute(&Request::remove(word)?)
    }

    /// Run one request over a fresh connection
    ///
    /// A request too large for one frame is refused before connecting. The
    /// session is closed whether or not the exchange succeeded.
    pub fn execute(&self, request: &Request) -> Result<String> {
        request.ensure_fits_frame()?;
        let mut session = Session::open(&self.config, self.resolver.as_ref())?;

        let outcome = session.exchange(request);
        let closed = session.close();
        settle(outcome, closed)
    }
}

/// Combine an exchange outcome with the close that followed it
///
/// A close failure is only reported when the exchange itself went through.
fn settle(outcome: Result<String>, closed: Result<()>) -> Result<String> {
    match (outcome, closed) {
        (Ok(response), Ok(())) => Ok(response),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!("Ignoring close failure after earlier error: {}", close_err);
            Err(e)
        }
    }
}

impl Default for DictionaryClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

/// Human-readable summary of an error for front ends
pub fn describe_error(err: &DictError) -> String {
    match err {
        DictError::UnknownHost { .. } => "Unknown Host.".to_string(),
        DictError::ConnectionFailed { .. } | DictError::StreamUnavailable(_) => {
            "Connection failed.".to_string()
        }
        other => other.to_string(),
    }
}
