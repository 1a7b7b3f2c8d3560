//! Connection Handler
//!
//! Serves a single client connection on the server side: greeting, one
//! request, one reply.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::dictionary::Dictionary;
use crate::error::{DictError, Result};
use crate::protocol::{
    read_frame, write_frame, Request, INVALID_REQUEST_PREFIX, WORD_ADDED, WORD_NOT_FOUND,
    WORD_REMOVED, WORD_UPDATED,
};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared word store
    dictionary: Arc<Dictionary>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O
    pub fn new(stream: TcpStream, dictionary: Arc<Dictionary>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dictionary,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until the exchange finishes)
    ///
    /// Sends the greeting, reads one request and answers it. A client that
    /// leaves early is not an error.
    pub fn handle(&mut self, greeting: &str) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        if let Err(e) = write_frame(&mut self.writer, greeting) {
            return self.tolerate_disconnect(e, "before the greeting was sent");
        }

        let reply = match read_frame(&mut self.reader) {
            Ok(payload) => {
                tracing::trace!("Received request from {}: {}", self.peer_addr, payload);
                match Request::parse(&payload) {
                    Ok(request) => self.execute(request),
                    Err(e) => invalid_request(e),
                }
            }
            Err(e @ DictError::Protocol(_)) => invalid_request(e),
            Err(e) => return self.tolerate_disconnect(e, "before sending a request"),
        };

        if let Err(e) = write_frame(&mut self.writer, &reply) {
            return self.tolerate_disconnect(e, "before the reply could be sent");
        }

        tracing::debug!("Served client {}", self.peer_addr);
        Ok(())
    }

    /// Apply a request to the dictionary and build the reply text
    fn execute(&self, request: Request) -> String {
        match request {
            Request::Query { word } => self
                .dictionary
                .get(&word)
                .unwrap_or_else(|| WORD_NOT_FOUND.to_string()),
            Request::Add { word, meaning } => {
                if self.dictionary.insert(word, meaning) {
                    WORD_ADDED.to_string()
                } else {
                    WORD_UPDATED.to_string()
                }
            }
            Request::Remove { word } => {
                if self.dictionary.remove(&word) {
                    WORD_REMOVED.to_string()
                } else {
                    WORD_NOT_FOUND.to_string()
                }
            }
        }
    }

    /// Swallow errors that only mean the client went away or went quiet
    fn tolerate_disconnect(&self, err: DictError, when: &str) -> Result<()> {
        if let DictError::Io(ref io_err) = err {
            match io_err.kind() {
                ErrorKind::UnexpectedEof
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe => {
                    tracing::debug!("Client {} disconnected {}", self.peer_addr, when);
                    return Ok(());
                }
                // Read timeout (Windows uses TimedOut instead of WouldBlock)
                ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                    tracing::debug!("Timeout for client {} {}", self.peer_addr, when);
                    return Ok(());
                }
                _ => {}
            }
        }
        tracing::warn!("Error serving {}: {}", self.peer_addr, err);
        Err(err)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn invalid_request(err: DictError) -> String {
    let reason = match err {
        DictError::Protocol(reason) => reason,
        other => other.to_string(),
    };
    format!("{INVALID_REQUEST_PREFIX}{reason}")
}
