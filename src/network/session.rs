//! Client Session
//!
//! A single-use connection to the dictionary server.
//!
//! ## State Machine
//! ```text
//! Connecting ─▶ AwaitingGreeting ─▶ SendingRequest ─▶ AwaitingResponse
//!      │               │                  │                  │
//!      └───────────────┴──────────────────┴──────────────────┴─▶ Closed
//! ```
//! [`Session::open`] covers `Connecting`. [`Session::exchange`] walks the
//! middle states and [`Session::close`] always ends in `Closed`. A session
//! dropped before `close` is shut down on drop.

use std::fmt;
use std::io::{self, BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use crate::config::ClientConfig;
use crate::error::{DictError, Result};
use crate::protocol::{encode_request, read_frame, Request};

use super::Resolver;

/// Lifecycle position of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    AwaitingGreeting,
    SendingRequest,
    AwaitingResponse,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "connecting",
            SessionState::AwaitingGreeting => "awaiting greeting",
            SessionState::SendingRequest => "sending request",
            SessionState::AwaitingResponse => "awaiting response",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// One connection carrying exactly one request/response exchange
pub struct Session {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered, flushed after every frame)
    writer: BufWriter<TcpStream>,

    /// Address the connection landed on
    peer_addr: SocketAddr,

    state: SessionState,

    /// Greeting received from the server, once read
    greeting: Option<String>,
}

impl Session {
    /// Connect to the configured server
    ///
    /// Resolves the host, connects, applies deadlines and splits the socket
    /// into read and write handles. The session starts in `AwaitingGreeting`.
    pub fn open(config: &ClientConfig, resolver: &dyn Resolver) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "Attempting to connect with host {} through port {}...",
            config.host,
            config.port
        );
        let stream = connect(config, resolver)?;

        let peer_addr = stream.peer_addr().map_err(DictError::StreamUnavailable)?;

        // Disable Nagle's algorithm, requests are a single small frame
        stream.set_nodelay(true).map_err(DictError::StreamUnavailable)?;
        stream
            .set_read_timeout(config.read_timeout())
            .map_err(DictError::StreamUnavailable)?;
        stream
            .set_write_timeout(config.write_timeout())
            .map_err(DictError::StreamUnavailable)?;

        let read_stream = stream.try_clone().map_err(DictError::StreamUnavailable)?;

        tracing::info!("Connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
            state: SessionState::AwaitingGreeting,
            greeting: None,
        })
    }

    /// Run the greeting, request and response steps
    ///
    /// Only valid on a freshly opened session. On error the session stays in
    /// the state that failed; it still has to be closed.
    pub fn exchange(&mut self, request: &Request) -> Result<String> {
        if self.state != SessionState::AwaitingGreeting {
            return Err(DictError::InvalidState { state: self.state });
        }

        loop {
            let phase = self.state;
            match phase {
                SessionState::AwaitingGreeting => {
                    let greeting =
                        read_frame(&mut self.reader).map_err(|e| classify(e, phase))?;
                    tracing::debug!("Server greeting: {}", greeting);
                    self.greeting = Some(greeting);
                    self.state = SessionState::SendingRequest;
                }
                SessionState::SendingRequest => {
                    let frame = encode_request(request)?;
                    self.writer
                        .write_all(&frame)
                        .and_then(|_| self.writer.flush())
                        .map_err(|e| classify(e.into(), phase))?;
                    tracing::info!("Request sent to server");
                    tracing::trace!("Request payload: {}", request);
                    self.state = SessionState::AwaitingResponse;
                }
                SessionState::AwaitingResponse => {
                    let response =
                        read_frame(&mut self.reader).map_err(|e| classify(e, phase))?;
                    tracing::debug!("Received {} byte response", response.len());
                    return Ok(response);
                }
                SessionState::Connecting | SessionState::Closed => {
                    return Err(DictError::InvalidState { state: phase });
                }
            }
        }
    }

    /// Close input, output, then the socket
    ///
    /// Every step is attempted even if an earlier one fails; the first failure
    /// is reported as `CloseFailed`.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;

        let input = tolerate_disconnected(self.reader.get_ref().shutdown(Shutdown::Read));
        let flushed = self.writer.flush();
        let output = tolerate_disconnected(self.writer.get_ref().shutdown(Shutdown::Write));
        let socket = tolerate_disconnected(self.writer.get_ref().shutdown(Shutdown::Both));

        input
            .and(flushed)
            .and(output)
            .and(socket)
            .map_err(DictError::CloseFailed)?;
        tracing::debug!("Connection to {} closed", self.peer_addr);
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The greeting, once `exchange` has read it
    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }

    /// Get the peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::trace!("Close on drop failed for {}: {}", self.peer_addr, e);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("peer_addr", &self.peer_addr)
            .field("state", &self.state)
            .finish()
    }
}

/// Resolve the host and try each address in turn
fn connect(config: &ClientConfig, resolver: &dyn Resolver) -> Result<TcpStream> {
    let unknown_host = || DictError::UnknownHost {
        host: config.host.clone(),
    };

    let addrs = resolver.resolve(&config.host, config.port).map_err(|e| {
        tracing::debug!("Resolving {} failed: {}", config.host, e);
        unknown_host()
    })?;
    if addrs.is_empty() {
        return Err(unknown_host());
    }

    let mut last_err = None;
    for addr in addrs {
        let attempt = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connecting to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    let source = last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable));
    if is_timeout(&source) {
        return Err(DictError::Timeout {
            phase: SessionState::Connecting,
        });
    }
    Err(DictError::ConnectionFailed {
        addr: format!("{}:{}", config.host, config.port),
        source,
    })
}

/// Turn an elapsed socket deadline into `Timeout` for the blocking phase
fn classify(err: DictError, phase: SessionState) -> DictError {
    match err {
        DictError::Io(ref e) if is_timeout(e) => DictError::Timeout { phase },
        other => other,
    }
}

// Unix reports an elapsed deadline as WouldBlock, Windows as TimedOut
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

// A peer that already hung up leaves nothing to shut down
fn tolerate_disconnected(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}
