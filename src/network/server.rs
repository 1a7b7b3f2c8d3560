//! TCP Server
//!
//! Reference peer for the dictionary protocol. Accepts connections on one
//! thread and dispatches them to a fixed pool of worker threads.

use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, SendTimeoutError, Sender};

use crate::config::ServerConfig;
use crate::dictionary::Dictionary;
use crate::error::Result;

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Accepted connections queued per worker before the acceptor blocks
const QUEUE_DEPTH_PER_WORKER: usize = 16;

/// TCP server for the dictionary protocol
pub struct Server {
    config: ServerConfig,
    dictionary: Arc<Dictionary>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listen address
    pub fn bind(config: ServerConfig, dictionary: Arc<Dictionary>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking accept so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            dictionary,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The dictionary this server answers from
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        let workers = self.config.workers.max(1);
        let (sender, receiver) = channel::bounded::<TcpStream>(workers * QUEUE_DEPTH_PER_WORKER);

        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|id| self.spawn_worker(id, receiver.clone()))
            .collect::<io::Result<_>>()?;
        drop(receiver);

        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            workers
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::debug!("Accepted connection from {}", addr);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    match dispatch(&sender, stream, &self.shutdown) {
                        Dispatch::Queued => {}
                        Dispatch::ShuttingDown => {
                            tracing::debug!("Dropping connection from {}, shutting down", addr);
                            break;
                        }
                        Dispatch::WorkersGone => {
                            tracing::error!("All workers exited, stopping accept loop");
                            break;
                        }
                    }
                }
                Err(e) => {
                    if !matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) {
                        tracing::warn!("Accept failed: {}", e);
                    }
                    thread::sleep(accept_retry_delay(&e));
                }
            }
        }

        // Workers drain queued connections, then see the closed channel
        drop(sender);
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Run the server on a background thread
    pub fn spawn(self) -> Result<ServerHandle> {
        let local_addr = self.local_addr()?;
        let shutdown = Arc::clone(&self.shutdown);
        let dictionary = Arc::clone(&self.dictionary);
        let thread = thread::Builder::new()
            .name("dictwire-acceptor".to_string())
            .spawn(move || self.run())?;

        Ok(ServerHandle {
            local_addr,
            dictionary,
            shutdown,
            thread: Some(thread),
        })
    }

    fn spawn_worker(
        &self,
        id: usize,
        receiver: Receiver<TcpStream>,
    ) -> io::Result<JoinHandle<()>> {
        let dictionary = Arc::clone(&self.dictionary);
        let config = self.config.clone();

        thread::Builder::new()
            .name(format!("dictwire-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    serve(stream, &dictionary, &config);
                }
                tracing::trace!("Worker {} exiting", id);
            })
    }
}

/// Result of handing an accepted connection to the worker queue
#[derive(Debug, PartialEq, Eq)]
enum Dispatch {
    Queued,
    ShuttingDown,
    WorkersGone,
}

/// Queue `item` for the workers, giving up if shutdown is requested while
/// the queue stays full
fn dispatch<T>(sender: &Sender<T>, item: T, shutdown: &AtomicBool) -> Dispatch {
    let mut pending = item;
    loop {
        match sender.send_timeout(pending, ACCEPT_POLL_INTERVAL) {
            Ok(()) => return Dispatch::Queued,
            Err(SendTimeoutError::Timeout(item)) => {
                if shutdown.load(Ordering::Relaxed) {
                    return Dispatch::ShuttingDown;
                }
                pending = item;
            }
            Err(SendTimeoutError::Disconnected(_)) => return Dispatch::WorkersGone,
        }
    }
}

/// Pause before the next accept after a failed one
///
/// Only an interrupted call is retried at once; anything else (no pending
/// connection, descriptor exhaustion) would otherwise spin.
fn accept_retry_delay(err: &io::Error) -> Duration {
    match err.kind() {
        ErrorKind::Interrupted => Duration::ZERO,
        _ => ACCEPT_POLL_INTERVAL,
    }
}

fn serve(stream: TcpStream, dictionary: &Arc<Dictionary>, config: &ServerConfig) {
    let mut connection = match Connection::new(stream, Arc::clone(dictionary)) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }

    // Errors are already logged by the handler
    let _ = connection.handle(&config.greeting);
}

/// Handle to a server running on a background thread
///
/// Dropping the handle stops the server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    dictionary: Arc<Dictionary>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl ServerHandle {
    /// Address the server is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The dictionary the server answers from
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Stop accepting, wait for in-flight connections, and join
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::Relaxed);
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| io::Error::new(ErrorKind::Other, "server thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Server shutdown failed: {}", e);
        }
    }
}
