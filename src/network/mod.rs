//! Network Module
//!
//! TCP plumbing for both ends of the dictionary protocol.
//!
//! ## Client Side
//! - [`Session`]: one connection, one request, one response
//! - [`Resolver`]: host name lookup, swappable for tests
//!
//! ## Server Side
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Requests applied to the shared [`Dictionary`](crate::dictionary::Dictionary)

mod resolver;
mod session;
mod server;
mod connection;

pub use resolver::{Resolver, SystemResolver};
pub use session::{Session, SessionState};
pub use server::{Server, ServerHandle};
pub use connection::Connection;
