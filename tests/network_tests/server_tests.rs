//! Tests for the reference Server
//!
//! Drives the server with raw frames so its side of the contract is checked
//! independently of the client.

use std::io::Read;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use dictwire::network::{Server, ServerHandle};
use dictwire::protocol::{
    read_frame, write_frame, INVALID_REQUEST_PREFIX, WORD_ADDED, WORD_NOT_FOUND, WORD_REMOVED,
    WORD_UPDATED,
};
use dictwire::{Dictionary, ServerConfig};

// =============================================================================
// Helper Functions
// =============================================================================

fn start_server(greeting: &str, dictionary: Dictionary) -> ServerHandle {
    let config = ServerConfig::builder()
        .listen_addr("127.0.0.1:0")
        .greeting(greeting)
        .workers(2)
        .read_timeout_ms(2000)
        .write_timeout_ms(2000)
        .build();
    Server::bind(config, Arc::new(dictionary))
        .unwrap()
        .spawn()
        .unwrap()
}

fn connect(server: &ServerHandle) -> TcpStream {
    let stream = TcpStream::connect(server.local_addr()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
}

/// Greeting, request, reply over one raw connection
fn raw_exchange(server: &ServerHandle, payload: &str) -> (String, String) {
    let mut stream = connect(server);
    let greeting = read_frame(&mut stream).unwrap();
    write_frame(&mut stream, payload).unwrap();
    let reply = read_frame(&mut stream).unwrap();
    (greeting, reply)
}

// =============================================================================
// Greeting Tests
// =============================================================================

#[test]
fn test_greeting_sent_on_connect() {
    let server = start_server("Hello from the test server.", Dictionary::new());

    let mut stream = connect(&server);
    assert_eq!(
        read_frame(&mut stream).unwrap(),
        "Hello from the test server."
    );
}

#[test]
fn test_default_greeting() {
    assert_eq!(
        ServerConfig::default().greeting,
        "Welcome to the dictionary server."
    );
}

// =============================================================================
// Request Handling Tests
// =============================================================================

#[test]
fn test_query_hit_and_miss() {
    let server = start_server("hi", Dictionary::from_iter([("cat", "a small feline")]));

    assert_eq!(raw_exchange(&server, "query|cat").1, "a small feline");
    assert_eq!(raw_exchange(&server, "query|dog").1, WORD_NOT_FOUND);
}

#[test]
fn test_add_then_update() {
    let server = start_server("hi", Dictionary::new());

    assert_eq!(raw_exchange(&server, "add|owl|a bird").1, WORD_ADDED);
    assert_eq!(raw_exchange(&server, "add|owl|a nocturnal bird").1, WORD_UPDATED);
    assert_eq!(
        server.dictionary().get("owl").as_deref(),
        Some("a nocturnal bird")
    );
}

#[test]
fn test_remove_hit_and_miss() {
    let server = start_server("hi", Dictionary::from_iter([("cat", "a small feline")]));

    assert_eq!(raw_exchange(&server, "remove|cat").1, WORD_REMOVED);
    assert_eq!(raw_exchange(&server, "remove|cat").1, WORD_NOT_FOUND);
    assert!(server.dictionary().is_empty());
}

#[test]
fn test_invalid_requests_get_a_reply() {
    let server = start_server("hi", Dictionary::new());

    for payload in ["fetch|cat", "add|cat", "query", ""] {
        let (_, reply) = raw_exchange(&server, payload);
        assert!(
            reply.starts_with(INVALID_REQUEST_PREFIX),
            "payload {:?} got {:?}",
            payload,
            reply
        );
    }
    assert!(server.dictionary().is_empty());
}

#[test]
fn test_server_closes_after_one_reply() {
    let server = start_server("hi", Dictionary::new());

    let mut stream = connect(&server);
    read_frame(&mut stream).unwrap();
    write_frame(&mut stream, "query|cat").unwrap();
    read_frame(&mut stream).unwrap();

    let mut buf = [0u8; 1];
    assert_eq!(stream.read(&mut buf).unwrap(), 0);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_early_disconnect_does_not_stop_server() {
    let server = start_server("hi", Dictionary::new());

    {
        let mut stream = connect(&server);
        read_frame(&mut stream).unwrap();
        // Leave without sending a request
    }

    assert_eq!(raw_exchange(&server, "add|cat|feline").1, WORD_ADDED);
}

#[test]
fn test_shutdown_joins() {
    let server = start_server("hi", Dictionary::new());
    let addr = server.local_addr();

    assert_eq!(raw_exchange(&server, "query|x").1, WORD_NOT_FOUND);
    server.shutdown().unwrap();

    assert!(TcpStream::connect(addr).is_err());
}

#[test]
fn test_workers_clamped_to_one() {
    let config = ServerConfig::builder().workers(0).build();
    assert_eq!(config.workers, 1);
}
