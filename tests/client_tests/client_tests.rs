//! Tests for DictionaryClient
//!
//! These tests verify:
//! - add / query / remove round trips against the reference server
//! - The not-found sentinel passes through verbatim
//! - One connection per operation, always closed
//! - Error surfacing (unknown host, refused, dead peer, bad operands)

use std::io::{self, ErrorKind, Read};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

use dictwire::client::describe_error;
use dictwire::network::{Resolver, Server, ServerHandle};
use dictwire::protocol::{
    read_frame, write_frame, WORD_ADDED, WORD_NOT_FOUND, WORD_REMOVED, WORD_UPDATED,
};
use dictwire::{ClientConfig, DictError, Dictionary, DictionaryClient, ServerConfig};

// =============================================================================
// Helper Functions
// =============================================================================

fn start_server() -> ServerHandle {
    let config = ServerConfig::builder()
        .listen_addr("127.0.0.1:0")
        .workers(2)
        .read_timeout_ms(2000)
        .write_timeout_ms(2000)
        .build();
    Server::bind(config, Arc::new(Dictionary::new()))
        .unwrap()
        .spawn()
        .unwrap()
}

fn client_for(addr: SocketAddr) -> DictionaryClient {
    DictionaryClient::new(
        ClientConfig::builder()
            .host("127.0.0.1")
            .port(addr.port())
            .read_timeout_ms(5000)
            .write_timeout_ms(5000)
            .build(),
    )
}

fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[derive(Debug)]
struct NxDomainResolver;

impl Resolver for NxDomainResolver {
    fn resolve(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
        Err(io::Error::new(ErrorKind::NotFound, "NXDOMAIN"))
    }
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_add_then_query() {
    let server = start_server();
    let client = client_for(server.local_addr());

    assert_eq!(client.add("cat", "a small feline").unwrap(), WORD_ADDED);
    assert_eq!(client.query("cat").unwrap(), "a small feline");
}

#[test]
fn test_query_unknown_word() {
    let server = start_server();
    let client = client_for(server.local_addr());

    assert_eq!(client.query("zyzzyva").unwrap(), "Word not found in dictionary.");
}

#[test]
fn test_remove_then_query() {
    let server = start_server();
    let client = client_for(server.local_addr());

    client.add("cat", "a small feline").unwrap();
    assert_eq!(client.remove("cat").unwrap(), WORD_REMOVED);
    assert_eq!(client.query("cat").unwrap(), WORD_NOT_FOUND);
}

#[test]
fn test_status_messages_pass_through() {
    let server = start_server();
    let client = client_for(server.local_addr());

    client.add("owl", "a bird").unwrap();
    assert_eq!(client.add("owl", "a nocturnal bird").unwrap(), WORD_UPDATED);
    assert_eq!(client.remove("emu").unwrap(), WORD_NOT_FOUND);
}

#[test]
fn test_lookup_maps_sentinel() {
    let server = start_server();
    let client = client_for(server.local_addr());

    assert_eq!(client.lookup("cat").unwrap(), None);
    client.add("cat", "a small feline").unwrap();
    assert_eq!(
        client.lookup("cat").unwrap().as_deref(),
        Some("a small feline")
    );
}

#[test]
fn test_non_ascii_round_trip() {
    let server = start_server();
    let client = client_for(server.local_addr());

    let meaning = "café noir ☕, served hot 😀";
    client.add("café", meaning).unwrap();
    assert_eq!(client.query("café").unwrap(), meaning);
}

#[test]
fn test_concurrent_clients() {
    let server = start_server();
    let client = client_for(server.local_addr());

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                client
                    .add(&format!("word{}", i), &format!("meaning {}", i))
                    .unwrap()
            })
        })
        .collect();
    for w in writers {
        assert_eq!(w.join().unwrap(), WORD_ADDED);
    }

    for i in 0..8 {
        assert_eq!(
            client.query(&format!("word{}", i)).unwrap(),
            format!("meaning {}", i)
        );
    }
    assert_eq!(server.dictionary().len(), 8);
}

// =============================================================================
// Connection Accounting Tests
// =============================================================================

#[test]
fn test_one_connection_per_operation() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let peer = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..3 {
            let (mut stream, _) = listener.accept().unwrap();
            write_frame(&mut stream, "hi").unwrap();
            let request = read_frame(&mut stream).unwrap();
            write_frame(&mut stream, "done").unwrap();

            let mut buf = [0u8; 1];
            let closed = matches!(stream.read(&mut buf), Ok(0));
            seen.push((request, closed));
        }
        seen
    });

    let client = client_for(addr);
    assert_eq!(client.query("cat").unwrap(), "done");
    assert_eq!(client.add("cat", "feline").unwrap(), "done");
    assert_eq!(client.remove("cat").unwrap(), "done");

    let seen = peer.join().unwrap();
    assert_eq!(
        seen,
        vec![
            ("query|cat".to_string(), true),
            ("add|cat|feline".to_string(), true),
            ("remove|cat".to_string(), true),
        ]
    );
}

#[test]
fn test_peer_closing_immediately_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        drop(stream);
    });

    let result = client_for(addr).query("cat");
    peer.join().unwrap();

    assert!(matches!(result, Err(DictError::Io(_))), "got {:?}", result);
}

// =============================================================================
// Error Surfacing Tests
// =============================================================================

#[test]
fn test_unknown_host_real_lookup() {
    let client = DictionaryClient::new(ClientConfig::new("dictionary.invalid", 4444));

    let err = client.query("cat").unwrap_err();
    assert!(matches!(err, DictError::UnknownHost { .. }));
    assert_eq!(describe_error(&err), "Unknown Host.");
}

#[test]
fn test_unknown_host_mocked_lookup() {
    let client =
        DictionaryClient::with_resolver(ClientConfig::new("dict.local", 4444), NxDomainResolver);

    for result in [
        client.query("cat"),
        client.add("cat", "feline"),
        client.remove("cat"),
    ] {
        assert!(matches!(result, Err(DictError::UnknownHost { .. })));
    }
}

#[test]
fn test_connection_refused() {
    let client = DictionaryClient::new(ClientConfig::new("127.0.0.1", unused_port()));

    let err = client.add("cat", "feline").unwrap_err();
    assert!(matches!(err, DictError::ConnectionFailed { .. }));
    assert_eq!(describe_error(&err), "Connection failed.");
}

#[test]
fn test_separator_rejected_before_connecting() {
    // Nothing listens here, so a connection attempt would fail differently
    let client = DictionaryClient::new(ClientConfig::new("127.0.0.1", unused_port()));

    assert!(matches!(
        client.add("cat", "small | feline"),
        Err(DictError::InvalidOperand(_))
    ));
    assert!(matches!(
        client.query("c|t"),
        Err(DictError::InvalidOperand(_))
    ));
}

#[test]
fn test_oversized_request_rejected_before_connecting() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let client = client_for(listener.local_addr().unwrap());

    match client.add("cat", &"x".repeat(70_000)) {
        Err(DictError::FrameTooLarge { len }) => assert_eq!(len, 70_008),
        other => panic!("Expected FrameTooLarge, got {:?}", other),
    }

    // No connection may have reached the listener
    match listener.accept() {
        Err(e) => assert_eq!(e.kind(), ErrorKind::WouldBlock),
        Ok((_, peer)) => panic!("Unexpected connection from {}", peer),
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_mutators() {
    let mut client = DictionaryClient::default();
    assert_eq!(client.config().port, 4444);

    client.set_host("dict.example.org");
    client.set_port(7000);
    assert_eq!(client.config(), &ClientConfig::new("dict.example.org", 7000));
}

#[test]
fn test_default_config_blocks_forever() {
    let config = ClientConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert!(config.connect_timeout().is_none());
    assert!(config.read_timeout().is_none());
    assert!(config.write_timeout().is_none());
}
