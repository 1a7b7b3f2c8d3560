//! dictwire Server Binary
//!
//! Starts the reference dictionary server.

use std::sync::Arc;

use clap::Parser;
use dictwire::config::DEFAULT_GREETING;
use dictwire::network::Server;
use dictwire::{Dictionary, ServerConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// dictwire Server
#[derive(Parser, Debug)]
#[command(name = "dictwire-server")]
#[command(about = "Reference server for the dictwire protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4444")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Greeting sent to every client on connect
    #[arg(short, long, default_value = DEFAULT_GREETING)]
    greeting: String,

    /// Per-connection read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dictwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("dictwire server v{}", dictwire::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = ServerConfig::builder()
        .listen_addr(&args.listen)
        .workers(args.workers)
        .greeting(&args.greeting)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let server = match Server::bind(config, Arc::new(Dictionary::new())) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
