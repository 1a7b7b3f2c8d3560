//! dictwire CLI Client
//!
//! Command-line front end for a remote dictionary server.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dictwire::client::describe_error;
use dictwire::protocol::is_not_found;
use dictwire::{ClientConfig, DictionaryClient};
use tracing_subscriber::{fmt, EnvFilter};

/// dictwire CLI
#[derive(Parser, Debug)]
#[command(name = "dictwire-cli")]
#[command(about = "Query, add or remove words on a dictionary server")]
#[command(version)]
struct Args {
    /// Server host name or address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "4444")]
    port: u16,

    /// Give up if a blocking step takes longer than this (0 = wait forever)
    #[arg(short, long, default_value = "0")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up the meaning of a word
    Query {
        /// A single word
        word: String,
    },

    /// Add a word, or replace its meaning
    Add {
        /// A single word
        word: String,

        /// The meaning to store
        meaning: String,
    },

    /// Remove a word
    Remove {
        /// A single word
        word: String,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the answer
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();
    let client = DictionaryClient::new(config);

    let result = match &args.command {
        Commands::Query { word } => parse_word(word).and_then(|w| {
            client.query(w).map_err(|e| describe_error(&e))
        }),
        Commands::Add { word, meaning } => parse_word(word)
            .and_then(|w| parse_meaning(meaning).map(|m| (w, m)))
            .and_then(|(w, m)| client.add(w, m).map_err(|e| describe_error(&e))),
        Commands::Remove { word } => parse_word(word).and_then(|w| {
            client.remove(w).map_err(|e| describe_error(&e))
        }),
    };

    match result {
        Ok(text) if matches!(args.command, Commands::Query { .. }) && is_not_found(&text) => {
            eprintln!("{}", text);
            ExitCode::from(1)
        }
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::from(2)
        }
    }
}

/// Accept exactly one whitespace-free, non-empty token
fn parse_word(input: &str) -> Result<&str, String> {
    let mut tokens = input.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(word), None) if word == input => Ok(word),
        _ => Err("Please enter a single word.".to_string()),
    }
}

fn parse_meaning(input: &str) -> Result<&str, String> {
    if input.is_empty() {
        return Err("Please enter a meaning for the word.".to_string());
    }
    Ok(input)
}
