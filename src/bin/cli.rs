//! ssdbkv CLI Client
//!
//! Sends a single command to the server and prints the reply.

use std::process::ExitCode;

use clap::Parser;
use ssdbkv::{Command, Config, Connection};
use tracing_subscriber::{fmt, EnvFilter};

/// ssdbkv CLI
#[derive(Parser, Debug)]
#[command(name = "ssdbkv-cli")]
#[command(about = "Run one command against an SSDB-protocol server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8888")]
    port: u16,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "10000")]
    timeout_ms: u64,

    /// Print key/value pairs instead of a flat list
    #[arg(long)]
    pairs: bool,

    /// Command verb followed by its arguments, e.g. `get key`
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ssdbkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .timeout_ms(args.timeout_ms)
        .build();

    let mut conn = match Connection::connect(&config) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.addr(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut words = args.command.into_iter();
    let command = match words.next() {
        Some(verb) => Command::new(verb).args_from(words),
        None => return ExitCode::FAILURE,
    };

    let reply = conn.execute(command);

    println!("{}", reply.status());
    if args.pairs {
        reply.kv_each(|key, value| println!("{}\t{}", key, value));
    } else {
        for item in reply.items() {
            println!("{}", item);
        }
    }

    if let Err(e) = conn.close() {
        tracing::warn!("Error closing connection: {}", e);
    }

    if reply.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
