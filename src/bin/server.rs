//! SquirrelDB Server Binary
//!
//! Starts the HTTP server for SquirrelDB.

use std::sync::Arc;

use clap::Parser;
use squirreldb::network::Server;
use squirreldb::{Config, Handler, SquirrelStore};
use tracing_subscriber::{fmt, EnvFilter};

/// SquirrelDB Server
#[derive(Parser, Debug)]
#[command(name = "squirreldb-server")]
#[command(about = "REST service for squirrel records")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "./squirrels.db")]
    store: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// Request body limit in KB
    #[arg(short = 'b', long, default_value = "1024")]
    max_body_kb: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,squirreldb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SquirrelDB Server v{}", squirreldb::VERSION);
    tracing::info!("Store file: {}", args.store);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .store_path(&args.store)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_body_size(args.max_body_kb * 1024)
        .build();

    // Open store
    let store = match SquirrelStore::open(&config.store_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store initialized successfully");

    // Start server
    let server = match Server::bind(config, Handler::new(store)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
