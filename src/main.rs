//! RAX Chat Server - Entry Point
//!
//! A multi-client text chat relay with public and private messaging.

use log::{error, info};

use rax_chat_server::config::ServerConfig;
use rax_chat_server::error::{ChatServerError, handle_error, is_fatal};
use rax_chat_server::server::Server;
use rax_chat_server::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    setup_logging();

    info!("Launching chat server...");

    if let Err(e) = run().await {
        handle_error(&e);
        if is_fatal(&e) {
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<(), ChatServerError> {
    let config = ServerConfig::load()?;
    let server = Server::new(config).await?;
    let stats = server.stats();

    tokio::select! {
        _ = server.start() => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        }
    }

    info!("Session totals: {:?}", stats.snapshot());
    Ok(())
}
