use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use crate::client::{AcceptedClient, ClientRegistry, Outbound, handle_client};
use crate::config::ServerConfig;
use crate::error::{ChatServerError, handle_error};
use crate::protocol::responses::{ROOM_FULL, SERVER_STARTED, format_system, new_connection};
use crate::router::Router;
use crate::server::stats::ServerStats;
use crate::storage::ChatLog;

/// Pause after a failed accept, so a persistent error doesn't spin the loop
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Server {
    router: Arc<Router>,
    chat_log: Arc<ChatLog>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
    stats: Arc<ServerStats>,
}

impl Server {
    /// Binds the listener. Failing to bind is the one error that aborts startup.
    pub async fn new(config: ServerConfig) -> Result<Self, ChatServerError> {
        let addr = config.listen_socket();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ChatServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server bound to {}", addr);

        let registry = Arc::new(ClientRegistry::new(config.max_clients));
        let chat_log = Arc::new(ChatLog::from_config(&config));
        info!(
            "Logging chat to {} and private messages to {}",
            chat_log.public_path().display(),
            chat_log.private_path().display()
        );

        Ok(Self {
            router: Arc::new(Router::new(registry, Arc::clone(&chat_log))),
            chat_log,
            listener,
            config: Arc::new(config),
            stats: Arc::new(ServerStats::new()),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(self.router.registry())
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        Arc::clone(&self.stats)
    }

    /// Accepts connections forever, one session task per admitted client.
    pub async fn start(&self) {
        info!(
            "Starting RAX chat server on {} (max {} clients)",
            self.config.listen_socket(),
            self.config.max_clients
        );

        self.record(SERVER_STARTED).await;

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.admit(stream, addr).await,
                Err(e) => accept_failed(e).await,
            }
        }
    }

    async fn admit(&self, stream: TcpStream, addr: SocketAddr) {
        info!("New connection from {}", addr);

        let (outbound, outbox) = Outbound::bounded(self.config.outbound_queue_len);
        let slot = match self.router.registry().insert(addr, outbound.clone()).await {
            Ok(slot) => slot,
            Err(e) => {
                handle_error(&e.into());
                info!("Rejecting {}", addr);
                self.stats.session_rejected();
                // Written off the accept loop so a slow peer can't stall it
                tokio::spawn(async move {
                    if let Err(e) = reject(stream).await {
                        warn!("Failed to notify {} of full room: {}", addr, e);
                    }
                });
                return;
            }
        };

        // Ahead of the session's own lines, so it always precedes the join notice
        self.record(&new_connection(addr)).await;

        let client = AcceptedClient {
            stream,
            addr,
            slot,
            outbound,
            outbox,
        };
        let router = Arc::clone(&self.router);
        let config = Arc::clone(&self.config);
        let stats = Arc::clone(&self.stats);

        stats.session_started();
        tokio::spawn(async move {
            let outcome = handle_client(client, router, config).await;
            stats.session_finished(&outcome);
        });
    }

    /// Writes a server line to the public chat log.
    async fn record(&self, line: &str) {
        if let Err(e) = self.chat_log.append_public(line).await {
            handle_error(&e.into());
        }
    }
}

/// Logs a failed accept and pauses before the next attempt.
async fn accept_failed(e: io::Error) {
    error!("Error accepting connection: {}", e);
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

/// Tells a connection the room is full, then closes it.
async fn reject(mut stream: TcpStream) -> io::Result<()> {
    let notice = format!("{}\n", format_system(ROOM_FULL));
    stream.write_all(notice.as_bytes()).await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn failed_accept_backs_off() {
        let started = Instant::now();
        accept_failed(io::Error::other("too many open files")).await;
        assert!(started.elapsed() >= ACCEPT_BACKOFF);
    }
}
