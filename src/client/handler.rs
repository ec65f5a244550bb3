use log::{debug, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::Receiver;
use tokio::task::{JoinError, JoinHandle};

use crate::client::registry::SlotId;
use crate::client::session::ClientSession;
use crate::client::state::Outbound;
use crate::config::ServerConfig;
use crate::error::{ChatServerError, SessionError, handle_error};
use crate::protocol::responses::{join_notice, leave_notice};
use crate::protocol::{ChunkDecoder, parse_username, split_messages};
use crate::router::{Origin, Router};

/// A connection that has been given a registry slot but not yet a name.
pub struct AcceptedClient<S = TcpStream> {
    pub stream: S,
    pub addr: SocketAddr,
    pub slot: SlotId,
    pub outbound: Outbound,
    pub outbox: Receiver<String>,
}

/// How a session ended, reported back to the acceptor
#[derive(Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Joined the chat and later left, cleanly or through an I/O error
    Left { name: String, messages: usize },
    /// Went away before completing the handshake
    NeverJoined,
}

/// Runs one client's chat session from handshake to disconnect.
///
/// - The first chunk read is the display name; the client then joins the room.
/// - Every later chunk is split into messages and handed to the router.
/// - On EOF or any I/O failure the slot is freed and, if the client had joined,
///   a leave notice goes out.
pub async fn handle_client<S>(
    client: AcceptedClient<S>,
    router: Arc<Router>,
    config: Arc<ServerConfig>,
) -> SessionOutcome
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let AcceptedClient {
        stream,
        addr,
        slot,
        outbound,
        outbox,
    } = client;

    let (read_half, write_half) = tokio::io::split(stream);
    let mut io = SessionIo::new(read_half, write_half, outbox);
    let mut session = ClientSession::new();

    let result = run_session(&mut session, &mut io, slot, &outbound, &router, &config).await;

    let messages = match result {
        Ok(messages) => {
            info!("Connection closed by client {}", addr);
            messages
        }
        Err(e) => {
            handle_error(&ChatServerError::Session(e));
            0
        }
    };

    if let Err(e) = session.disconnect() {
        handle_error(&e.into());
    }

    router.registry().remove(slot).await;

    let outcome = match session.name() {
        Some(name) if session.was_active() => {
            router.announce(&leave_notice(name)).await;
            info!("{} ({}) left the chat", name, addr);
            info!("Connected clients: {:?}", router.registry().active_names().await);
            SessionOutcome::Left {
                name: name.to_string(),
                messages,
            }
        }
        _ => SessionOutcome::NeverJoined,
    };

    // Last sender gone once the registry entry and our clone are dropped
    drop(outbound);
    io.close(addr, config.writer_drain_timeout()).await;

    if let Err(e) = session.terminate() {
        handle_error(&e.into());
    }
    outcome
}

async fn run_session<S>(
    session: &mut ClientSession,
    io: &mut SessionIo<S>,
    slot: SlotId,
    outbound: &Outbound,
    router: &Router,
    config: &ServerConfig,
) -> Result<usize, SessionError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    session.begin_handshake()?;
    let mut buffer = vec![0u8; config.buffer_size];
    let mut decoder = ChunkDecoder::new();

    let n = match io.read_chunk(&mut buffer).await {
        Ok(0) => {
            return Err(SessionError::HandshakeFailure(
                "connection closed before a name was sent".into(),
            ));
        }
        Ok(n) => n,
        Err(e) => return Err(SessionError::HandshakeFailure(e.to_string())),
    };

    let chunk = decoder.decode(&buffer[..n]);
    let mut lines = split_messages(&chunk);
    let name = lines
        .next()
        .and_then(|line| parse_username(line, config.max_username_length))
        .ok_or_else(|| SessionError::HandshakeFailure("invalid display name".into()))?;

    router
        .registry()
        .set_active(slot, &name)
        .await
        .map_err(|e| SessionError::HandshakeFailure(e.to_string()))?;
    session.activate(name.clone())?;
    info!("{} joined the chat", name);
    router.announce(&join_notice(&name)).await;
    info!("Connected clients: {:?}", router.registry().active_names().await);

    let origin = Origin {
        slot,
        name: &name,
        outbound,
    };

    let mut messages = 0;
    // Anything sent along with the name in the same chunk
    for line in lines {
        router.dispatch(&origin, line).await;
        messages += 1;
    }

    loop {
        let n = io.read_chunk(&mut buffer).await?;
        if n == 0 {
            return Ok(messages);
        }

        let chunk = decoder.decode(&buffer[..n]);
        for line in split_messages(&chunk) {
            let outcome = router.dispatch(&origin, line).await;
            debug!("Routed message from {}: {:?}", name, outcome);
            messages += 1;
        }
    }
}

/// Read side of a connection plus the task that owns its write side.
struct SessionIo<S> {
    reader: ReadHalf<S>,
    writer: JoinHandle<io::Result<()>>,
    writer_finished: bool,
}

impl<S> SessionIo<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    fn new(reader: ReadHalf<S>, writer: WriteHalf<S>, outbox: Receiver<String>) -> Self {
        Self {
            reader,
            writer: tokio::spawn(write_lines(writer, outbox)),
            writer_finished: false,
        }
    }

    /// Reads one chunk; `Ok(0)` means the peer closed the connection.
    ///
    /// A failed write ends the session as surely as a failed read.
    async fn read_chunk(&mut self, buffer: &mut [u8]) -> Result<usize, SessionError> {
        let joined = tokio::select! {
            read = self.reader.read(buffer) => return Ok(read?),
            joined = &mut self.writer, if !self.writer_finished => joined,
        };
        self.writer_finished = true;
        Err(SessionError::Transport(writer_error(joined)))
    }

    /// Waits up to `drain` for queued lines to go out, then lets the
    /// connection close.
    async fn close(self, addr: SocketAddr, drain: Duration) {
        if self.writer_finished {
            return;
        }

        let abort = self.writer.abort_handle();
        match tokio::time::timeout(drain, self.writer).await {
            Ok(Ok(Ok(()))) => {}
            Ok(joined) => debug!("Writer for {} ended: {}", addr, writer_error(joined)),
            Err(_) => {
                warn!("Timed out flushing to {}; dropping queued lines", addr);
                abort.abort();
            }
        }
    }
}

/// Drains the outbox onto the connection, one `\n`-terminated line per message.
///
/// Returns once every `Outbound` for this connection is dropped, or on the
/// first write error.
async fn write_lines<W>(mut writer: W, mut outbox: Receiver<String>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = outbox.recv().await {
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
    }
    writer.shutdown().await
}

fn writer_error(joined: Result<io::Result<()>, JoinError>) -> io::Error {
    match joined {
        Ok(Err(e)) => e,
        Ok(Ok(())) => io::Error::new(io::ErrorKind::BrokenPipe, "writer closed"),
        Err(e) => io::Error::other(e),
    }
}
