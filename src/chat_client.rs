//! Terminal chat client
//!
//! Sends the display name, then forwards input lines to the server while
//! printing everything the server sends back.

use log::debug;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};

pub const DISCONNECTED: &str = "Disconnected from server";

/// Runs a client session over `stream` until the server hangs up or `input`
/// runs dry.
pub async fn run_client<S, I, O>(stream: S, name: &str, input: I, mut output: O) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin + Send + 'static,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "display name cannot be empty",
        ));
    }

    let (mut server_in, mut server_out) = tokio::io::split(stream);
    server_out.write_all(format!("{}\n", name).as_bytes()).await?;

    let mut receiver = tokio::spawn(async move {
        tokio::io::copy(&mut server_in, &mut output).await?;
        output
            .write_all(format!("{}\n", DISCONNECTED).as_bytes())
            .await?;
        output.flush().await
    });

    let mut lines = input.lines();
    loop {
        tokio::select! {
            received = &mut receiver => {
                return received.map_err(io::Error::other)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                server_out.write_all(format!("{}\n", line).as_bytes()).await?;
            }
        }
    }

    debug!("Input closed, leaving the chat");
    server_out.shutdown().await?;
    receiver.await.map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, BufReader, duplex};

    #[tokio::test]
    async fn sends_name_then_lines() {
        let (client_side, mut server_side) = duplex(1024);
        let (output, mut screen) = duplex(1024);
        let input = BufReader::new(&b"hello\n\n@bob psst\n"[..]);

        let client = tokio::spawn(async move { run_client(client_side, "alice", input, output).await });

        let mut sent = String::new();
        server_side.read_to_string(&mut sent).await.unwrap();
        assert_eq!(sent, "alice\nhello\n@bob psst\n");

        drop(server_side);
        client.await.unwrap().unwrap();

        let mut shown = String::new();
        screen.read_to_string(&mut shown).await.unwrap();
        assert_eq!(shown, format!("{}\n", DISCONNECTED));
    }

    #[tokio::test]
    async fn prints_server_lines() {
        let (client_side, mut server_side) = duplex(1024);
        let (output, mut screen) = duplex(1024);
        // Never yields a line, so only the server can end the session
        let (_keyboard, idle) = duplex(16);
        let input = BufReader::new(idle);

        let client = tokio::spawn(async move { run_client(client_side, "bob", input, output).await });

        let mut name = [0u8; 4];
        server_side.read_exact(&mut name).await.unwrap();
        assert_eq!(&name, b"bob\n");
        server_side.write_all(b"[alice] hi\n").await.unwrap();
        drop(server_side);

        client.await.unwrap().unwrap();
        let mut shown = String::new();
        screen.read_to_string(&mut shown).await.unwrap();
        assert_eq!(shown, format!("[alice] hi\n{}\n", DISCONNECTED));
    }

    #[tokio::test]
    async fn blank_name_is_refused() {
        let (client_side, _server_side) = duplex(64);
        let input = BufReader::new(&b""[..]);
        let err = run_client(client_side, "   ", input, tokio::io::sink())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
