//! Module `state`
//!
//! Defines the `ConnectionHandle` held in the registry for every accepted
//! connection, and the `Outbound` endpoint used to write to it.

use log::debug;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Lines a connection may have queued before further lines are dropped
pub const DEFAULT_QUEUE_LEN: usize = 256;

/// Send side of a connection's writer task.
///
/// Cloning is cheap; the router copies these out of the registry so that no
/// network write ever happens under the registry lock. The queue is bounded:
/// a client that stops reading loses lines instead of growing the queue.
#[derive(Debug, Clone)]
pub struct Outbound {
    tx: mpsc::Sender<String>,
}

impl Outbound {
    /// Creates an endpoint with the default queue length and the receiver its
    /// writer task drains.
    pub fn channel() -> (Self, mpsc::Receiver<String>) {
        Self::bounded(DEFAULT_QUEUE_LEN)
    }

    pub fn bounded(queue_len: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(queue_len.max(1));
        (Self { tx }, rx)
    }

    /// Queues one line for delivery without waiting.
    ///
    /// Returns `false` if the line was dropped: the queue is full or the
    /// writer has gone away.
    pub fn send(&self, line: String) -> bool {
        match self.tx.try_send(line) {
            Ok(()) => true,
            Err(TrySendError::Full(line)) => {
                debug!("Outbound queue full, dropping: {}", line);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Represents one accepted connection.
///
/// Starts connected and unnamed; becomes active once the handshake supplies a
/// display name. The name never changes afterwards.
#[derive(Debug)]
pub struct ConnectionHandle {
    addr: SocketAddr,
    name: Option<String>,
    is_active: bool,
    outbound: Outbound,
}

impl ConnectionHandle {
    pub fn new(addr: SocketAddr, outbound: Outbound) -> Self {
        Self {
            addr,
            name: None,
            is_active: false,
            outbound,
        }
    }

    /// Names the connection and marks it active.
    ///
    /// Returns `false` without changing anything if it was already named.
    pub fn activate(&mut self, name: String) -> bool {
        if self.name.is_some() {
            return false;
        }
        self.name = Some(name);
        self.is_active = true;
        true
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn addr(&self) -> &SocketAddr {
        &self.addr
    }

    /// Returns the display name if the handshake has completed.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }
}
