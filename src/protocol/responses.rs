//! Chat line formatting
//!
//! Every line the server writes to a client or a log is built here.

use std::net::SocketAddr;

/// Prefix for notices originating from the server itself
pub const SYSTEM_PREFIX: &str = "SERVER:";

pub const ROOM_FULL: &str = "Chat room is full. Try again later.";

/// First line of the public log for every server run
pub const SERVER_STARTED: &str = "Server started. Waiting for connections...";

/// `[alice] body`
pub fn format_public(sender: &str, body: &str) -> String {
    format!("[{}] {}", sender, body)
}

/// `[PRIVATE from alice] body`, delivered to the recipient
pub fn format_private_from(sender: &str, body: &str) -> String {
    format!("[PRIVATE from {}] {}", sender, body)
}

/// `[PRIVATE to bob] body`, echoed back to the sender
pub fn format_private_to(recipient: &str, body: &str) -> String {
    format!("[PRIVATE to {}] {}", recipient, body)
}

/// `alice -> bob: body`, as written to the private log
pub fn format_private_record(sender: &str, recipient: &str, body: &str) -> String {
    format!("{} -> {}: {}", sender, recipient, body)
}

/// `SERVER: text`
pub fn format_system(text: &str) -> String {
    format!("{} {}", SYSTEM_PREFIX, text)
}

pub fn join_notice(name: &str) -> String {
    format!("{} has joined the chat", name)
}

pub fn leave_notice(name: &str) -> String {
    format!("{} has left the chat", name)
}

/// Logged when a connection is given a slot
pub fn new_connection(addr: SocketAddr) -> String {
    format!("New connection from {}", addr)
}
