//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Client registry errors
#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    CapacityExceeded { capacity: usize },
    SlotVacant(usize),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::CapacityExceeded { capacity } => {
                write!(f, "Chat room is full ({} clients)", capacity)
            }
            RegistryError::SlotVacant(slot) => write!(f, "Slot {} is not occupied", slot),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Session worker errors
#[derive(Debug)]
pub enum SessionError {
    HandshakeFailure(String),
    Transport(io::Error),
    InvalidTransition { from: String, to: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::HandshakeFailure(reason) => write!(f, "Handshake failed: {}", reason),
            SessionError::Transport(e) => write!(f, "Transport error: {}", e),
            SessionError::InvalidTransition { from, to } => {
                write!(f, "Invalid session transition: {} -> {}", from, to)
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl From<io::Error> for SessionError {
    fn from(error: io::Error) -> Self {
        SessionError::Transport(error)
    }
}

/// Reasons a message was dropped by the router
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum RoutingError {
    RoutingMiss(String),
    MalformedPrivate(String),
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::RoutingMiss(name) => write!(f, "No active client named {}", name),
            RoutingError::MalformedPrivate(raw) => {
                write!(f, "Malformed private message: {}", raw)
            }
        }
    }
}

impl std::error::Error for RoutingError {}

/// Chat log append errors
#[derive(Debug)]
pub struct ChatLogError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for ChatLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to append to {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for ChatLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Registry(RegistryError),
    Session(SessionError),
    Routing(RoutingError),
    ChatLog(ChatLogError),
    Config(config::ConfigError),
    Bind { addr: String, source: io::Error },
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Registry(e) => write!(f, "Registry error: {}", e),
            ChatServerError::Session(e) => write!(f, "Session error: {}", e),
            ChatServerError::Routing(e) => write!(f, "Routing error: {}", e),
            ChatServerError::ChatLog(e) => write!(f, "Chat log error: {}", e),
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::Bind { addr, source } => {
                write!(f, "Failed to bind to {}: {}", addr, source)
            }
        }
    }
}

impl std::error::Error for ChatServerError {}

// Implement conversions from specific errors to ChatServerError
impl From<RegistryError> for ChatServerError {
    fn from(error: RegistryError) -> Self {
        ChatServerError::Registry(error)
    }
}

impl From<SessionError> for ChatServerError {
    fn from(error: SessionError) -> Self {
        ChatServerError::Session(error)
    }
}

impl From<RoutingError> for ChatServerError {
    fn from(error: RoutingError) -> Self {
        ChatServerError::Routing(error)
    }
}

impl From<ChatLogError> for ChatServerError {
    fn from(error: ChatLogError) -> Self {
        ChatServerError::ChatLog(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}
