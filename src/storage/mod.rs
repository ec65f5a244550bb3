//! Persistent storage
//!
//! The server's only persisted state is its two append-only chat logs.

pub mod chat_log;

pub use chat_log::ChatLog;
