//! Chat protocol implementation
//!
//! Handles message framing, addressing, and line formatting.

pub mod commands;
pub mod parser;
pub mod responses;

pub use commands::{Message, parse_message};
pub use parser::{ChunkDecoder, parse_username, split_messages};
