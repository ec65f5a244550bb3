pub mod chat_client;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod router;
pub mod server;
pub mod storage;
pub mod utils;

pub use server::Server;
