//! Server core functionality
//!
//! This module contains the listener/acceptor and the counters used to
//! supervise detached session tasks.

pub mod core;
pub mod stats;

pub use self::core::Server;
pub use stats::{ServerStats, StatsSnapshot};
