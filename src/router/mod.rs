//! Message routing
//!
//! Public broadcast, private delivery, and server notices over the client
//! registry.

pub mod core;

pub use self::core::{Dispatch, Origin, Router};
