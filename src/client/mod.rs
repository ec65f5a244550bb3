//! Client management system
//!
//! Handles client connections, the shared registry, and session lifecycle.

pub mod handler;
pub mod registry;
pub mod session;
pub mod state;

pub use handler::{AcceptedClient, SessionOutcome, handle_client};
pub use registry::{ClientRegistry, Recipient, SlotId};
pub use session::{ClientSession, SessionState};
pub use state::{ConnectionHandle, Outbound};
