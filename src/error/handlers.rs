//! Error handlers
//!
//! Decides how loudly each failure is reported. Everything except a listener
//! failure is local to one session.

use crate::error::types::{ChatServerError, SessionError};
use log::{debug, error, warn};

/// Log a chat server error at the level it deserves
pub fn handle_error(err: &ChatServerError) {
    match err {
        ChatServerError::Routing(e) => debug!("Message dropped: {}", e),
        ChatServerError::Session(SessionError::HandshakeFailure(_)) => {
            debug!("Session ended before joining: {}", err)
        }
        ChatServerError::Session(_) | ChatServerError::Registry(_) => warn!("{}", err),
        ChatServerError::ChatLog(_) => warn!("{}", err),
        _ => error!("Chat Server Error: {}", err),
    }
}

/// Whether the error should abort the whole process
pub fn is_fatal(err: &ChatServerError) -> bool {
    matches!(err, ChatServerError::Bind { .. } | ChatServerError::Config(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::{RegistryError, RoutingError};
    use std::io;

    #[test]
    fn only_startup_failures_are_fatal() {
        let bind = ChatServerError::Bind {
            addr: "0.0.0.0:8080".into(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(is_fatal(&bind));

        let full = ChatServerError::from(RegistryError::CapacityExceeded { capacity: 2 });
        assert!(!is_fatal(&full));

        let miss = ChatServerError::from(RoutingError::RoutingMiss("bob".into()));
        assert!(!is_fatal(&miss));
    }
}
