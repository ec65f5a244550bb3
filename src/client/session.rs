//! Client session lifecycle
//!
//! `Connecting -> Handshaking -> Active -> Disconnecting -> Terminated`, with a
//! shortcut from `Handshaking` straight to `Disconnecting` when the handshake
//! never completes.

use std::fmt;

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Handshaking,
    Active,
    Disconnecting,
    Terminated,
}

impl SessionState {
    fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Connecting, Handshaking)
                | (Handshaking, Active)
                | (Handshaking, Disconnecting)
                | (Active, Disconnecting)
                | (Disconnecting, Terminated)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "connecting",
            SessionState::Handshaking => "handshaking",
            SessionState::Active => "active",
            SessionState::Disconnecting => "disconnecting",
            SessionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Tracks where one connection is in its lifecycle.
pub struct ClientSession {
    state: SessionState,
    name: Option<String>,
    was_active: bool,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self {
            state: SessionState::Connecting,
            name: None,
            was_active: false,
        }
    }
}

impl ClientSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Display name, once the handshake has completed.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the session ever reached `Active`; decides if a leave notice is due.
    pub fn was_active(&self) -> bool {
        self.was_active
    }

    pub fn begin_handshake(&mut self) -> Result<(), SessionError> {
        self.advance(SessionState::Handshaking)
    }

    pub fn activate(&mut self, name: String) -> Result<(), SessionError> {
        self.advance(SessionState::Active)?;
        self.name = Some(name);
        self.was_active = true;
        Ok(())
    }

    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        self.advance(SessionState::Disconnecting)
    }

    pub fn terminate(&mut self) -> Result<(), SessionError> {
        self.advance(SessionState::Terminated)
    }

    fn advance(&mut self, next: SessionState) -> Result<(), SessionError> {
        if !self.state.can_advance_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }
}
