//! Session supervision counters
//!
//! Session tasks are detached; these counters are how their completion is
//! observed.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::client::SessionOutcome;

#[derive(Debug, Default)]
pub struct ServerStats {
    accepted: AtomicUsize,
    rejected: AtomicUsize,
    active: AtomicUsize,
    completed: AtomicUsize,
    never_joined: AtomicUsize,
    messages: AtomicUsize,
}

/// Point-in-time copy of `ServerStats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub accepted: usize,
    pub rejected: usize,
    pub active: usize,
    pub completed: usize,
    pub never_joined: usize,
    pub messages: usize,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection got a slot and a session task.
    pub fn session_started(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection was turned away because the room was full.
    pub fn session_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_finished(&self, outcome: &SessionOutcome) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed);
        match outcome {
            SessionOutcome::Left { messages, .. } => {
                self.messages.fetch_add(*messages, Ordering::Relaxed);
            }
            SessionOutcome::NeverJoined => {
                self.never_joined.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            never_joined: self.never_joined.load(Ordering::Relaxed),
            messages: self.messages.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_session_lifecycle() {
        let stats = ServerStats::new();
        stats.session_started();
        stats.session_started();
        stats.session_rejected();
        stats.session_finished(&SessionOutcome::Left {
            name: "alice".into(),
            messages: 3,
        });
        stats.session_finished(&SessionOutcome::NeverJoined);

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                accepted: 2,
                rejected: 1,
                active: 0,
                completed: 2,
                never_joined: 1,
                messages: 3,
            }
        );
    }
}
