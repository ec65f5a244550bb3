//! Client registry
//!
//! A fixed-capacity slot table of connected clients behind one lock. Free
//! slots sit on a stack, so insert and remove never scan. Every operation
//! holds the lock only for in-memory work; callers copy out the `Outbound`
//! endpoints they need and write after the lock is released.

use log::debug;
use std::net::SocketAddr;
use tokio::sync::Mutex;

use crate::client::state::{ConnectionHandle, Outbound};
use crate::error::RegistryError;

/// Stable identifier for an occupied slot.
///
/// The generation changes every time the slot is freed, so an identifier kept
/// past its owner's removal can never touch the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: usize,
    generation: u64,
}

impl SlotId {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Point-in-time copy of an active client, as handed to the router.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub slot: SlotId,
    pub name: String,
    pub outbound: Outbound,
}

struct Slot {
    generation: u64,
    handle: Option<ConnectionHandle>,
}

struct Slots {
    table: Vec<Slot>,
    free: Vec<usize>,
    count: usize,
}

impl Slots {
    fn occupied(&mut self, slot: SlotId) -> Option<&mut ConnectionHandle> {
        let entry = self.table.get_mut(slot.index)?;
        if entry.generation != slot.generation {
            return None;
        }
        entry.handle.as_mut()
    }
}

/// Registry for tracking connected clients
pub struct ClientRegistry {
    capacity: usize,
    slots: Mutex<Slots>,
}

impl ClientRegistry {
    pub fn new(capacity: usize) -> Self {
        let table = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                handle: None,
            })
            .collect();
        // Reversed so the lowest free slot is handed out first
        let free = (0..capacity).rev().collect();

        Self {
            capacity,
            slots: Mutex::new(Slots {
                table,
                free,
                count: 0,
            }),
        }
    }

    /// Reserves a slot for a freshly accepted, still unnamed connection.
    pub async fn insert(
        &self,
        addr: SocketAddr,
        outbound: Outbound,
    ) -> Result<SlotId, RegistryError> {
        let mut slots = self.slots.lock().await;

        let index = slots.free.pop().ok_or(RegistryError::CapacityExceeded {
            capacity: self.capacity,
        })?;

        let entry = &mut slots.table[index];
        entry.handle = Some(ConnectionHandle::new(addr, outbound));
        let slot = SlotId {
            index,
            generation: entry.generation,
        };
        slots.count += 1;

        Ok(slot)
    }

    /// Frees a slot. Removing a slot that is already free is a no-op.
    ///
    /// Returns the display name if the connection had completed its handshake.
    pub async fn remove(&self, slot: SlotId) -> Option<String> {
        let mut slots = self.slots.lock().await;

        slots.occupied(slot)?;
        let entry = &mut slots.table[slot.index];
        entry.generation += 1;
        let mut handle = entry.handle.take()?;

        handle.deactivate();
        slots.count -= 1;
        slots.free.push(slot.index);
        debug!("Freed slot {} held by {}", slot.index, handle.addr());

        handle.name().map(str::to_string)
    }

    /// Names a connection and makes it visible to `snapshot` and `find_by_name`.
    pub async fn set_active(&self, slot: SlotId, name: &str) -> Result<(), RegistryError> {
        let mut slots = self.slots.lock().await;

        let handle = slots
            .occupied(slot)
            .ok_or(RegistryError::SlotVacant(slot.index))?;
        handle.activate(name.to_string());

        Ok(())
    }

    /// Copies out every active client, in slot order.
    pub async fn snapshot(&self) -> Vec<Recipient> {
        let slots = self.slots.lock().await;

        slots
            .table
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let handle = entry.handle.as_ref().filter(|h| h.is_active())?;
                Some(Recipient {
                    slot: SlotId {
                        index,
                        generation: entry.generation,
                    },
                    name: handle.name()?.to_string(),
                    outbound: handle.outbound().clone(),
                })
            })
            .collect()
    }

    /// Finds an active client by display name.
    ///
    /// Duplicate names resolve to the lowest occupied slot.
    pub async fn find_by_name(&self, name: &str) -> Option<Recipient> {
        let slots = self.slots.lock().await;

        slots
            .table
            .iter()
            .enumerate()
            .find_map(|(index, entry)| {
                let handle = entry.handle.as_ref().filter(|h| h.is_active())?;
                (handle.name()? == name).then(|| Recipient {
                    slot: SlotId {
                        index,
                        generation: entry.generation,
                    },
                    name: name.to_string(),
                    outbound: handle.outbound().clone(),
                })
            })
    }

    /// Display names of active clients, in slot order.
    pub async fn active_names(&self) -> Vec<String> {
        self.snapshot()
            .await
            .into_iter()
            .map(|recipient| recipient.name)
            .collect()
    }

    /// Number of occupied slots, named or not.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    async fn join(registry: &ClientRegistry, port: u16, name: &str) -> SlotId {
        let (outbound, _rx) = Outbound::channel();
        let slot = registry.insert(addr(port), outbound).await.unwrap();
        registry.set_active(slot, name).await.unwrap();
        slot
    }

    #[tokio::test]
    async fn insert_fails_when_full() {
        let registry = ClientRegistry::new(2);
        join(&registry, 1, "alice").await;
        join(&registry, 2, "bob").await;

        let (outbound, _rx) = Outbound::channel();
        let err = registry.insert(addr(3), outbound).await.unwrap_err();
        assert_eq!(err, RegistryError::CapacityExceeded { capacity: 2 });
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn unnamed_connections_are_not_in_snapshot() {
        let registry = ClientRegistry::new(4);
        let (outbound, _rx) = Outbound::channel();
        let pending = registry.insert(addr(1), outbound).await.unwrap();
        join(&registry, 2, "bob").await;

        assert_eq!(registry.active_names().await, vec!["bob"]);
        assert_eq!(registry.len().await, 2);

        registry.set_active(pending, "alice").await.unwrap();
        assert_eq!(registry.active_names().await, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn remove_is_idempotent_and_frees_the_slot() {
        let registry = ClientRegistry::new(1);
        let slot = join(&registry, 1, "alice").await;

        assert_eq!(registry.remove(slot).await, Some("alice".to_string()));
        assert_eq!(registry.remove(slot).await, None);
        assert!(registry.is_empty().await);

        let reused = join(&registry, 2, "bob").await;
        assert_eq!(reused.index(), slot.index());
    }

    #[tokio::test]
    async fn stale_slot_id_does_not_touch_new_occupant() {
        let registry = ClientRegistry::new(1);
        let old = join(&registry, 1, "alice").await;
        registry.remove(old).await;
        join(&registry, 2, "bob").await;

        assert_eq!(registry.remove(old).await, None);
        assert_eq!(
            registry.set_active(old, "mallory").await,
            Err(RegistryError::SlotVacant(old.index()))
        );
        assert_eq!(registry.active_names().await, vec!["bob"]);
    }

    #[tokio::test]
    async fn find_by_name_prefers_lowest_slot() {
        let registry = ClientRegistry::new(3);
        let first = join(&registry, 1, "sam").await;
        join(&registry, 2, "alice").await;
        join(&registry, 3, "sam").await;

        let found = registry.find_by_name("sam").await.unwrap();
        assert_eq!(found.slot, first);
        assert!(registry.find_by_name("nobody").await.is_none());
    }

    #[tokio::test]
    async fn concurrent_joins_each_appear_once() {
        let registry = Arc::new(ClientRegistry::new(50));

        let mut tasks = Vec::new();
        for i in 0..50u16 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                join(&registry, 1000 + i, &format!("user{i}")).await
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut names = registry.active_names().await;
        assert_eq!(names.len(), 50);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 50);
    }
}
