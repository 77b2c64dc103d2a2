//! Event subscription bookkeeping
//!
//! Maps `(entity, event name)` targets to the attachments listening on them.
//! Registration order is delivery order. Subscriptions are owned: every
//! handle records which attachment created it, so the engine can sweep an
//! attachment's residual subscriptions when it detaches.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::behavior::{AttachmentKey, ListenerHandle};
use crate::scene::EntityKey;

/// One registered listener
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Entity the listener is on
    pub entity: EntityKey,
    /// Event name being listened for
    pub event: String,
    /// Attachment that owns the listener
    pub owner: AttachmentKey,
}

/// Table of all live subscriptions
#[derive(Default)]
pub struct SubscriptionTable {
    subscriptions: SlotMap<ListenerHandle, Subscription>,
    by_target: HashMap<(EntityKey, String), Vec<ListenerHandle>>,
}

impl SubscriptionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `event` on `entity`, owned by `owner`
    pub fn subscribe(
        &mut self,
        entity: EntityKey,
        event: &str,
        owner: AttachmentKey,
    ) -> ListenerHandle {
        let handle = self.subscriptions.insert(Subscription {
            entity,
            event: event.to_string(),
            owner,
        });
        self.by_target
            .entry((entity, event.to_string()))
            .or_default()
            .push(handle);
        handle
    }

    /// Remove a listener by its handle
    ///
    /// Removing a handle that was never added, or was already removed, is a
    /// safe no-op; returns whether anything was removed.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let Some(subscription) = self.subscriptions.remove(handle) else {
            log::debug!("unsubscribe of unknown listener handle, ignored");
            return false;
        };
        let target = (subscription.entity, subscription.event);
        if let Some(handles) = self.by_target.get_mut(&target) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.by_target.remove(&target);
            }
        }
        true
    }

    /// Snapshot the handles listening for `event` on `entity`
    ///
    /// A snapshot so that unsubscribes during delivery cannot invalidate the
    /// iteration; stale handles are skipped by the dispatcher.
    pub fn handlers_for(&self, entity: EntityKey, event: &str) -> Vec<ListenerHandle> {
        self.by_target
            .get(&(entity, event.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Look up the attachment owning a handle, if it is still live
    pub fn owner_of(&self, handle: ListenerHandle) -> Option<AttachmentKey> {
        self.subscriptions.get(handle).map(|s| s.owner)
    }

    /// Remove every subscription owned by an attachment; returns the count
    pub fn remove_owned_by(&mut self, owner: AttachmentKey) -> usize {
        let owned: Vec<ListenerHandle> = self
            .subscriptions
            .iter()
            .filter(|(_, s)| s.owner == owner)
            .map(|(handle, _)| handle)
            .collect();
        for handle in &owned {
            self.unsubscribe(*handle);
        }
        owned.len()
    }

    /// Total listeners registered on an entity, across all events
    pub fn count_for_entity(&self, entity: EntityKey) -> usize {
        self.subscriptions
            .values()
            .filter(|s| s.entity == entity)
            .count()
    }

    /// Total live subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscriptions exist
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (EntityKey, AttachmentKey) {
        // Fabricate keys through throwaway slotmaps; only identity matters.
        let mut entities = SlotMap::<EntityKey, ()>::with_key();
        let mut attachments = SlotMap::<AttachmentKey, ()>::with_key();
        (entities.insert(()), attachments.insert(()))
    }

    #[test]
    fn test_subscribe_and_dispatch_order() {
        let (entity, owner) = keys();
        let mut table = SubscriptionTable::new();

        let first = table.subscribe(entity, "ping", owner);
        let second = table.subscribe(entity, "ping", owner);

        assert_eq!(table.handlers_for(entity, "ping"), vec![first, second]);
        assert!(table.handlers_for(entity, "pong").is_empty());
    }

    #[test]
    fn test_unsubscribe_is_precise_and_idempotent() {
        let (entity, owner) = keys();
        let mut table = SubscriptionTable::new();

        let handle = table.subscribe(entity, "ping", owner);
        assert!(table.unsubscribe(handle));
        assert!(!table.unsubscribe(handle));
        assert!(table.handlers_for(entity, "ping").is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_owned_by_sweeps_everything() {
        let (entity, owner) = keys();
        let mut table = SubscriptionTable::new();

        table.subscribe(entity, "mouseenter", owner);
        table.subscribe(entity, "mouseleave", owner);
        assert_eq!(table.count_for_entity(entity), 2);

        assert_eq!(table.remove_owned_by(owner), 2);
        assert_eq!(table.count_for_entity(entity), 0);
    }
}
