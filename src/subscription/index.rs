//! Bidirectional (connection, command) index.
//!
//! Both directions hold the same `Arc<Pairing>`, and every mutation goes
//! through a method here that updates both maps together. Callers hold the
//! write lock around each mutation, so readers never see one direction
//! without the other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::channel::{Connection, ConnectionKey};
use super::notifier::Notifier;

/// One (connection, command) subscription.
pub(crate) struct Pairing<D> {
    pub command: String,
    pub data: RwLock<D>,
    pub notifier: Arc<dyn Notifier<D>>,
}

/// A subscriber of a command as seen from the by-command direction.
pub(crate) struct Subscriber<D> {
    pub conn: Arc<dyn Connection>,
    pub pairing: Arc<Pairing<D>>,
}

impl<D> Clone for Subscriber<D> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            pairing: Arc::clone(&self.pairing),
        }
    }
}

struct ConnectionEntry<D> {
    conn: Arc<dyn Connection>,
    commands: HashMap<String, Arc<Pairing<D>>>,
}

pub(crate) struct DualIndex<D> {
    /// Connection → command → pairing.
    by_connection: HashMap<ConnectionKey, ConnectionEntry<D>>,
    /// Command → connection → pairing. Empty buckets are removed.
    by_command: HashMap<String, HashMap<ConnectionKey, Subscriber<D>>>,
    pairings: usize,
}

impl<D> DualIndex<D> {
    pub fn new() -> Self {
        Self {
            by_connection: HashMap::new(),
            by_command: HashMap::new(),
            pairings: 0,
        }
    }

    /// Insert or replace the pairing for (`conn`, `pairing.command`).
    /// Returns true when an existing pairing was replaced.
    pub fn insert(&mut self, conn: &Arc<dyn Connection>, pairing: Arc<Pairing<D>>) -> bool {
        let key = ConnectionKey::of(conn);
        let command = pairing.command.clone();

        self.by_command.entry(command.clone()).or_default().insert(
            key,
            Subscriber {
                conn: Arc::clone(conn),
                pairing: Arc::clone(&pairing),
            },
        );

        let replaced = self
            .by_connection
            .entry(key)
            .or_insert_with(|| ConnectionEntry {
                conn: Arc::clone(conn),
                commands: HashMap::new(),
            })
            .commands
            .insert(command, pairing)
            .is_some();

        if !replaced {
            self.pairings += 1;
        }
        replaced
    }

    /// Remove one pairing. Returns false when it did not exist.
    pub fn remove(&mut self, key: ConnectionKey, command: &str) -> bool {
        let Some(entry) = self.by_connection.get_mut(&key) else {
            return false;
        };
        if entry.commands.remove(command).is_none() {
            return false;
        }
        if entry.commands.is_empty() {
            self.by_connection.remove(&key);
        }

        self.unlink_command(key, command);
        self.pairings -= 1;
        true
    }

    /// Remove every pairing of a connection. Returns how many were removed.
    pub fn remove_connection(&mut self, key: ConnectionKey) -> usize {
        let Some(entry) = self.by_connection.remove(&key) else {
            return 0;
        };

        let removed = entry.commands.len();
        for command in entry.commands.keys() {
            self.unlink_command(key, command);
        }
        self.pairings -= removed;
        removed
    }

    fn unlink_command(&mut self, key: ConnectionKey, command: &str) {
        if let Some(bucket) = self.by_command.get_mut(command) {
            bucket.remove(&key);
            if bucket.is_empty() {
                self.by_command.remove(command);
            }
        }
    }

    pub fn get(&self, key: ConnectionKey, command: &str) -> Option<&Arc<Pairing<D>>> {
        self.by_connection.get(&key)?.commands.get(command)
    }

    /// Snapshot of everyone subscribed to `command`.
    pub fn subscribers(&self, command: &str) -> Vec<Subscriber<D>> {
        self.by_command
            .get(command)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscriber_keys(&self, command: &str) -> Vec<ConnectionKey> {
        self.by_command
            .get(command)
            .map(|bucket| bucket.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn commands(&self) -> Vec<String> {
        self.by_command.keys().cloned().collect()
    }

    pub fn commands_of(&self, key: ConnectionKey) -> Vec<String> {
        self.by_connection
            .get(&key)
            .map(|entry| entry.commands.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn connection(&self, key: ConnectionKey) -> Option<&Arc<dyn Connection>> {
        self.by_connection.get(&key).map(|entry| &entry.conn)
    }

    pub fn connection_count(&self) -> usize {
        self.by_connection.len()
    }

    pub fn len(&self) -> usize {
        self.pairings
    }

    /// Both directions describe the same set of pairings.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        let forward: usize = self.by_connection.values().map(|e| e.commands.len()).sum();
        let reverse: usize = self.by_command.values().map(HashMap::len).sum();
        if forward != self.pairings || reverse != self.pairings {
            return false;
        }

        self.by_connection.iter().all(|(key, entry)| {
            !entry.commands.is_empty()
                && entry.commands.iter().all(|(command, pairing)| {
                    self.by_command
                        .get(command)
                        .and_then(|bucket| bucket.get(key))
                        .is_some_and(|sub| Arc::ptr_eq(&sub.pairing, pairing))
                })
        }) && self.by_command.values().all(|bucket| !bucket.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{MpscConnection, notifier_fn};
    use bytes::Bytes;

    fn conn() -> Arc<dyn Connection> {
        let (conn, _rx) = MpscConnection::new(1);
        conn
    }

    fn pairing(command: &str, data: u32) -> Arc<Pairing<u32>> {
        Arc::new(Pairing {
            command: command.to_string(),
            data: RwLock::new(data),
            notifier: notifier_fn(|_, _: u32| async { Ok(Bytes::new()) }),
        })
    }

    #[test]
    fn insert_links_both_directions() {
        let mut index = DualIndex::new();
        let a = conn();
        let key = ConnectionKey::of(&a);

        assert!(!index.insert(&a, pairing("tick", 1)));
        assert!(index.insert(&a, pairing("tick", 2)));

        assert_eq!(index.len(), 1);
        assert_eq!(*index.get(key, "tick").unwrap().data.read(), 2);
        assert_eq!(index.subscriber_keys("tick"), vec![key]);
        assert!(index.is_consistent());
    }

    #[test]
    fn removing_last_subscriber_drops_bucket() {
        let mut index = DualIndex::new();
        let a = conn();
        let b = conn();
        index.insert(&a, pairing("tick", 0));
        index.insert(&b, pairing("tick", 0));
        index.insert(&a, pairing("tock", 0));

        assert!(index.remove(ConnectionKey::of(&a), "tick"));
        assert_eq!(index.subscriber_keys("tick"), vec![ConnectionKey::of(&b)]);

        assert!(index.remove(ConnectionKey::of(&b), "tick"));
        assert!(!index.commands().contains(&"tick".to_string()));
        assert_eq!(index.connection_count(), 1);
        assert!(index.is_consistent());
    }

    #[test]
    fn remove_connection_prunes_every_bucket() {
        let mut index = DualIndex::new();
        let a = conn();
        for command in ["a", "b", "c"] {
            index.insert(&a, pairing(command, 0));
        }

        assert_eq!(index.remove_connection(ConnectionKey::of(&a)), 3);
        assert!(index.commands().is_empty());
        assert_eq!(index.connection_count(), 0);
        assert_eq!(index.len(), 0);
        assert!(index.is_consistent());
    }

    #[test]
    fn removing_unknown_is_noop() {
        let mut index: DualIndex<u32> = DualIndex::new();
        let a = conn();
        assert_eq!(index.remove_connection(ConnectionKey::of(&a)), 0);
        assert!(!index.remove(ConnectionKey::of(&a), "tick"));
        assert!(index.is_consistent());
    }
}
