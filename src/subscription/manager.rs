//! Subscription store and broadcast fan-out.

use std::sync::Arc;

use command_proto::Envelope;
use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, warn};

use super::channel::{Connection, ConnectionKey};
use super::index::{DualIndex, Pairing, Subscriber};
use super::notifier::Notifier;
use crate::config::SubscriptionConfig;
use crate::error::{CommandError, HandlerResult};
use crate::metrics;
use crate::telemetry::spans;

/// Outcome of [`Subscriptions::exec_con_cmd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// An envelope was sent.
    Sent,
    /// The connection is not subscribed to the command; nothing was sent.
    NotSubscribed,
}

/// Counts from one [`Subscriptions::broadcast`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Subscribers in the snapshot.
    pub subscribers: usize,
    /// Envelopes accepted by their connection, error envelopes included.
    pub delivered: usize,
    /// Notifiers that returned an error.
    pub handler_errors: usize,
    /// Envelopes a connection refused.
    pub send_failures: usize,
    /// Notification tasks that panicked.
    pub task_failures: usize,
}

/// Result of notifying one subscriber.
struct Notified {
    result: HandlerResult,
    sent: Result<(), CommandError>,
}

impl BroadcastSummary {
    fn record(&mut self, notified: &Notified) {
        if notified.result.is_err() {
            self.handler_errors += 1;
        }
        match notified.sent {
            Ok(()) => self.delivered += 1,
            Err(_) => self.send_failures += 1,
        }
    }
}

/// Dual-indexed store of (connection, command) pairings.
///
/// `D` is the data associated with each pairing; its notifier receives a
/// clone of it on every notification. Mutations take the write lock; lookups
/// and broadcast snapshots take the read lock. No lock is held while a
/// notifier runs or a connection sends.
pub struct Subscriptions<D = serde_json::Value> {
    index: RwLock<DualIndex<D>>,
    fanout_limit: Option<usize>,
}

impl<D> Subscriptions<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Empty store with unbounded fan-out.
    pub fn new() -> Self {
        Self::with_config(&SubscriptionConfig::default())
    }

    pub fn with_config(config: &SubscriptionConfig) -> Self {
        Self {
            index: RwLock::new(DualIndex::new()),
            fanout_limit: config.fanout_limit(),
        }
    }

    /// Subscribe `conn` to `command`, replacing any existing pairing.
    pub fn subscribe_cmd(
        &self,
        conn: &Arc<dyn Connection>,
        command: impl Into<String>,
        data: D,
        notifier: Arc<dyn Notifier<D>>,
    ) {
        let pairing = Arc::new(Pairing {
            command: command.into(),
            data: RwLock::new(data),
            notifier,
        });
        let command = pairing.command.clone();

        let (replaced, total) = {
            let mut index = self.index.write();
            let replaced = index.insert(conn, pairing);
            (replaced, index.len())
        };

        metrics::set_subscriptions(total);
        debug!(command = %command, conn = ?ConnectionKey::of(conn), replaced, "Subscribed");
    }

    /// Remove every pairing of `conn`. A connection without pairings is a
    /// no-op. Returns how many pairings were removed.
    pub fn del_con(&self, conn: &Arc<dyn Connection>) -> usize {
        let key = ConnectionKey::of(conn);
        let (removed, total) = {
            let mut index = self.index.write();
            let removed = index.remove_connection(key);
            (removed, index.len())
        };

        if removed > 0 {
            metrics::set_subscriptions(total);
            debug!(conn = ?key, removed, "Connection unsubscribed");
        }
        removed
    }

    /// Remove the pairing of `conn` and `command`. Returns false when it did
    /// not exist.
    pub fn del_con_cmd(&self, conn: &Arc<dyn Connection>, command: &str) -> bool {
        let key = ConnectionKey::of(conn);
        let (removed, total) = {
            let mut index = self.index.write();
            let removed = index.remove(key, command);
            (removed, index.len())
        };

        if removed {
            metrics::set_subscriptions(total);
            debug!(command = %command, conn = ?key, "Unsubscribed");
        }
        removed
    }

    pub fn exists(&self, conn: &Arc<dyn Connection>, command: &str) -> bool {
        self.index
            .read()
            .get(ConnectionKey::of(conn), command)
            .is_some()
    }

    /// Data associated with the pairing, if subscribed.
    pub fn data(&self, conn: &Arc<dyn Connection>, command: &str) -> Option<D> {
        let index = self.index.read();
        let pairing = index.get(ConnectionKey::of(conn), command)?;
        let data = pairing.data.read().clone();
        Some(data)
    }

    /// Replace the pairing's data in place.
    ///
    /// Silently does nothing when the pairing does not exist; use
    /// [`exists`](Self::exists) first when that matters.
    pub fn update_data(&self, conn: &Arc<dyn Connection>, command: &str, data: D) {
        let index = self.index.read();
        if let Some(pairing) = index.get(ConnectionKey::of(conn), command) {
            *pairing.data.write() = data;
        }
    }

    /// Notify every current subscriber of `command` and wait for all of them.
    ///
    /// The subscriber set is snapshotted under the read lock; subscriptions
    /// changed while the broadcast runs only affect later broadcasts. Each
    /// subscriber gets exactly one envelope. A notifier error goes into that
    /// subscriber's envelope and is counted, never returned.
    pub async fn broadcast(&self, command: &str) -> BroadcastSummary {
        let subscribers = self.index.read().subscribers(command);
        let mut summary = BroadcastSummary {
            subscribers: subscribers.len(),
            ..BroadcastSummary::default()
        };
        if subscribers.is_empty() {
            return summary;
        }

        metrics::record_fanout(subscribers.len());
        let limit = self.fanout_limit.map(|n| Arc::new(Semaphore::new(n)));

        let mut set = JoinSet::new();
        for Subscriber { conn, pairing } in subscribers {
            let limit = limit.clone();
            let span = spans::notify(&pairing.command);
            set.spawn(
                async move {
                    let _permit = match limit {
                        Some(sem) => sem.acquire_owned().await.ok(),
                        None => None,
                    };
                    notify_one(conn.as_ref(), &pairing).await
                }
                .instrument(span),
            );
        }

        let span = spans::broadcast(command, summary.subscribers);
        async {
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(notified) => summary.record(&notified),
                    Err(e) => {
                        warn!(error = %e, "Notification task failed");
                        summary.task_failures += 1;
                    }
                }
            }
        }
        .instrument(span)
        .await;

        debug!(
            command = %command,
            delivered = summary.delivered,
            handler_errors = summary.handler_errors,
            send_failures = summary.send_failures,
            "Broadcast complete"
        );
        summary
    }

    /// Notify a single subscriber of `command`.
    ///
    /// Returns [`Delivery::NotSubscribed`] without sending anything when the
    /// pairing does not exist. A notifier error is sent in the envelope and
    /// then returned unchanged; a send failure is returned after that.
    pub async fn exec_con_cmd(
        &self,
        conn: &Arc<dyn Connection>,
        command: &str,
    ) -> Result<Delivery, CommandError> {
        let pairing = self
            .index
            .read()
            .get(ConnectionKey::of(conn), command)
            .cloned();
        let Some(pairing) = pairing else {
            return Ok(Delivery::NotSubscribed);
        };

        let notified = notify_one(conn.as_ref(), &pairing).await;
        notified.result?;
        notified.sent?;
        Ok(Delivery::Sent)
    }

    /// Commands with at least one subscriber.
    pub fn commands(&self) -> Vec<String> {
        self.index.read().commands()
    }

    /// Connections subscribed to `command`.
    pub fn subscribers(&self, command: &str) -> Vec<Arc<dyn Connection>> {
        self.index
            .read()
            .subscribers(command)
            .into_iter()
            .map(|sub| sub.conn)
            .collect()
    }

    /// Commands `conn` is subscribed to.
    pub fn subscriptions_of(&self, conn: &Arc<dyn Connection>) -> Vec<String> {
        self.index.read().commands_of(ConnectionKey::of(conn))
    }

    /// Connections holding at least one pairing.
    pub fn connection_count(&self) -> usize {
        self.index.read().connection_count()
    }

    /// Total pairings.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D> Default for Subscriptions<D>
where
    D: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Run the pairing's notifier and send the resulting envelope to `conn`.
async fn notify_one<D>(conn: &dyn Connection, pairing: &Pairing<D>) -> Notified
where
    D: Clone + Send + Sync + 'static,
{
    let data = pairing.data.read().clone();
    let result = pairing.notifier.notify(&pairing.command, data).await;
    if let Err(ref e) = result {
        debug!(command = %pairing.command, error = %e, "Notifier error");
    }

    let envelope = Envelope::from_result(&pairing.command, &result);
    let sent = match envelope.to_bytes() {
        Ok(bytes) => conn.send(bytes).await.map_err(CommandError::from),
        Err(e) => Err(CommandError::from(e)),
    };

    metrics::record_envelope(sent.is_ok());
    if let Err(ref e) = sent {
        warn!(command = %pairing.command, error = %e, "Failed to deliver envelope");
    }

    Notified { result, sent }
}
