//! Connection channel abstraction.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::ChannelError;

/// Opaque per-connection session value. Never inspected by this crate.
pub type Session = Arc<dyn Any + Send + Sync>;

/// A client connection owned by a transport.
///
/// The transport decides what a send means (socket write, queue push, ...).
/// This crate never detects disconnects; the owner calls
/// [`Subscriptions::del_con`](super::Subscriptions::del_con) when the
/// connection goes away.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Session attached by the transport, if any.
    fn user(&self) -> Option<Session>;

    fn set_user(&self, session: Session);

    /// Deliver one serialized envelope.
    async fn send(&self, payload: Bytes) -> Result<(), ChannelError>;
}

/// Identity of a shared connection.
///
/// Two handles are the same connection when they point at the same
/// allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionKey(usize);

impl ConnectionKey {
    pub fn of(conn: &Arc<dyn Connection>) -> Self {
        Self(Arc::as_ptr(conn) as *const () as usize)
    }
}

/// Connection backed by a bounded tokio mpsc queue.
///
/// For transports that drain a per-client outbound queue from a writer task.
pub struct MpscConnection {
    tx: mpsc::Sender<Bytes>,
    session: Mutex<Option<Session>>,
}

impl MpscConnection {
    /// Create a connection and the receiver its writer task drains.
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = Arc::new(Self {
            tx,
            session: Mutex::new(None),
        });
        (conn, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl Connection for MpscConnection {
    fn user(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    fn set_user(&self, session: Session) {
        *self.session.lock() = Some(session);
    }

    async fn send(&self, payload: Bytes) -> Result<(), ChannelError> {
        self.tx.send(payload).await.map_err(|_| ChannelError::Closed)
    }
}
