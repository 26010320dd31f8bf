//! Integration test common infrastructure.
//!
//! Provides a connection that records every envelope it is sent, and helpers
//! for building registries and notifiers.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use command_hub::subscription::Session;
use command_hub::{ChannelError, Connection, Envelope};
use parking_lot::Mutex;

/// Connection that keeps every payload it is sent.
#[derive(Default)]
pub struct RecordingConnection {
    sent: Mutex<Vec<Bytes>>,
    session: Mutex<Option<Session>>,
    fail_sends: bool,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A connection whose every send fails.
    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail_sends: true,
            ..Self::default()
        })
    }

    /// Envelopes received so far, decoded.
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.sent
            .lock()
            .iter()
            .map(|raw| Envelope::from_slice(raw).expect("valid envelope"))
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn user(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    fn set_user(&self, session: Session) {
        *self.session.lock() = Some(session);
    }

    async fn send(&self, payload: Bytes) -> Result<(), ChannelError> {
        if self.fail_sends {
            return Err(ChannelError::Send("peer reset".into()));
        }
        self.sent.lock().push(payload);
        Ok(())
    }
}

/// Erase a recording connection to the trait object the store keys on.
pub fn as_dyn(conn: &Arc<RecordingConnection>) -> Arc<dyn Connection> {
    Arc::clone(conn) as Arc<dyn Connection>
}
