//! Subscription and broadcast engine.
//!
//! Connections subscribe to commands; a broadcast of a command runs each
//! subscriber's notifier concurrently and pushes the result to that
//! subscriber as an [`Envelope`](command_proto::Envelope).
//!
//! - [`Connection`]: the external sink a notification is sent through
//! - [`Notifier`]: per-pairing handler producing the notification payload
//! - [`Subscriptions`]: the dual-indexed pairing store

mod channel;
mod index;
mod manager;
mod notifier;

pub use channel::{Connection, ConnectionKey, MpscConnection, Session};
pub use manager::{BroadcastSummary, Delivery, Subscriptions};
pub use notifier::{FnNotifier, Notifier, notifier_fn};
