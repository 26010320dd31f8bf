//! command-hub - command registry and subscription broadcast core.
//!
//! Network-facing servers use the [`Registry`] to route inbound command lines
//! (`name/value1/value2/payload`) to handlers, and [`Subscriptions`] to push
//! notifications to the connections that asked for them. Transports, request
//! types and connections are supplied by the caller through the
//! [`RequestContext`] and [`Connection`] traits.
//!
//! Both stores are plain values: build them once and share them by reference
//! (or `Arc`) with every transport task.
//!
//! ```
//! use bytes::Bytes;
//! use command_hub::{CommandEntry, Origin, Registry, handler_fn};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let registry = Registry::new();
//! registry
//!     .add(
//!         CommandEntry::new("greet", Origin::ALL)
//!             .with_params("{name}")
//!             .with_handler(handler_fn(|_, _, req| {
//!                 Ok(Bytes::from(format!("hello {}", req.param("name")?)))
//!             })),
//!     )
//!     .unwrap();
//!
//! let reply = registry.dispatch_line(b"greet/world", Origin::WS).await.unwrap();
//! assert_eq!(&reply[..], b"hello world");
//! # });
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod subscription;
pub mod telemetry;

pub use command_proto::{CaseMode, Envelope, Origin, Pattern, Vars};
pub use commands::{
    CommandEntry, CommandHandler, DefaultRequest, ParsedCommand, Registry, RequestContext,
    handler_fn,
};
pub use config::Config;
pub use error::{ChannelError, CommandError, HandlerResult};
pub use subscription::{
    BroadcastSummary, Connection, ConnectionKey, Delivery, MpscConnection, Notifier,
    Subscriptions, notifier_fn,
};
