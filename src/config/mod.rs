//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level [`Config`] and loading
//! - [`registry`]: Command registry naming rules ([`RegistryConfig`])
//! - [`subscriptions`]: Broadcast fan-out bounds ([`SubscriptionConfig`])
//! - [`log`]: Tracing subscriber settings ([`LogConfig`])
//! - [`validation`]: Startup checks

mod log;
mod registry;
mod subscriptions;
mod types;
mod validation;

pub use log::LogConfig;
pub use registry::RegistryConfig;
pub use subscriptions::SubscriptionConfig;
pub use types::{Config, ConfigError};
pub use validation::{ValidationError, validate};
