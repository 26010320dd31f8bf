//! Tracing setup and command timing.

use std::time::Instant;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.filter` when set. Fails if a global
/// subscriber is already installed.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
    }
    Ok(())
}

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use command_proto::Origin;
    use tracing::{Span, debug_span, info_span};

    /// Span for one command execution.
    pub fn command(name: &str, origin: Origin) -> Span {
        info_span!("command", name = %name, origin = %origin)
    }

    /// Span for one broadcast of `command` to its subscribers.
    pub fn broadcast(command: &str, subscribers: usize) -> Span {
        info_span!("broadcast", command = %command, subscribers)
    }

    /// Span for a single subscriber notification.
    pub fn notify(command: &str) -> Span {
        debug_span!("notify", command = %command)
    }
}
