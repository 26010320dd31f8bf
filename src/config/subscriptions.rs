//! Subscription broadcast configuration.

use serde::Deserialize;

/// Broadcast fan-out settings.
///
/// A broadcast spawns one task per subscriber. By default nothing bounds how
/// many of those run at once; a non-zero `max_concurrent_notifications` caps
/// the notifier calls in flight per broadcast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionConfig {
    /// Maximum notifier calls in flight per broadcast (0 = unbounded).
    #[serde(default)]
    pub max_concurrent_notifications: usize,
}

impl SubscriptionConfig {
    /// The configured bound, or `None` for unbounded fan-out.
    pub fn fanout_limit(&self) -> Option<usize> {
        match self.max_concurrent_notifications {
            0 => None,
            n => Some(n),
        }
    }
}
