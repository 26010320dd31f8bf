//! Command registry configuration.

use command_proto::CaseMode;
use serde::Deserialize;

/// Command registry naming rules.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// How command names are compared (default: sensitive).
    #[serde(default)]
    pub case: CaseMode,
    /// Reject empty command names on add (default: true).
    #[serde(default = "default_true")]
    pub strict_names: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            case: CaseMode::default(),
            strict_names: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}
