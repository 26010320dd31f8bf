//! Command name case handling.
//!
//! Deployments disagree on whether `Get` and `get` name the same command, so
//! the choice is a [`CaseMode`] carried in configuration rather than a fixed
//! rule.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// How command names are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Names match byte for byte.
    #[default]
    Sensitive,
    /// Names are folded to lower case on registration and lookup.
    Insensitive,
}

/// Fold `name` according to `mode`.
///
/// Borrows when no change is needed.
pub fn fold_name(name: &str, mode: CaseMode) -> Cow<'_, str> {
    match mode {
        CaseMode::Sensitive => Cow::Borrowed(name),
        CaseMode::Insensitive if name.chars().any(char::is_uppercase) => {
            Cow::Owned(name.to_lowercase())
        }
        CaseMode::Insensitive => Cow::Borrowed(name),
    }
}
