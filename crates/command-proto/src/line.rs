//! Command line parsing and positional parameter binding.
//!
//! The wire format is `name[/value1[/value2[...]]]`. Parsing happens in two
//! steps so that an unknown command name can be rejected before any binding
//! work is done:
//!
//! 1. [`parse_line`] splits once on the first `/` into a name and a raw tail.
//! 2. [`bind_params`] splits the tail into at most `names.len() + 1` parts.
//!    The first parts bind positionally; whatever is left, separators
//!    included, becomes the opaque payload.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;

/// Separator between the command name, its parameters and the payload.
pub const PARAM_SEPARATOR: u8 = b'/';

/// Bound path parameters, keyed by placeholder name.
pub type Vars = HashMap<String, String>;

/// Split a command line into its name and raw parameter tail.
///
/// The tail is `None` when the line contains no separator at all.
/// Invalid UTF-8 in the name is replaced rather than rejected.
///
/// ```
/// use command_proto::parse_line;
///
/// assert_eq!(parse_line(b"help"), ("help".into(), None));
/// assert_eq!(parse_line(b"get/1/2"), ("get".into(), Some(&b"1/2"[..])));
/// ```
pub fn parse_line(line: &[u8]) -> (Cow<'_, str>, Option<&[u8]>) {
    let mut parts = line.splitn(2, |b| *b == PARAM_SEPARATOR);
    let name = parts.next().unwrap_or_default();
    (String::from_utf8_lossy(name), parts.next())
}

/// Result of binding a raw parameter tail against a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bound {
    /// Named values, one per non-empty placeholder.
    pub vars: Vars,
    /// Everything after the last placeholder, unsplit.
    pub payload: Bytes,
}

impl Bound {
    /// Value bound to `name`, or `""` when the pattern has no such slot.
    pub fn param(&self, name: &str) -> &str {
        self.vars.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Bind `raw` positionally to `names`.
///
/// Missing trailing values bind to the empty string, and an absent tail binds
/// every placeholder to the empty string. Placeholders with an empty name hold
/// a position but are not bound.
pub fn bind_params(raw: Option<&[u8]>, names: &[String]) -> Bound {
    let raw = raw.unwrap_or_default();
    let parts: Vec<&[u8]> = raw
        .splitn(names.len() + 1, |b| *b == PARAM_SEPARATOR)
        .collect();

    let mut vars = Vars::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        let value = parts
            .get(i)
            .map(|part| String::from_utf8_lossy(part).into_owned())
            .unwrap_or_default();
        vars.insert(name.clone(), value);
    }

    let payload = if parts.len() > names.len() {
        parts
            .last()
            .map(|rest| Bytes::copy_from_slice(rest))
            .unwrap_or_default()
    } else {
        Bytes::new()
    };

    Bound { vars, payload }
}
