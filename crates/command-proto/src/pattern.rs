//! Command parameter patterns.
//!
//! A pattern is a slash-delimited list of placeholders such as
//! `{channel}/{limit}`. Compiling it yields the ordered parameter names that
//! [`bind_params`](crate::line::bind_params) binds positional values to.

use std::fmt;
use std::str::FromStr;

use crate::line::PARAM_SEPARATOR;

/// Compile a pattern into its ordered parameter names.
///
/// Each `/`-separated segment is trimmed of surrounding whitespace and braces.
/// An empty pattern yields an empty list. Empty segments are kept so that
/// positions stay aligned with the incoming values.
///
/// ```
/// use command_proto::compile;
///
/// assert_eq!(compile("{a}/{ b }"), vec!["a", "b"]);
/// assert!(compile("").is_empty());
/// ```
pub fn compile(pattern: &str) -> Vec<String> {
    if pattern.is_empty() {
        return Vec::new();
    }

    pattern
        .split(PARAM_SEPARATOR as char)
        .map(|segment| {
            segment
                .trim()
                .trim_matches(|c: char| c == '{' || c == '}')
                .trim()
                .to_string()
        })
        .collect()
}

/// A compiled parameter pattern: the source text plus its parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    names: Vec<String>,
}

impl Pattern {
    /// Compile `source` into a pattern.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let names = compile(&source);
        Self { source, names }
    }

    /// The pattern as it was written, e.g. `{a}/{b}`.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Ordered parameter names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of positional slots, including unnamed ones.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the pattern declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Pattern {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
