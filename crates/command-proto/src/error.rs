//! Error types for the command wire format.
//!
//! Parsing a command line never fails (malformed input degrades to an empty
//! parameter set), so these errors cover framing and envelope serialization.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A command line exceeded the codec limit.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length seen so far.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// Envelope could not be parsed.
    #[error("failed to decode envelope: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ProtocolError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::LineTooLong { .. } => "line_too_long",
            Self::Encode(_) => "encode",
            Self::Decode(_) => "decode",
        }
    }
}
