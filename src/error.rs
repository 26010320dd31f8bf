//! Unified error handling for command-hub.
//!
//! This module provides the error hierarchy shared by the command registry and
//! the subscription engine, with automatic conversions and metric labeling.

use bytes::Bytes;
use command_proto::ProtocolError;
use thiserror::Error;

// ============================================================================
// Command Errors (registry + handlers)
// ============================================================================

/// Errors surfaced by command dispatch and by handlers themselves.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Unknown command name, or unknown subscription pairing.
    #[error("command '{0}' not found")]
    NotFound(String),

    /// The request context lacks a capability the handler requires.
    #[error("incorrect input data")]
    IncorrectInput,

    /// Registration with an empty name under strict naming.
    #[error("command name is empty")]
    EmptyName,

    /// Plain-text application error returned by a handler.
    #[error("{0}")]
    Message(String),

    /// Application error returned by a handler.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl CommandError {
    /// Shorthand for a plain-text handler error.
    pub fn msg(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::IncorrectInput => "incorrect_input",
            Self::EmptyName => "empty_name",
            Self::Message(_) | Self::Handler(_) => "handler_error",
            Self::Channel(_) => "channel_error",
            Self::Protocol(_) => "protocol_error",
        }
    }

    /// True for errors produced by application handler code.
    pub fn is_handler_error(&self) -> bool {
        matches!(self, Self::Message(_) | Self::Handler(_))
    }
}

/// Result type for command and notification handlers.
pub type HandlerResult = Result<Bytes, CommandError>;

// ============================================================================
// Channel Errors (connection sends)
// ============================================================================

/// Failures of a [`Connection`](crate::subscription::Connection) send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("connection closed")]
    Closed,

    #[error("send failed: {0}")]
    Send(String),
}
