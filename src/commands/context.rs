//! Request context capabilities.
//!
//! Every transport has its own request type. Handlers only see it through
//! [`RequestContext`], a small capability set: bound path variables, the
//! trailing payload and, where the transport supports response metadata, a
//! response timestamp. A capability the context does not provide is reported
//! as [`CommandError::IncorrectInput`] by the `try_*` accessors.

use std::any::Any;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use command_proto::Vars;
use serde::de::DeserializeOwned;

use super::registry::ParsedCommand;
use crate::error::CommandError;

/// Upcast to [`Any`] for downcasting trait objects.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a handler may ask of an inbound request.
///
/// Every method is optional; the defaults report the capability as absent.
pub trait RequestContext: AsAny + Send + Sync {
    /// Bound path parameters.
    fn vars(&self) -> Option<&Vars> {
        None
    }

    /// Trailing opaque payload.
    fn data(&self) -> Option<&[u8]> {
        None
    }

    /// Stamp the response; ignored by transports without response metadata.
    fn set_response_timestamp(&mut self, _at: DateTime<Utc>) {}
}

impl dyn RequestContext + '_ {
    /// Bound path parameters, or `IncorrectInput`.
    pub fn try_vars(&self) -> Result<&Vars, CommandError> {
        self.vars().ok_or(CommandError::IncorrectInput)
    }

    /// Trailing payload, or `IncorrectInput`.
    pub fn try_data(&self) -> Result<&[u8], CommandError> {
        self.data().ok_or(CommandError::IncorrectInput)
    }

    /// Value bound to `name`; `""` when the pattern has no such slot.
    pub fn param(&self, name: &str) -> Result<&str, CommandError> {
        Ok(self
            .try_vars()?
            .get(name)
            .map(String::as_str)
            .unwrap_or_default())
    }

    /// Decode the trailing payload as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CommandError> {
        serde_json::from_slice(self.try_data()?).map_err(|_| CommandError::IncorrectInput)
    }

    /// The concrete transport request, or `IncorrectInput` on a type mismatch.
    pub fn downcast_ref<T: RequestContext + 'static>(&self) -> Result<&T, CommandError> {
        self.as_any()
            .downcast_ref::<T>()
            .ok_or(CommandError::IncorrectInput)
    }

    pub fn downcast_mut<T: RequestContext + 'static>(&mut self) -> Result<&mut T, CommandError> {
        self.as_any_mut()
            .downcast_mut::<T>()
            .ok_or(CommandError::IncorrectInput)
    }
}

/// Request context built from a parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultRequest {
    pub vars: Vars,
    pub data: Bytes,
    /// Set by handlers through [`RequestContext::set_response_timestamp`].
    pub responded_at: Option<DateTime<Utc>>,
}

impl DefaultRequest {
    pub fn new(vars: Vars, data: impl Into<Bytes>) -> Self {
        Self {
            vars,
            data: data.into(),
            responded_at: None,
        }
    }
}

impl From<ParsedCommand> for DefaultRequest {
    fn from(parsed: ParsedCommand) -> Self {
        Self::new(parsed.vars, parsed.payload)
    }
}

impl RequestContext for DefaultRequest {
    fn vars(&self) -> Option<&Vars> {
        Some(&self.vars)
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn set_response_timestamp(&mut self, at: DateTime<Utc>) {
        self.responded_at = Some(at);
    }
}
