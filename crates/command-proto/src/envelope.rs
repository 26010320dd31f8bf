//! Broadcast envelopes.
//!
//! Every notification pushed to a subscriber is wrapped in an envelope
//! serialized as a JSON object:
//!
//! ```json
//! {"command":"tick","data":"MTA=","err":""}
//! ```
//!
//! `data` carries the handler payload as base64 (the byte-slice encoding used
//! by existing gateway clients) and is `null` when the handler failed. `err` is
//! empty on success.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Response envelope delivered to a subscribed connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Command that produced this notification.
    pub command: String,
    /// Handler payload, absent on error.
    #[serde(default, with = "base64_bytes")]
    pub data: Option<Vec<u8>>,
    /// Error text, empty on success.
    #[serde(default)]
    pub err: String,
}

impl Envelope {
    /// Successful envelope carrying `data`.
    pub fn ok(command: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            command: command.into(),
            data: Some(data.into()),
            err: String::new(),
        }
    }

    /// Failed envelope carrying the error text and no data.
    pub fn error(command: impl Into<String>, err: impl fmt::Display) -> Self {
        Self {
            command: command.into(),
            data: None,
            err: err.to_string(),
        }
    }

    /// Build an envelope from a handler result.
    pub fn from_result<T, E>(command: impl Into<String>, result: &std::result::Result<T, E>) -> Self
    where
        T: AsRef<[u8]>,
        E: fmt::Display,
    {
        match result {
            Ok(data) => Self::ok(command, data.as_ref()),
            Err(err) => Self::error(command, err),
        }
    }

    /// True when the envelope reports a handler error.
    pub fn is_error(&self) -> bool {
        !self.err.is_empty()
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Bytes> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(ProtocolError::Encode)
    }

    /// Parse an envelope from JSON bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(ProtocolError::Decode)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Option::<String>::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
