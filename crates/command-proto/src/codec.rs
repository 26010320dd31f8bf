//! Line-based codec for tokio.
//!
//! Reads newline-terminated command lines and writes envelopes as JSON lines.
//! The transport that owns the socket stays outside this crate; the codec only
//! frames bytes.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::envelope::Envelope;
use crate::error::{ProtocolError, Result};

/// Default maximum line length in bytes.
pub const DEFAULT_MAX_LINE: usize = 64 * 1024;

/// Newline-delimited command line codec.
///
/// Decoded frames have the trailing `\n` (and an optional `\r`) stripped.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with [`DEFAULT_MAX_LINE`].
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Maximum accepted line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let mut line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            line.truncate(line.len() - 1);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }

            Ok(Some(line.freeze()))
        } else {
            self.next_index = src.len();

            if src.len() > self.max_len {
                tracing::debug!(buffered = src.len(), limit = self.max_len, "partial line over limit");
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<Envelope> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, envelope: Envelope, dst: &mut BytesMut) -> Result<()> {
        let json = envelope.to_bytes()?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"get/1\r\nhelp\npart"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), &b"get/1"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), &b"help"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"ial/x\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), &b"partial/x"[..]);
    }

    #[test]
    fn test_decode_rejects_long_line() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from(&b"0123456789\n"[..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::LineTooLong { limit: 8, .. }));
    }

    #[test]
    fn test_decode_rejects_long_partial() {
        let mut codec = LineCodec::with_max_len(4);
        let mut buf = BytesMut::from(&b"toolong"[..]);
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn test_encode_envelope_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Envelope::error("tick", "boom"), &mut buf).unwrap();

        assert_eq!(buf.last(), Some(&b'\n'));
        let env = Envelope::from_slice(&buf[..buf.len() - 1]).unwrap();
        assert_eq!(env.command, "tick");
        assert_eq!(env.err, "boom");
    }
}
