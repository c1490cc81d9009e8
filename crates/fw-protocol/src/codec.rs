//! Tokio codec for event-stream framed replies
//!
//! The tool server answers each POST with a `text/event-stream` body. Only
//! `data:` lines matter to the client; `event:`, `id:` and comment lines
//! are skipped.

use bytes::{BufMut, BytesMut};
use serde_json::Value;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;

/// Prefix that marks a payload line
const DATA_PREFIX: &str = "data:";

/// Event name used when encoding server replies
const MESSAGE_EVENT: &str = "message";

/// Line-oriented codec yielding the payload of each non-empty `data:` line
#[derive(Debug, Default)]
pub struct SseCodec {
    /// Bytes already scanned for a newline in the buffered line
    scanned: usize,
    /// Bytes consumed so far, for error reporting
    consumed: usize,
}

impl SseCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self {
            scanned: 0,
            consumed: 0,
        }
    }

    /// Extract the trimmed payload of a `data:` line, if any
    fn payload(&self, line: &[u8]) -> Result<Option<String>, ProtocolError> {
        let line = std::str::from_utf8(line).map_err(|e| ProtocolError::InvalidUtf8 {
            offset: self.consumed + e.valid_up_to(),
        })?;

        let payload = match line.trim().strip_prefix(DATA_PREFIX) {
            Some(rest) => rest.trim(),
            None => return Ok(None),
        };

        if payload.is_empty() {
            Ok(None)
        } else {
            Ok(Some(payload.to_string()))
        }
    }
}

impl Decoder for SseCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let newline = match src[self.scanned..].iter().position(|b| *b == b'\n') {
                Some(pos) => self.scanned + pos,
                None => {
                    // Need more data
                    self.scanned = src.len();
                    return Ok(None);
                }
            };

            let line = src.split_to(newline + 1);
            self.scanned = 0;

            let payload = self.payload(&line[..newline])?;
            self.consumed += line.len();

            if payload.is_some() {
                return Ok(payload);
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload) = self.decode(src)? {
            return Ok(Some(payload));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // Final line without a trailing newline
        let line = src.split_to(src.len());
        self.scanned = 0;
        let payload = self.payload(&line)?;
        self.consumed += line.len();
        Ok(payload)
    }
}

impl Encoder<String> for SseCodec {
    type Error = ProtocolError;

    fn encode(&mut self, payload: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(payload.len() + MESSAGE_EVENT.len() + 16);
        dst.put_slice(b"event: ");
        dst.put_slice(MESSAGE_EVENT.as_bytes());
        dst.put_u8(b'\n');
        dst.put_slice(DATA_PREFIX.as_bytes());
        dst.put_u8(b' ');
        dst.put_slice(payload.as_bytes());
        dst.put_slice(b"\n\n");
        Ok(())
    }
}

/// Decode the first message of an event-stream body.
///
/// Only the first non-empty `data:` payload is considered. If it is not
/// valid JSON the message is absent; later lines are never consulted.
pub fn first_message(body: &[u8]) -> Result<Option<Value>, ProtocolError> {
    let mut codec = SseCodec::new();
    let mut buf = BytesMut::from(body);

    let payload = match codec.decode_eof(&mut buf)? {
        Some(payload) => payload,
        None => return Ok(None),
    };

    match serde_json::from_str(&payload) {
        Ok(message) => Ok(Some(message)),
        Err(e) => {
            tracing::debug!("Discarding unparseable event payload: {}", e);
            Ok(None)
        }
    }
}

/// Encode a single JSON message as an event-stream body
pub fn encode_message(message: &Value) -> Result<BytesMut, ProtocolError> {
    let mut codec = SseCodec::new();
    let mut buf = BytesMut::new();
    codec.encode(serde_json::to_string(message)?, &mut buf)?;
    Ok(buf)
}
