//! Codec trait and implementations for serializing/deserializing frames.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The server doesn't care HOW frames are serialized; it just needs
//! something that implements the [`Codec`] trait, and the transport moves
//! the resulting bytes as one frame.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec value is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Compact JSON never contains a raw newline (newlines inside strings are
/// escaped), so every encoded frame is safe to send over the
/// line-delimited TCP transport.
///
/// ## Example
///
/// ```rust
/// use parley_protocol::{Codec, JsonCodec, Message};
///
/// let codec = JsonCodec;
///
/// let msg = Message::Chat {
///     destination: "bob".into(),
///     body: "hi".into(),
/// };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Message, ServerMessage};

    #[test]
    fn test_encode_multiline_body_has_no_raw_newline() {
        let msg = Message::Broadcast {
            body: "line one\nline two".into(),
        };

        let bytes = JsonCodec.encode(&msg).unwrap();

        assert!(!bytes.contains(&b'\n'));
        let decoded: Message = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<Message, _> = JsonCodec.decode(b"not json {");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_server_frame_as_request_is_error() {
        // A client echoing a server frame back must not be mistaken for a
        // request.
        let bytes = JsonCodec
            .encode(&ServerMessage::Reply {
                text: "Message sent".into(),
            })
            .unwrap();
        let result: Result<Message, _> = JsonCodec.decode(&bytes);
        assert!(result.is_err());
    }
}
