//! # `Message` Envelope
//!
//! The universal wrapper for everything exchanged with the validator.
//!
//! ## Properties
//!
//! - **Typing**: `message_type` tells the receiver how to decode `content`.
//! - **Correlation**: Requests carry a fresh opaque `correlation_id`;
//!   responses echo the id of the request they answer.
//! - **Canonical content**: `content` is the `bincode` encoding of one
//!   [`Payload`], produced in field declaration order.

use crate::errors::SchemaError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Every message kind that may travel over the validator socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageType {
    #[default]
    Default,

    // =========================================================================
    // TRANSACTION PROCESSOR
    // =========================================================================
    TpRegisterRequest,
    TpRegisterResponse,
    TpUnregisterRequest,
    TpUnregisterResponse,
    TpProcessRequest,
    TpProcessResponse,
    TpStateGetRequest,
    TpStateGetResponse,
    TpStateSetRequest,
    TpStateSetResponse,
    TpStateDeleteRequest,
    TpStateDeleteResponse,
    TpReceiptAddDataRequest,
    TpReceiptAddDataResponse,
    TpEventAddRequest,
    TpEventAddResponse,

    // =========================================================================
    // CLIENT
    // =========================================================================
    ClientBatchSubmitRequest,
    ClientBatchSubmitResponse,
    ClientBatchGetRequest,
    ClientBatchGetResponse,
    ClientStateGetRequest,
    ClientStateGetResponse,
    ClientStateListRequest,
    ClientStateListResponse,
    ClientTransactionGetRequest,
    ClientTransactionGetResponse,

    // =========================================================================
    // KEEPALIVE
    // =========================================================================
    PingRequest,
    PingResponse,
}

/// The wire envelope: one per frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Kind of payload carried in `content`.
    pub message_type: MessageType,

    /// Opaque token pairing a request with its response.
    pub correlation_id: String,

    /// Encoded payload.
    pub content: Vec<u8>,
}

impl Message {
    /// Generate a fresh opaque correlation id (hex SHA-256 of a random UUID).
    #[must_use]
    pub fn new_correlation_id() -> String {
        let digest = Sha256::digest(Uuid::new_v4().as_bytes());
        hex::encode(digest)
    }

    /// Build an envelope from raw parts.
    pub fn new(
        message_type: MessageType,
        correlation_id: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            message_type,
            correlation_id: correlation_id.into(),
            content,
        }
    }

    /// Decode the payload, checking that the envelope carries the expected type.
    pub fn payload<T: Payload>(&self) -> Result<T, SchemaError> {
        if self.message_type != T::MESSAGE_TYPE {
            return Err(SchemaError::UnexpectedType {
                expected: T::MESSAGE_TYPE,
                actual: self.message_type,
            });
        }
        from_bytes(&self.content)
    }

    /// Serialize the whole envelope for a single frame.
    pub fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        to_bytes(self)
    }

    /// Deserialize an envelope from a single frame.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        from_bytes(bytes)
    }
}

/// A schema type that travels as the `content` of a [`Message`].
pub trait Payload: Serialize + DeserializeOwned {
    /// The envelope type used for this payload.
    const MESSAGE_TYPE: MessageType;

    /// Wrap as a new request with a fresh correlation id.
    fn to_message(&self) -> Result<Message, SchemaError> {
        Ok(Message::new(
            Self::MESSAGE_TYPE,
            Message::new_correlation_id(),
            to_bytes(self)?,
        ))
    }

    /// Wrap as the answer to `request`, echoing its correlation id.
    fn to_reply(&self, request: &Message) -> Result<Message, SchemaError> {
        Ok(Message::new(
            Self::MESSAGE_TYPE,
            request.correlation_id.clone(),
            to_bytes(self)?,
        ))
    }
}

/// Canonical encoding shared by envelopes, payloads and signed headers.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SchemaError> {
    bincode::serialize(value).map_err(|e| SchemaError::Encode(e.to_string()))
}

/// Inverse of [`to_bytes`].
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SchemaError> {
    bincode::deserialize(bytes).map_err(|e| SchemaError::Decode(e.to_string()))
}
