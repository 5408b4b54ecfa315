//! # Error Types
//!
//! Errors raised while encoding or interpreting schema messages.

use crate::message::MessageType;
use thiserror::Error;

/// Errors that can occur when converting between payloads and wire bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A payload could not be serialized.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Wire bytes could not be deserialized into the requested payload.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The envelope carries a different message type than the one requested.
    #[error("Unexpected message type: expected {expected:?}, got {actual:?}")]
    UnexpectedType {
        expected: MessageType,
        actual: MessageType,
    },
}
