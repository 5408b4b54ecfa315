//! # Stream Errors
//!
//! Failure taxonomy of the validator channel and the correlated dispatcher.

use shared_types::SchemaError;
use thiserror::Error;

/// Errors surfaced by [`crate::Stream`] and [`crate::CorrelatedDispatcher`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    /// `send`/`call` issued before `connect` or after `disconnect`.
    #[error("Stream is not connected")]
    NotConnected,

    /// `connect` issued on a stream that already has a connection task.
    #[error("Stream is already connected")]
    AlreadyConnected,

    /// The outbound queue rejected the frame.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Socket-level read/write failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// The in-flight call was cancelled or timed out.
    #[error("Call cancelled")]
    Cancelled,

    /// A response could not be interpreted as the expected payload.
    #[error("Protocol mismatch: {0}")]
    ProtocolMismatch(#[from] SchemaError),

    /// An outbound payload could not be encoded.
    #[error("Encode error: {0}")]
    Encode(SchemaError),

    /// A frame exceeded the configured maximum size.
    #[error("Frame too large: {length} bytes (max {max})")]
    FrameTooLarge { length: usize, max: usize },

    /// The validator URL could not be parsed.
    #[error("Invalid validator address: {0}")]
    InvalidAddress(String),

    /// `connect` called outside a Tokio runtime.
    #[error("No Tokio runtime available")]
    NoRuntime,
}

impl StreamError {
    /// True for the transport class of failures (not connected, send, I/O).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StreamError::NotConnected | StreamError::SendFailed(_) | StreamError::Io(_)
        )
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(err.to_string())
    }
}
