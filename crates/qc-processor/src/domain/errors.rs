//! # Processor Errors
//!
//! Handler outcomes, state-access failures and processor lifecycle errors.

use shared_bus::StreamError;
use thiserror::Error;

/// Failure outcome of a handler's `apply`.
///
/// `Ok(())` is success; the two variants map onto the `InvalidTransaction`
/// and `InternalError` completion statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// The transaction is semantically invalid for its family.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Anything else: bugs, unexpected state, transport failures.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplyError {
    /// Shorthand for [`ApplyError::InvalidTransaction`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        ApplyError::InvalidTransaction(reason.into())
    }

    /// Shorthand for [`ApplyError::Internal`].
    pub fn internal(detail: impl Into<String>) -> Self {
        ApplyError::Internal(detail.into())
    }
}

/// Errors from [`crate::TransactionContext`] operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The validator refused access to addresses outside the handler's
    /// declared inputs/outputs.
    #[error("Not authorized to access {addresses:?}")]
    Authorization { addresses: Vec<String> },

    /// The validator answered with a status this operation does not expect.
    #[error("Unexpected {operation} status: {status}")]
    UnexpectedStatus {
        operation: &'static str,
        status: String,
    },

    /// The request could not be completed over the channel.
    #[error("Channel error: {0}")]
    Stream(#[from] StreamError),
}

impl From<ContextError> for ApplyError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Authorization { .. } => ApplyError::InvalidTransaction(err.to_string()),
            other => ApplyError::Internal(other.to_string()),
        }
    }
}

/// Errors from the processor's lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessorError {
    /// A handler for this family and version is already registered.
    #[error("Handler already registered for {family}:{version}")]
    DuplicateHandler { family: String, version: String },

    /// The operation is only valid while the processor is disconnected.
    #[error("Processor already started")]
    AlreadyStarted,

    /// `stop` called on a processor that is not running.
    #[error("Processor is not running")]
    NotRunning,

    /// Channel failure during start or stop.
    #[error("Channel error: {0}")]
    Stream(#[from] StreamError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
