//! # Client Errors

use shared_bus::StreamError;
use shared_crypto::CryptoError;
use shared_types::SchemaError;
use thiserror::Error;

/// Errors from the encoder and the validator client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Key loading or signing failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A header or envelope could not be encoded or decoded.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The validator channel failed.
    #[error("Channel error: {0}")]
    Stream(#[from] StreamError),
}
