//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Private key bytes are not a valid secp256k1 scalar
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Public key bytes are not a valid SEC1 point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature bytes are malformed
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key resource could not be parsed (PEM, hex)
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// Encrypted key resource supplied without a passphrase
    #[error("Passphrase required for encrypted key")]
    PassphraseRequired,

    /// The signing primitive rejected the digest
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
