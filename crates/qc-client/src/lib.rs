//! # QC Client
//!
//! The client half of the SDK: build signed transactions and batches, and
//! talk to the validator's client interface.
//!
//! ```text
//! payload ─► Encoder::create_transaction ─► Encoder::create_batch ─► Encoder::encode
//!                                                                        │
//!                             ValidatorClient::submit_batches ◄──────────┘
//! ```
//!
//! ## Signing
//!
//! Transaction and batch headers are signed over the SHA-256 digest of
//! their canonical encoding with the encoder's secp256k1 [`Signer`].

pub mod client;
pub mod encoder;
pub mod errors;
pub mod settings;

// Re-export public API
pub use client::ValidatorClient;
pub use encoder::Encoder;
pub use errors::ClientError;
pub use settings::EncoderSettings;
pub use shared_crypto::Signer;
