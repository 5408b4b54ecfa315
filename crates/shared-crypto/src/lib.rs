//! # Shared Crypto - Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signer` | secp256k1 ECDSA | Transaction and batch header signatures |
//! | `hashing` | SHA-256, SHA-512 | Header digests, payload fingerprints |
//!
//! ## Signing Order
//!
//! Callers hash first and sign the digest. [`Signer::sign`] only accepts a
//! 32-byte SHA-256 digest, and [`Signer::verify`] checks against the same
//! digest. The validator re-derives that digest from the encoded header.
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalized output
//! - **Key material**: signing keys are zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signer;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{sha256, sha512, sha512_hex, Sha256Digest};
pub use signer::{Secp256k1PublicKey, Secp256k1Signature, Signer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
