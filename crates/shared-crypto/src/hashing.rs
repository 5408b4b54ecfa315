//! # SHA-2 Hashing
//!
//! Digests used by the transaction encoding pipeline:
//!
//! - SHA-256 of an encoded header is what gets signed.
//! - SHA-512 of a payload is committed to in the transaction header.

use sha2::{Digest, Sha256, Sha512};

/// SHA-256 output (256-bit). The only input [`crate::Signer::sign`] accepts.
pub type Sha256Digest = [u8; 32];

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Sha256Digest {
    Sha256::digest(data).into()
}

/// Hash data with SHA-512 (one-shot).
pub fn sha512(data: &[u8]) -> [u8; 64] {
    Sha512::digest(data).into()
}

/// Lower-case hex SHA-512, the form stored in `payload_sha512`.
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(sha512(data))
}
