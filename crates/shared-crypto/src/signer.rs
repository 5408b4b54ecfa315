//! # ECDSA Signer (secp256k1)
//!
//! Holds a private key and signs SHA-256 digests on behalf of the encoder.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalized signatures, high-S rejected on verify
//! - Constant-time operations
//!
//! ## Key Sources
//!
//! - Fresh random keys ([`Signer::generate`])
//! - Raw 32-byte scalars and their hex form
//! - PEM resources: SEC1 `EC PRIVATE KEY`, PKCS#8 `PRIVATE KEY`, and
//!   passphrase-protected PKCS#8 `ENCRYPTED PRIVATE KEY`

use crate::hashing::Sha256Digest;
use crate::CryptoError;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::pkcs8::DecodePrivateKey;
use k256::SecretKey;
use zeroize::Zeroizing;

/// Uncompressed secp256k1 public key (65 bytes, `0x04 || x || y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey([u8; 65]);

impl Secp256k1PublicKey {
    /// Create from any SEC1 encoding (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&verifying_key))
    }

    fn from_verifying_key(verifying_key: &VerifyingKey) -> Self {
        let point = verifying_key.to_encoded_point(false);
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Get raw uncompressed bytes.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// Lower-case hex, the form written into headers.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// ECDSA signature (64 bytes, r||s format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature([u8; 64]);

impl Secp256k1Signature {
    /// Create from bytes (64 bytes).
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parse the hex form stored in `header_signature`.
    pub fn from_hex(hex_sig: &str) -> Result<Self, CryptoError> {
        let raw = hex::decode(hex_sig).map_err(|_| CryptoError::InvalidSignature)?;
        let bytes: [u8; 64] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lower-case hex, the form written into `header_signature`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// secp256k1 signer.
pub struct Signer {
    signing_key: SigningKey,
}

impl Signer {
    /// Generate a signer with a random private key.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from raw secret key bytes (32 bytes).
    pub fn from_private_key(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a hex-encoded 32-byte secret key (surrounding whitespace ignored).
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_key.trim())
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?,
        );
        Self::from_private_key(&bytes)
    }

    /// Load from a PEM resource, decrypting it with `passphrase` when needed.
    pub fn from_pem(pem: &str, passphrase: Option<&str>) -> Result<Self, CryptoError> {
        let secret = if pem.contains("BEGIN ENCRYPTED PRIVATE KEY") {
            let passphrase = passphrase.ok_or(CryptoError::PassphraseRequired)?;
            SecretKey::from_pkcs8_encrypted_pem(pem, passphrase.as_bytes())
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?
        } else if pem.contains("BEGIN EC PRIVATE KEY") {
            SecretKey::from_sec1_pem(pem)
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?
        } else {
            SecretKey::from_pkcs8_pem(pem)
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?
        };

        Ok(Self {
            signing_key: SigningKey::from(secret),
        })
    }

    /// Public key (uncompressed, 65 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Secret key bytes (for persistence).
    pub fn private_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }

    /// Sign a SHA-256 digest (deterministic RFC 6979).
    pub fn sign(&self, digest: &Sha256Digest) -> Result<Secp256k1Signature, CryptoError> {
        let sig: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(Secp256k1Signature(sig.to_bytes().into()))
    }

    /// Check `signature` over `digest` against a SEC1 `public_key`.
    ///
    /// Malformed keys or signatures verify as `false`.
    pub fn verify(digest: &Sha256Digest, signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify_prehash(digest, &sig).is_ok()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}
