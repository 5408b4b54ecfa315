//! # Signed Envelopes
//!
//! Transactions and batches as submitted to the validator.
//!
//! ## Clusters
//!
//! - **Transaction**: `TransactionHeader`, `Transaction`
//! - **Batch**: `BatchHeader`, `Batch`, `BatchList`
//!
//! Headers are stored in their canonical encoded form so the signed bytes
//! are exactly the bytes that travel. Use `decode_header` to inspect them.

use crate::errors::SchemaError;
use crate::message::{from_bytes, to_bytes};
use serde::{Deserialize, Serialize};

// =============================================================================
// TRANSACTION
// =============================================================================

/// Everything a transaction signer commits to.
///
/// Field order is part of the canonical encoding and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Hex public key of the batcher allowed to wrap this transaction.
    pub batcher_public_key: String,
    /// Transaction ids that must be applied before this one.
    pub dependencies: Vec<String>,
    /// Family the payload is addressed to.
    pub family_name: String,
    /// Family version the payload is encoded for.
    pub family_version: String,
    /// Address prefixes the transaction may read.
    pub inputs: Vec<String>,
    /// Random value making otherwise identical headers distinct.
    pub nonce: String,
    /// Address prefixes the transaction may write.
    pub outputs: Vec<String>,
    /// Hex SHA-512 of the payload.
    pub payload_sha512: String,
    /// Hex public key of the transaction signer.
    pub signer_public_key: String,
}

impl TransactionHeader {
    /// Canonical bytes that are hashed and signed.
    pub fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        to_bytes(self)
    }
}

/// A signed transaction. Immutable once signed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Canonical encoding of the [`TransactionHeader`].
    pub header: Vec<u8>,
    /// Hex signature over SHA-256 of `header`; doubles as the transaction id.
    pub header_signature: String,
    /// Family-specific payload.
    pub payload: Vec<u8>,
}

impl Transaction {
    /// Decode the signed header.
    pub fn decode_header(&self) -> Result<TransactionHeader, SchemaError> {
        from_bytes(&self.header)
    }
}

// =============================================================================
// BATCH
// =============================================================================

/// Everything a batch signer commits to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchHeader {
    /// Hex public key of the batch signer.
    pub signer_public_key: String,
    /// Header signatures of the contained transactions, in batch order.
    pub transaction_ids: Vec<String>,
}

impl BatchHeader {
    /// Canonical bytes that are hashed and signed.
    pub fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        to_bytes(self)
    }
}

/// An ordered, atomically applied group of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Batch {
    /// Canonical encoding of the [`BatchHeader`].
    pub header: Vec<u8>,
    /// Hex signature over SHA-256 of `header`; doubles as the batch id.
    pub header_signature: String,
    /// Transactions in the order listed by the header.
    pub transactions: Vec<Transaction>,
    /// Ask the validator to log this batch's progress.
    pub trace: bool,
}

impl Batch {
    /// Decode the signed header.
    pub fn decode_header(&self) -> Result<BatchHeader, SchemaError> {
        from_bytes(&self.header)
    }
}

/// Submission envelope accepted by the validator's batch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchList {
    pub batches: Vec<Batch>,
}

impl BatchList {
    /// Bytes posted to the submission boundary.
    pub fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        to_bytes(self)
    }

    /// Parse bytes produced by [`BatchList::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        from_bytes(bytes)
    }
}
