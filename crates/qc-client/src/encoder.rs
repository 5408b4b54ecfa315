//! # Transaction Encoder
//!
//! Builds signed transactions and batches.
//!
//! Every header is signed the same way: encode the header canonically, take
//! its SHA-256 digest, sign the digest, store the hex signature next to the
//! encoded header. The validator re-derives the digest from the header bytes
//! it receives, so the bytes that were signed are exactly the bytes shipped.

use crate::errors::ClientError;
use crate::settings::EncoderSettings;
use shared_crypto::{sha256, sha512_hex, Signer};
use shared_types::{Batch, BatchHeader, BatchList, Transaction, TransactionHeader};
use uuid::Uuid;

/// Transaction and batch builder for one family.
pub struct Encoder {
    settings: EncoderSettings,
    signer: Signer,
}

impl Encoder {
    /// Create an encoder. Empty key fields in `settings` are filled with the
    /// signer's public key.
    #[must_use]
    pub fn new(mut settings: EncoderSettings, signer: Signer) -> Self {
        let public_key = signer.public_key().to_hex();
        if settings.signer_public_key.is_empty() {
            settings.signer_public_key = public_key.clone();
        }
        if settings.batcher_public_key.is_empty() {
            settings.batcher_public_key = public_key;
        }
        Self { settings, signer }
    }

    /// Create an encoder from raw private key bytes.
    pub fn from_private_key(settings: EncoderSettings, private_key: &[u8]) -> Result<Self, ClientError> {
        Ok(Self::new(settings, Signer::from_private_key(private_key)?))
    }

    /// Settings stamped into every header, with key defaults applied.
    #[must_use]
    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Key used to sign transaction and batch headers.
    #[must_use]
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Build a signed transaction with a fresh random nonce.
    pub fn create_transaction(&self, payload: &[u8]) -> Result<Transaction, ClientError> {
        self.create_transaction_with_nonce(payload, Uuid::new_v4().to_string())
    }

    /// Build a signed transaction with a caller-chosen nonce.
    pub fn create_transaction_with_nonce(
        &self,
        payload: &[u8],
        nonce: impl Into<String>,
    ) -> Result<Transaction, ClientError> {
        let header = TransactionHeader {
            batcher_public_key: self.settings.batcher_public_key.clone(),
            dependencies: Vec::new(),
            family_name: self.settings.family_name.clone(),
            family_version: self.settings.family_version.clone(),
            inputs: self.settings.inputs.clone(),
            nonce: nonce.into(),
            outputs: self.settings.outputs.clone(),
            payload_sha512: sha512_hex(payload),
            signer_public_key: self.settings.signer_public_key.clone(),
        };

        let header = header.encode()?;
        let header_signature = self.sign(&header)?;
        Ok(Transaction {
            header,
            header_signature,
            payload: payload.to_vec(),
        })
    }

    /// Wrap `transactions`, in the given order, into a signed batch.
    pub fn create_batch(&self, transactions: &[Transaction]) -> Result<Batch, ClientError> {
        let header = BatchHeader {
            signer_public_key: self.signer.public_key().to_hex(),
            transaction_ids: transactions
                .iter()
                .map(|tx| tx.header_signature.clone())
                .collect(),
        };

        let header = header.encode()?;
        let header_signature = self.sign(&header)?;
        Ok(Batch {
            header,
            header_signature,
            transactions: transactions.to_vec(),
            trace: false,
        })
    }

    /// Batch holding one transaction.
    pub fn create_batch_single(&self, transaction: &Transaction) -> Result<Batch, ClientError> {
        self.create_batch(std::slice::from_ref(transaction))
    }

    /// Encode `batches` as the submission payload.
    pub fn encode(&self, batches: &[Batch]) -> Result<Vec<u8>, ClientError> {
        let list = BatchList {
            batches: batches.to_vec(),
        };
        Ok(list.encode()?)
    }

    /// Encode one batch as the submission payload.
    pub fn encode_batch(&self, batch: &Batch) -> Result<Vec<u8>, ClientError> {
        self.encode(std::slice::from_ref(batch))
    }

    /// Transaction, batch and encoding in one step.
    pub fn encode_single_transaction(&self, payload: &[u8]) -> Result<Vec<u8>, ClientError> {
        let transaction = self.create_transaction(payload)?;
        let batch = self.create_batch_single(&transaction)?;
        self.encode_batch(&batch)
    }

    fn sign(&self, header: &[u8]) -> Result<String, ClientError> {
        Ok(self.signer.sign(&sha256(header))?.to_hex())
    }
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
