//! Encoder settings.

use serde::{Deserialize, Serialize};

/// Family and key settings stamped into every transaction header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub family_name: String,
    pub family_version: String,
    /// Address prefixes the transaction may read.
    pub inputs: Vec<String>,
    /// Address prefixes the transaction may write.
    pub outputs: Vec<String>,
    /// Hex public key of the transaction signer. Empty means the encoder's signer.
    pub signer_public_key: String,
    /// Hex public key of the batcher. Empty means the encoder's signer.
    pub batcher_public_key: String,
}

impl EncoderSettings {
    pub fn new(family_name: impl Into<String>, family_version: impl Into<String>) -> Self {
        Self {
            family_name: family_name.into(),
            family_version: family_version.into(),
            ..Self::default()
        }
    }

    /// Use `prefix` for both inputs and outputs.
    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.inputs.push(prefix.clone());
        self.outputs.push(prefix);
        self
    }
}
