//! # Transaction Handler Port
//!
//! Implemented once per transaction family.

use crate::context::TransactionContext;
use crate::domain::errors::ApplyError;
use async_trait::async_trait;
use shared_types::TpProcessRequest;

/// Business logic for one transaction family version.
///
/// The processor registers `(family_name, version, namespaces)` with the
/// validator and routes every execution request whose header matches
/// `family_name` and `version` exactly to [`TransactionHandler::apply`].
///
/// Implementations must be thread-safe: several executions may run at once.
#[async_trait]
pub trait TransactionHandler: Send + Sync {
    /// Family this handler executes.
    fn family_name(&self) -> &str;

    /// Family version this handler executes.
    fn version(&self) -> &str;

    /// Address prefixes the handler reads and writes.
    fn namespaces(&self) -> Vec<String>;

    /// Execute one transaction.
    ///
    /// `context` is bound to the request's context id and is only valid for
    /// the duration of this call.
    async fn apply(
        &self,
        request: &TpProcessRequest,
        context: &TransactionContext<'_>,
    ) -> Result<(), ApplyError>;
}
