//! # Transaction Context
//!
//! State access for one execution request. Every operation is a single
//! correlated call tagged with the request's context id; nothing retries.

use crate::domain::errors::ContextError;
use shared_bus::CorrelatedDispatcher;
use shared_types::{
    AnnotationStatus, Event, EventAttribute, StateStatus, TpEventAddRequest, TpEventAddResponse,
    TpReceiptAddDataRequest, TpReceiptAddDataResponse, TpStateDeleteRequest,
    TpStateDeleteResponse, TpStateEntry, TpStateGetRequest, TpStateGetResponse,
    TpStateSetRequest, TpStateSetResponse,
};
use std::collections::HashMap;
use tracing::debug;

/// Handle to ledger state scoped to one execution.
pub struct TransactionContext<'a> {
    dispatcher: &'a CorrelatedDispatcher,
    context_id: String,
}

impl<'a> TransactionContext<'a> {
    /// Bind `dispatcher` to one execution's `context_id`.
    pub fn new(dispatcher: &'a CorrelatedDispatcher, context_id: impl Into<String>) -> Self {
        Self {
            dispatcher,
            context_id: context_id.into(),
        }
    }

    /// Context id every request from this context carries.
    #[must_use]
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Current values for `addresses`.
    ///
    /// Addresses with no state are absent from the result. An address that
    /// is present with empty data exists but holds nothing.
    pub async fn get_state(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, Vec<u8>>, ContextError> {
        let request = TpStateGetRequest {
            context_id: self.context_id.clone(),
            addresses: addresses.to_vec(),
        };
        let response: TpStateGetResponse = self.dispatcher.request(&request).await?;
        check_state_status("get_state", response.status, addresses)?;

        debug!(
            context_id = %self.context_id,
            requested = addresses.len(),
            found = response.entries.len(),
            "State read"
        );
        Ok(response
            .entries
            .into_iter()
            .map(|entry| (entry.address, entry.data))
            .collect())
    }

    /// Write `entries`, returning the addresses the validator accepted.
    ///
    /// Entries are sent sorted by address.
    pub async fn set_state(
        &self,
        entries: HashMap<String, Vec<u8>>,
    ) -> Result<Vec<String>, ContextError> {
        let mut entries: Vec<TpStateEntry> = entries
            .into_iter()
            .map(|(address, data)| TpStateEntry { address, data })
            .collect();
        entries.sort_by(|a, b| a.address.cmp(&b.address));
        let addresses: Vec<String> = entries.iter().map(|e| e.address.clone()).collect();

        let request = TpStateSetRequest {
            context_id: self.context_id.clone(),
            entries,
        };
        let response: TpStateSetResponse = self.dispatcher.request(&request).await?;
        check_state_status("set_state", response.status, &addresses)?;
        Ok(response.addresses)
    }

    /// Delete `addresses`, returning the ones actually deleted.
    pub async fn delete_state(&self, addresses: &[String]) -> Result<Vec<String>, ContextError> {
        let request = TpStateDeleteRequest {
            context_id: self.context_id.clone(),
            addresses: addresses.to_vec(),
        };
        let response: TpStateDeleteResponse = self.dispatcher.request(&request).await?;
        check_state_status("delete_state", response.status, addresses)?;
        Ok(response.addresses)
    }

    /// Attach opaque data to the transaction receipt. True when accepted.
    pub async fn add_receipt_data(&self, data: Vec<u8>) -> Result<bool, ContextError> {
        let request = TpReceiptAddDataRequest {
            context_id: self.context_id.clone(),
            data,
        };
        let response: TpReceiptAddDataResponse = self.dispatcher.request(&request).await?;
        Ok(response.status == AnnotationStatus::Ok)
    }

    /// Emit an event. True when accepted.
    pub async fn add_event(
        &self,
        event_type: impl Into<String>,
        attributes: Vec<(String, String)>,
        data: Vec<u8>,
    ) -> Result<bool, ContextError> {
        let event = Event {
            event_type: event_type.into(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| EventAttribute { key, value })
                .collect(),
            data,
        };
        let request = TpEventAddRequest {
            context_id: self.context_id.clone(),
            event,
        };
        let response: TpEventAddResponse = self.dispatcher.request(&request).await?;
        Ok(response.status == AnnotationStatus::Ok)
    }
}

fn check_state_status(
    operation: &'static str,
    status: StateStatus,
    addresses: &[String],
) -> Result<(), ContextError> {
    match status {
        StateStatus::Ok => Ok(()),
        StateStatus::AuthorizationError => Err(ContextError::Authorization {
            addresses: addresses.to_vec(),
        }),
        other => Err(ContextError::UnexpectedStatus {
            operation,
            status: format!("{other:?}"),
        }),
    }
}
