//! # Validator Client
//!
//! Client-side queries and batch submission over the validator channel.

use crate::errors::ClientError;
use shared_bus::{CorrelatedDispatcher, StreamConfig};
use shared_types::{
    BatchList, ClientBatchGetRequest, ClientBatchGetResponse, ClientBatchSubmitRequest,
    ClientBatchSubmitResponse, ClientStateGetRequest, ClientStateGetResponse,
    ClientStateListRequest, ClientStateListResponse, ClientTransactionGetRequest,
    ClientTransactionGetResponse, Message, Payload,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Connected client for the validator's client interface.
#[derive(Debug)]
pub struct ValidatorClient {
    dispatcher: Arc<CorrelatedDispatcher>,
    request_timeout: Option<Duration>,
}

impl ValidatorClient {
    /// Connect to the validator described by `config`.
    pub fn connect(config: StreamConfig) -> Result<Self, ClientError> {
        let dispatcher = Arc::new(CorrelatedDispatcher::new(config));
        dispatcher.connect()?;
        Ok(Self {
            dispatcher,
            request_timeout: None,
        })
    }

    /// Fail requests that get no answer within `timeout`.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Submit every batch in `batch_list`.
    pub async fn submit_batches(
        &self,
        batch_list: BatchList,
    ) -> Result<ClientBatchSubmitResponse, ClientError> {
        debug!(batches = batch_list.batches.len(), "Submitting batches");
        self.request(&ClientBatchSubmitRequest {
            batches: batch_list.batches,
        })
        .await
    }

    /// Look up a batch by its header signature.
    pub async fn get_batch(&self, batch_id: &str) -> Result<ClientBatchGetResponse, ClientError> {
        self.request(&ClientBatchGetRequest {
            batch_id: batch_id.to_string(),
        })
        .await
    }

    /// Read one address, at `state_root` or at the chain head when empty.
    pub async fn get_state(
        &self,
        address: &str,
        state_root: &str,
    ) -> Result<ClientStateGetResponse, ClientError> {
        self.request(&ClientStateGetRequest {
            state_root: state_root.to_string(),
            address: address.to_string(),
        })
        .await
    }

    /// Page through state entries under an address prefix.
    pub async fn list_state(
        &self,
        request: ClientStateListRequest,
    ) -> Result<ClientStateListResponse, ClientError> {
        self.request(&request).await
    }

    /// Look up a transaction by its header signature.
    pub async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<ClientTransactionGetResponse, ClientError> {
        self.request(&ClientTransactionGetRequest {
            transaction_id: transaction_id.to_string(),
        })
        .await
    }

    /// Send an arbitrary message and wait for its response.
    pub async fn send_message(&self, message: Message) -> Result<Message, ClientError> {
        let response = match self.request_timeout {
            Some(timeout) => self.dispatcher.call_with_timeout(message, timeout).await?,
            None => self.dispatcher.call(message).await?,
        };
        Ok(response)
    }

    /// Disconnect from the validator.
    pub async fn close(self) {
        self.dispatcher.disconnect().await;
    }

    async fn request<Req, Resp>(&self, request: &Req) -> Result<Resp, ClientError>
    where
        Req: Payload,
        Resp: Payload,
    {
        let response = self.send_message(request.to_message()?).await?;
        Ok(response.payload::<Resp>()?)
    }
}
