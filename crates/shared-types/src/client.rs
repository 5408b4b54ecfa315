//! # Client Payloads
//!
//! Requests a client program sends to the validator over the same channel
//! the transaction processor uses.

use crate::message::{MessageType, Payload};
use crate::transaction::{Batch, Transaction};
use serde::{Deserialize, Serialize};

/// Status shared by the client query responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClientStatus {
    #[default]
    StatusUnset,
    Ok,
    InternalError,
    InvalidBatch,
    QueueFull,
    NoResource,
    NotReady,
    InvalidAddress,
    InvalidId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientBatchSubmitRequest {
    pub batches: Vec<Batch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientBatchSubmitResponse {
    pub status: ClientStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientBatchGetRequest {
    pub batch_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientBatchGetResponse {
    pub status: ClientStatus,
    pub batch: Option<Batch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientStateGetRequest {
    /// Empty for the current chain head.
    pub state_root: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientStateGetResponse {
    pub status: ClientStatus,
    pub value: Vec<u8>,
    pub head_id: String,
}

/// Paging controls for list queries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientPagingControls {
    pub start: String,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientStateListRequest {
    pub state_root: String,
    /// Address prefix to list under.
    pub address: String,
    pub paging: ClientPagingControls,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientStateListEntry {
    pub address: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientStateListResponse {
    pub status: ClientStatus,
    pub entries: Vec<ClientStateListEntry>,
    pub head_id: String,
    /// Start key of the next page, empty on the last page.
    pub next: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientTransactionGetRequest {
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientTransactionGetResponse {
    pub status: ClientStatus,
    pub transaction: Option<Transaction>,
}

impl Payload for ClientBatchSubmitRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ClientBatchSubmitRequest;
}
impl Payload for ClientBatchSubmitResponse {
    const MESSAGE_TYPE: MessageType = MessageType::ClientBatchSubmitResponse;
}
impl Payload for ClientBatchGetRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ClientBatchGetRequest;
}
impl Payload for ClientBatchGetResponse {
    const MESSAGE_TYPE: MessageType = MessageType::ClientBatchGetResponse;
}
impl Payload for ClientStateGetRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ClientStateGetRequest;
}
impl Payload for ClientStateGetResponse {
    const MESSAGE_TYPE: MessageType = MessageType::ClientStateGetResponse;
}
impl Payload for ClientStateListRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ClientStateListRequest;
}
impl Payload for ClientStateListResponse {
    const MESSAGE_TYPE: MessageType = MessageType::ClientStateListResponse;
}
impl Payload for ClientTransactionGetRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ClientTransactionGetRequest;
}
impl Payload for ClientTransactionGetResponse {
    const MESSAGE_TYPE: MessageType = MessageType::ClientTransactionGetResponse;
}
