//! # Transaction Processor Payloads
//!
//! Messages exchanged between a transaction processor and the validator.
//!
//! ## Design Rules
//!
//! - All payloads are wrapped in a [`Message`](crate::Message).
//! - Requests and responses are paired by the envelope's `correlation_id`.
//! - State operations are scoped by the `context_id` of one execution.

use crate::message::{MessageType, Payload};
use crate::transaction::TransactionHeader;
use serde::{Deserialize, Serialize};

/// Implements [`Payload`] for a list of `(type, message type)` pairs.
macro_rules! payloads {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Payload for $ty {
                const MESSAGE_TYPE: MessageType = MessageType::$kind;
            }
        )*
    };
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Declares one handler's family, version and namespaces to the validator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpRegisterRequest {
    /// Family name.
    pub family: String,
    /// Family version.
    pub version: String,
    /// Address prefixes the handler reads and writes.
    pub namespaces: Vec<String>,
}

/// Outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegisterStatus {
    #[default]
    StatusUnset,
    Ok,
    Error,
}

/// Answer to [`TpRegisterRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpRegisterResponse {
    pub status: RegisterStatus,
}

/// Notifies the validator that the processor is going away.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpUnregisterRequest {}

/// Answer to [`TpUnregisterRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpUnregisterResponse {
    pub status: RegisterStatus,
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Asks the processor to apply one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpProcessRequest {
    /// Decoded header of the transaction being applied.
    pub header: TransactionHeader,
    /// Family-specific payload bytes.
    pub payload: Vec<u8>,
    /// Header signature (transaction id).
    pub signature: String,
    /// Scope for every state operation issued during this execution.
    pub context_id: String,
}

/// Completion status reported back to the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessStatus {
    #[default]
    StatusUnset,
    Ok,
    InvalidTransaction,
    InternalError,
}

/// Completion of a [`TpProcessRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpProcessResponse {
    pub status: ProcessStatus,
    /// Human-readable reason accompanying a failure status.
    pub message: String,
    /// Opaque family-specific detail.
    pub extended_data: Vec<u8>,
}

// =============================================================================
// STATE ACCESS
// =============================================================================

/// One address/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpStateEntry {
    pub address: String,
    pub data: Vec<u8>,
}

/// Validator verdict on a state access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateStatus {
    #[default]
    StatusUnset,
    Ok,
    /// The address lies outside the transaction's declared inputs/outputs.
    AuthorizationError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpStateGetRequest {
    pub context_id: String,
    pub addresses: Vec<String>,
}

/// Addresses absent from the ledger are absent from `entries`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpStateGetResponse {
    pub entries: Vec<TpStateEntry>,
    pub status: StateStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpStateSetRequest {
    pub context_id: String,
    pub entries: Vec<TpStateEntry>,
}

/// `addresses` lists the writes the validator accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpStateSetResponse {
    pub addresses: Vec<String>,
    pub status: StateStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpStateDeleteRequest {
    pub context_id: String,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpStateDeleteResponse {
    pub addresses: Vec<String>,
    pub status: StateStatus,
}

// =============================================================================
// RECEIPTS & EVENTS
// =============================================================================

/// Status shared by receipt and event annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnnotationStatus {
    #[default]
    StatusUnset,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpReceiptAddDataRequest {
    pub context_id: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpReceiptAddDataResponse {
    pub status: AnnotationStatus,
}

/// Key/value attribute attached to an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// Application event emitted while applying a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    pub attributes: Vec<EventAttribute>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpEventAddRequest {
    pub context_id: String,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TpEventAddResponse {
    pub status: AnnotationStatus,
}

// =============================================================================
// KEEPALIVE
// =============================================================================

/// Liveness probe sent by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PingRequest {}

/// Answer to [`PingRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PingResponse {}

payloads! {
    TpRegisterRequest => TpRegisterRequest,
    TpRegisterResponse => TpRegisterResponse,
    TpUnregisterRequest => TpUnregisterRequest,
    TpUnregisterResponse => TpUnregisterResponse,
    TpProcessRequest => TpProcessRequest,
    TpProcessResponse => TpProcessResponse,
    TpStateGetRequest => TpStateGetRequest,
    TpStateGetResponse => TpStateGetResponse,
    TpStateSetRequest => TpStateSetRequest,
    TpStateSetResponse => TpStateSetResponse,
    TpStateDeleteRequest => TpStateDeleteRequest,
    TpStateDeleteResponse => TpStateDeleteResponse,
    TpReceiptAddDataRequest => TpReceiptAddDataRequest,
    TpReceiptAddDataResponse => TpReceiptAddDataResponse,
    TpEventAddRequest => TpEventAddRequest,
    TpEventAddResponse => TpEventAddResponse,
    PingRequest => PingRequest,
    PingResponse => PingResponse,
}
