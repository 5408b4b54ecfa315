//! Completion mapping from handler outcome to wire status.

use super::errors::ApplyError;
use shared_types::{ProcessStatus, TpProcessResponse};

/// Wire status for a handler outcome.
#[must_use]
pub fn completion_status(outcome: &Result<(), ApplyError>) -> ProcessStatus {
    match outcome {
        Ok(()) => ProcessStatus::Ok,
        Err(ApplyError::InvalidTransaction(_)) => ProcessStatus::InvalidTransaction,
        Err(ApplyError::Internal(_)) => ProcessStatus::InternalError,
    }
}

/// Full completion payload for a handler outcome.
///
/// Failures carry their reason in `message`.
#[must_use]
pub fn completion_response(outcome: &Result<(), ApplyError>) -> TpProcessResponse {
    let message = match outcome {
        Ok(()) => String::new(),
        Err(ApplyError::InvalidTransaction(reason)) => reason.clone(),
        Err(ApplyError::Internal(detail)) => detail.clone(),
    };

    TpProcessResponse {
        status: completion_status(outcome),
        message,
        extended_data: Vec::new(),
    }
}
