//! # Shared Types Crate
//!
//! This crate contains the wire schema spoken between SDK programs and the
//! validator: the [`Message`] envelope, every request/response payload that
//! travels inside it, and the signed [`Transaction`]/[`Batch`] envelopes.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Both the client and the transaction
//!   processor build their messages from the types defined here.
//! - **Envelope Integrity**: Every payload travels wrapped in a [`Message`]
//!   that carries its [`MessageType`] and correlation identifier.
//! - **Canonical Encoding**: Payloads are encoded with `bincode` in field
//!   declaration order, so identical values always produce identical bytes.
//!   Header signatures depend on this.

pub mod client;
pub mod errors;
pub mod message;
pub mod processor;
pub mod transaction;

pub use client::*;
pub use errors::SchemaError;
pub use message::{Message, MessageType, Payload};
pub use processor::*;
pub use transaction::{Batch, BatchHeader, BatchList, Transaction, TransactionHeader};
