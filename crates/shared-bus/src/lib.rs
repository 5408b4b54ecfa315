//! # Shared Bus - Validator Channel and Correlated Dispatch
//!
//! Everything the client and the transaction processor say to the validator
//! travels over one duplex socket. This crate owns that socket and the
//! request/response bookkeeping on top of it.
//!
//! ```text
//!  caller ──call()──► CorrelatedDispatcher ──send()──► Stream ══frames══► validator
//!    ▲                     │ pending table                 │
//!    └──── response ◄──────┴──── resolve() ◄── on_message ◄┘
//! ```
//!
//! ## Guarantees
//!
//! - **Serialized writes:** frames from concurrent senders never interleave
//! - **Ordered delivery:** inbound frames reach the listener in arrival order
//! - **Exactly-once completion:** a pending call is completed by at most one
//!   response; later responses for the same id are dropped
//! - **Transparent keepalive:** ping probes are answered by the stream itself

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod frame;
pub mod stream;

// Re-export main types
pub use config::StreamConfig;
pub use dispatcher::{CorrelatedDispatcher, DispatcherStats};
pub use errors::StreamError;
pub use stream::{Stream, StreamListener};
