//! # Transaction Processor (QC Processor)
//!
//! Hosts family-specific transaction handlers on behalf of a validator.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): errors, handler registry, lifecycle
//!   states and the outcome-to-status mapping, no I/O
//! - **Ports Layer** (`ports/`): the [`TransactionHandler`] plugin trait
//! - **Context** (`context.rs`): per-execution state access
//! - **Service Layer** (`service.rs`): registration, dispatch and shutdown
//!
//! ## Completion Mapping
//!
//! | Handler outcome                      | Wire status          |
//! |--------------------------------------|----------------------|
//! | `Ok(())`                             | `Ok`                 |
//! | `Err(ApplyError::InvalidTransaction)`| `InvalidTransaction` |
//! | `Err(ApplyError::Internal)`, panic, no matching handler | `InternalError` |

pub mod config;
pub mod context;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use config::ProcessorConfig;
pub use context::TransactionContext;
pub use domain::errors::{ApplyError, ContextError, ProcessorError};
pub use domain::outcome::{completion_response, completion_status};
pub use domain::registry::{HandlerKey, HandlerRegistry};
pub use domain::state::{ProcessorState, RegistrationOutcome, RegistrationReport};
pub use ports::handler::TransactionHandler;
pub use service::TransactionProcessor;
