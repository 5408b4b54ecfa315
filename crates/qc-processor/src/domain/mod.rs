//! # Domain Layer
//!
//! Pure processor logic: errors, the handler registry, the lifecycle state
//! machine and the mapping from handler outcomes to wire status codes.
//! Nothing here performs I/O.

pub mod errors;
pub mod outcome;
pub mod registry;
pub mod state;
