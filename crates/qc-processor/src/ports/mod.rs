//! # Ports Layer
//!
//! The plugin point for family-specific business logic.

pub mod handler;
