//! Processor lifecycle and registration results.

use shared_bus::StreamError;
use shared_types::RegisterStatus;
use std::fmt;

/// Lifecycle of a [`crate::TransactionProcessor`].
///
/// `Disconnected → Connecting → Registering → Ready → Draining → Disconnected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorState {
    #[default]
    Disconnected,
    Connecting,
    Registering,
    Ready,
    Draining,
}

impl ProcessorState {
    /// States from which `stop` is accepted.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(
            self,
            ProcessorState::Connecting | ProcessorState::Registering | ProcessorState::Ready
        )
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessorState::Disconnected => "disconnected",
            ProcessorState::Connecting => "connecting",
            ProcessorState::Registering => "registering",
            ProcessorState::Ready => "ready",
            ProcessorState::Draining => "draining",
        };
        f.write_str(name)
    }
}

/// Result of registering one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub family_name: String,
    pub version: String,
    /// Status the validator answered with, or why no answer arrived.
    pub result: Result<RegisterStatus, StreamError>,
}

impl RegistrationOutcome {
    /// True when the validator accepted the registration.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.result, Ok(RegisterStatus::Ok))
    }
}

/// Per-handler registration results, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub outcomes: Vec<RegistrationOutcome>,
}

impl RegistrationReport {
    /// True when every handler was accepted.
    #[must_use]
    pub fn all_registered(&self) -> bool {
        self.outcomes.iter().all(RegistrationOutcome::is_ok)
    }

    /// Outcomes the validator did not accept.
    pub fn failures(&self) -> impl Iterator<Item = &RegistrationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}
