//! # Transaction Processor Service
//!
//! Registers handlers with the validator, executes the requests it routes
//! back, and reports each completion over the same channel.
//!
//! ## Dispatch
//!
//! Every inbound `TpProcessRequest` is executed on its own task, bounded by
//! a semaphore, so a slow handler never delays delivery of responses to
//! other executions' state calls. Every other inbound message is a response
//! and goes to the dispatcher's pending table.

use crate::config::ProcessorConfig;
use crate::context::TransactionContext;
use crate::domain::errors::{ApplyError, ProcessorError};
use crate::domain::outcome::completion_response;
use crate::domain::registry::HandlerRegistry;
use crate::domain::state::{ProcessorState, RegistrationOutcome, RegistrationReport};
use crate::ports::handler::TransactionHandler;
use futures::FutureExt;
use parking_lot::RwLock;
use shared_bus::{CorrelatedDispatcher, StreamListener};
use shared_types::{
    Message, MessageType, Payload, ProcessStatus, RegisterStatus, TpProcessRequest,
    TpRegisterRequest, TpRegisterResponse, TpUnregisterRequest, TpUnregisterResponse,
};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Routes inbound frames while the processor is connected.
struct ExecutionRouter {
    dispatcher: Arc<CorrelatedDispatcher>,
    registry: Arc<HandlerRegistry>,
    permits: Arc<Semaphore>,
}

impl StreamListener for ExecutionRouter {
    fn on_message(&self, message: Message) {
        if message.message_type != MessageType::TpProcessRequest {
            if let Some(unmatched) = self.dispatcher.resolve(message) {
                debug!(
                    correlation_id = %unmatched.correlation_id,
                    message_type = ?unmatched.message_type,
                    "Dropping response with no pending call"
                );
            }
            return;
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let registry = Arc::clone(&self.registry);
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            execute(&dispatcher, &registry, message).await;
        });
    }
}

/// Run one execution request and send its completion.
async fn execute(dispatcher: &CorrelatedDispatcher, registry: &HandlerRegistry, message: Message) {
    let outcome = match message.payload::<TpProcessRequest>() {
        Ok(request) => run_handler(dispatcher, registry, &request).await,
        Err(e) => Err(ApplyError::internal(format!("Undecodable process request: {e}"))),
    };

    let response = completion_response(&outcome);
    match response.status {
        ProcessStatus::Ok => debug!(
            correlation_id = %message.correlation_id,
            "Transaction applied"
        ),
        ProcessStatus::InvalidTransaction => info!(
            correlation_id = %message.correlation_id,
            reason = %response.message,
            "Transaction rejected as invalid"
        ),
        _ => error!(
            correlation_id = %message.correlation_id,
            detail = %response.message,
            "Transaction failed with internal error"
        ),
    }

    let reply = match response.to_reply(&message) {
        Ok(reply) => reply,
        Err(e) => {
            error!(error = %e, "Failed to encode process response");
            return;
        }
    };
    if let Err(e) = dispatcher.reply(reply) {
        warn!(
            correlation_id = %message.correlation_id,
            error = %e,
            "Failed to send process response"
        );
    }
}

async fn run_handler(
    dispatcher: &CorrelatedDispatcher,
    registry: &HandlerRegistry,
    request: &TpProcessRequest,
) -> Result<(), ApplyError> {
    let header = &request.header;
    let Some(handler) = registry.find(&header.family_name, &header.family_version) else {
        return Err(ApplyError::internal(format!(
            "No handler registered for {}:{}",
            header.family_name, header.family_version
        )));
    };

    let context = TransactionContext::new(dispatcher, request.context_id.clone());
    match AssertUnwindSafe(handler.apply(request, &context))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(ApplyError::internal(format!(
            "Handler for {}:{} panicked",
            header.family_name, header.family_version
        ))),
    }
}

/// Transaction processor.
///
/// ```text
/// add_handler()* ─► start() ─► (serve requests) ─► stop()
/// ```
pub struct TransactionProcessor {
    config: ProcessorConfig,
    dispatcher: Arc<CorrelatedDispatcher>,
    registry: HandlerRegistry,
    state: RwLock<ProcessorState>,
    permits: Option<Arc<Semaphore>>,
    /// Set by the first successful connect; the handler set is fixed from then on.
    registry_frozen: bool,
}

impl TransactionProcessor {
    /// Create a processor for the given validator.
    #[must_use]
    pub fn new(config: ProcessorConfig) -> Self {
        let dispatcher = Arc::new(CorrelatedDispatcher::new(config.stream_config()));
        Self {
            config,
            dispatcher,
            registry: HandlerRegistry::new(),
            state: RwLock::new(ProcessorState::Disconnected),
            permits: None,
            registry_frozen: false,
        }
    }

    /// Add a handler. Only valid before the first `start`.
    pub fn add_handler(
        &mut self,
        handler: Arc<dyn TransactionHandler>,
    ) -> Result<(), ProcessorError> {
        if self.registry_frozen || self.state() != ProcessorState::Disconnected {
            return Err(ProcessorError::AlreadyStarted);
        }
        self.registry.register(handler)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProcessorState {
        *self.state.read()
    }

    /// Registered handlers.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatcher shared with every execution's context.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<CorrelatedDispatcher> {
        &self.dispatcher
    }

    fn transition(&self, next: ProcessorState) {
        let previous = std::mem::replace(&mut *self.state.write(), next);
        debug!(from = %previous, to = %next, "Processor state changed");
    }

    /// Connect and register every handler, one after another.
    ///
    /// A registration that is refused or unanswered is reported and the
    /// remaining handlers are still registered.
    pub async fn start(&mut self) -> Result<RegistrationReport, ProcessorError> {
        if self.state() != ProcessorState::Disconnected {
            return Err(ProcessorError::AlreadyStarted);
        }
        self.config.validate()?;

        self.transition(ProcessorState::Connecting);
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_requests));
        let router = Arc::new(ExecutionRouter {
            dispatcher: Arc::clone(&self.dispatcher),
            registry: Arc::new(self.registry.clone()),
            permits: Arc::clone(&permits),
        });
        if let Err(e) = self.dispatcher.connect_with(router) {
            self.transition(ProcessorState::Disconnected);
            return Err(e.into());
        }
        self.permits = Some(permits);
        self.registry_frozen = true;

        self.transition(ProcessorState::Registering);
        let mut report = RegistrationReport::default();
        for handler in self.registry.iter() {
            let request = TpRegisterRequest {
                family: handler.family_name().to_string(),
                version: handler.version().to_string(),
                namespaces: handler.namespaces(),
            };
            let result = self
                .dispatcher
                .request_with_timeout::<_, TpRegisterResponse>(
                    &request,
                    self.config.registration_timeout,
                )
                .await
                .map(|response| response.status);

            match &result {
                Ok(RegisterStatus::Ok) => info!(
                    family = %request.family,
                    version = %request.version,
                    "Handler registered"
                ),
                Ok(status) => warn!(
                    family = %request.family,
                    version = %request.version,
                    ?status,
                    "Handler registration refused"
                ),
                Err(e) => warn!(
                    family = %request.family,
                    version = %request.version,
                    error = %e,
                    "Handler registration failed"
                ),
            }
            report.outcomes.push(RegistrationOutcome {
                family_name: request.family,
                version: request.version,
                result,
            });
        }

        self.transition(ProcessorState::Ready);
        Ok(report)
    }

    /// Unregister, let in-flight executions finish, then disconnect.
    ///
    /// Both waits are bounded by `unregister_timeout`.
    pub async fn stop(&mut self) -> Result<(), ProcessorError> {
        if !self.state().is_running() {
            return Err(ProcessorError::NotRunning);
        }
        self.transition(ProcessorState::Draining);

        let unregister = self
            .dispatcher
            .request_with_timeout::<_, TpUnregisterResponse>(
                &TpUnregisterRequest {},
                self.config.unregister_timeout,
            )
            .await;
        match unregister {
            Ok(response) if response.status == RegisterStatus::Ok => {
                info!("Processor unregistered");
            }
            Ok(response) => warn!(status = ?response.status, "Unregister refused"),
            Err(e) => warn!(error = %e, "Unregister failed"),
        }

        if let Some(permits) = self.permits.take() {
            // `validate` keeps the permit count within u32.
            let all = u32::try_from(self.config.max_concurrent_requests).unwrap_or(u32::MAX);
            let drained =
                tokio::time::timeout(self.config.unregister_timeout, permits.acquire_many(all))
                    .await;
            if drained.is_err() {
                warn!(
                    in_flight = self.config.max_concurrent_requests - permits.available_permits(),
                    "Stopping with executions still in flight"
                );
            }
        }

        self.dispatcher.disconnect().await;
        self.transition(ProcessorState::Disconnected);
        Ok(())
    }
}

impl std::fmt::Debug for TransactionProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionProcessor")
            .field("validator_url", &self.config.validator_url)
            .field("state", &self.state())
            .field("handlers", &self.registry)
            .finish()
    }
}
