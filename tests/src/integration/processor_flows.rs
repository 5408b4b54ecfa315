//! # Processor Flows
//!
//! A `TransactionProcessor` hosting real handlers against the mock
//! validator: registration, execution with state access, completion
//! statuses, isolation of failing executions, and shutdown.

use crate::intkey::{self, IntKeyHandler, IntKeyPayload};
use crate::mock_validator::{Ledger, MockValidator, ValidatorConnection};
use async_trait::async_trait;
use qc_processor::{
    ApplyError, ProcessorConfig, ProcessorState, TransactionContext, TransactionHandler,
    TransactionProcessor,
};
use quantum_telemetry::TelemetryConfig;
use shared_types::{
    Message, MessageType, ProcessStatus, RegisterStatus, TpProcessRequest, TpProcessResponse,
    TpRegisterRequest, TpRegisterResponse, TpStateGetRequest, TpStateGetResponse,
};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// TEST FIXTURES
// =============================================================================

/// Fails every execution with a fixed outcome, or panics.
struct Faulty {
    family: &'static str,
    outcome: Option<ApplyError>,
}

#[async_trait]
impl TransactionHandler for Faulty {
    fn family_name(&self) -> &str {
        self.family
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn namespaces(&self) -> Vec<String> {
        vec!["fa0170".to_string()]
    }

    async fn apply(
        &self,
        _request: &TpProcessRequest,
        _context: &TransactionContext<'_>,
    ) -> Result<(), ApplyError> {
        match &self.outcome {
            Some(error) => Err(error.clone()),
            None => panic!("handler bug"),
        }
    }
}

fn config(validator: &MockValidator) -> ProcessorConfig {
    // Only the first call installs the subscriber.
    let _ = quantum_telemetry::init_logging(&TelemetryConfig::for_program("qc-tests"));
    ProcessorConfig {
        reconnect_interval: Duration::from_millis(50),
        registration_timeout: Duration::from_secs(5),
        unregister_timeout: Duration::from_secs(2),
        ..ProcessorConfig::new(validator.url())
    }
}

/// Start `processor` against `validator`, accepting every registration.
async fn start(
    processor: &mut TransactionProcessor,
    validator: &MockValidator,
) -> ValidatorConnection {
    let count = processor.handlers().len();
    let (report, connection) = tokio::join!(processor.start(), async {
        let mut connection = validator.accept().await;
        connection.accept_registrations(count).await;
        connection
    });
    assert!(report.unwrap().all_registered());
    connection
}

async fn stop(processor: &mut TransactionProcessor, connection: &mut ValidatorConnection) {
    let (result, ()) = tokio::join!(processor.stop(), connection.accept_unregister());
    result.unwrap();
    assert_eq!(processor.state(), ProcessorState::Disconnected);
}

// =============================================================================
// INTEGRATION TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: registrations are sent one at a time, in handler order
    #[tokio::test]
    async fn test_registration_is_sequential_and_ordered() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        processor
            .add_handler(Arc::new(Faulty {
                family: "faulty",
                outcome: None,
            }))
            .unwrap();

        let (report, mut connection) = tokio::join!(processor.start(), async {
            let mut connection = validator.accept().await;

            let (first, request) = connection.expect::<TpRegisterRequest>().await;
            assert_eq!(request.family, "intkey");
            assert_eq!(request.version, "1.0");
            assert_eq!(request.namespaces, [intkey::prefix()]);

            // Nothing else may arrive before the first registration is answered.
            let early = tokio::time::timeout(Duration::from_millis(100), connection.recv()).await;
            assert!(early.is_err(), "second registration sent before first answer");

            connection
                .reply(
                    &first,
                    TpRegisterResponse {
                        status: RegisterStatus::Ok,
                    },
                )
                .await;
            let (second, request) = connection.expect::<TpRegisterRequest>().await;
            assert_eq!(request.family, "faulty");
            connection
                .reply(
                    &second,
                    TpRegisterResponse {
                        status: RegisterStatus::Ok,
                    },
                )
                .await;
            connection
        });

        let report = report.unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.all_registered());
        assert_eq!(processor.state(), ProcessorState::Ready);

        stop(&mut processor, &mut connection).await;
    }

    /// Test: a refused registration is reported and the rest still register
    #[tokio::test]
    async fn test_refused_registration_does_not_abort_startup() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor
            .add_handler(Arc::new(Faulty {
                family: "refused",
                outcome: None,
            }))
            .unwrap();
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();

        let (report, mut connection) = tokio::join!(processor.start(), async {
            let mut connection = validator.accept().await;
            let (message, _) = connection.expect::<TpRegisterRequest>().await;
            connection
                .reply(
                    &message,
                    TpRegisterResponse {
                        status: RegisterStatus::Error,
                    },
                )
                .await;
            connection.accept_registrations(1).await;
            connection
        });

        let report = report.unwrap();
        assert!(!report.all_registered());
        let failures: Vec<_> = report.failures().map(|o| o.family_name.as_str()).collect();
        assert_eq!(failures, ["refused"]);
        assert!(report.outcomes[1].is_ok());
        assert_eq!(processor.state(), ProcessorState::Ready);

        stop(&mut processor, &mut connection).await;
    }

    /// Test: set on an empty address writes state and completes OK,
    /// a second set on the same address is an invalid transaction
    #[tokio::test]
    async fn test_intkey_set_then_duplicate_set() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        let mut connection = start(&mut processor, &validator).await;
        let mut ledger = Ledger::new();

        let request = intkey::intkey_request(&IntKeyPayload::set("foo", 42), "ctx-1");
        let execution = connection.process(&request, &mut ledger).await;
        assert_eq!(execution.response.status, ProcessStatus::Ok);
        assert_eq!(
            ledger.get(&intkey::address("foo")),
            Some(&42i32.to_le_bytes().to_vec())
        );
        assert_eq!(execution.events.len(), 1);
        assert_eq!(execution.events[0].event_type, "intkey/set");

        let again = intkey::intkey_request(&IntKeyPayload::set("foo", 7), "ctx-2");
        let execution = connection.process(&again, &mut ledger).await;
        assert_eq!(execution.response.status, ProcessStatus::InvalidTransaction);
        assert!(execution.response.message.contains("already set"));
        assert_eq!(
            ledger.get(&intkey::address("foo")),
            Some(&42i32.to_le_bytes().to_vec())
        );

        stop(&mut processor, &mut connection).await;
    }

    /// Test: inc and dec update an existing value; inc on a missing one is invalid
    #[tokio::test]
    async fn test_intkey_inc_dec() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        let mut connection = start(&mut processor, &validator).await;
        let mut ledger = Ledger::new();

        let missing = intkey::intkey_request(&IntKeyPayload::inc("bar"), "ctx-0");
        let execution = connection.process(&missing, &mut ledger).await;
        assert_eq!(execution.response.status, ProcessStatus::InvalidTransaction);

        ledger.insert(intkey::address("bar"), 10i32.to_le_bytes().to_vec());
        for (payload, expected) in [
            (IntKeyPayload::inc("bar"), 11),
            (IntKeyPayload::inc("bar"), 12),
            (IntKeyPayload::dec("bar"), 11),
        ] {
            let request = intkey::intkey_request(&payload, "ctx");
            let execution = connection.process(&request, &mut ledger).await;
            assert_eq!(execution.response.status, ProcessStatus::Ok);
            assert_eq!(
                intkey::decode_value(&ledger[&intkey::address("bar")]),
                Some(expected)
            );
        }

        stop(&mut processor, &mut connection).await;
    }

    /// Test: malformed payloads and unknown verbs are invalid, not internal
    #[tokio::test]
    async fn test_bad_payloads_are_invalid_transactions() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        let mut connection = start(&mut processor, &validator).await;
        let mut ledger = Ledger::new();

        let garbage = intkey::process_request("intkey", "1.0", b"not json".to_vec(), "ctx");
        let execution = connection.process(&garbage, &mut ledger).await;
        assert_eq!(execution.response.status, ProcessStatus::InvalidTransaction);

        let payload = IntKeyPayload {
            name: "foo".to_string(),
            verb: "mul".to_string(),
            value: Some(2),
        };
        let unknown = intkey::intkey_request(&payload, "ctx");
        let execution = connection.process(&unknown, &mut ledger).await;
        assert_eq!(execution.response.status, ProcessStatus::InvalidTransaction);
        assert!(execution.response.message.contains("unknown verb"));

        stop(&mut processor, &mut connection).await;
    }

    /// Test: each failure class maps to exactly one completion with the
    /// request's correlation id
    #[tokio::test]
    async fn test_failure_statuses() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        for (family, outcome) in [
            ("invalid", Some(ApplyError::invalid("rejected"))),
            ("internal", Some(ApplyError::internal("database on fire"))),
            ("panics", None),
        ] {
            processor
                .add_handler(Arc::new(Faulty { family, outcome }))
                .unwrap();
        }
        let mut connection = start(&mut processor, &validator).await;
        let mut ledger = Ledger::new();

        for (family, expected) in [
            ("invalid", ProcessStatus::InvalidTransaction),
            ("internal", ProcessStatus::InternalError),
            ("panics", ProcessStatus::InternalError),
            ("unregistered", ProcessStatus::InternalError),
        ] {
            let request = intkey::process_request(family, "1.0", vec![], "ctx");
            let execution = connection.process(&request, &mut ledger).await;
            assert_eq!(execution.response.status, expected, "family {family}");
        }

        // Exactly one completion per request: nothing else is queued.
        let extra = tokio::time::timeout(Duration::from_millis(100), connection.recv()).await;
        assert!(extra.is_err());

        // The processor is still serving after every failure above.
        let request = intkey::process_request("invalid", "1.0", vec![], "ctx");
        let execution = connection.process(&request, &mut ledger).await;
        assert_eq!(execution.response.status, ProcessStatus::InvalidTransaction);

        stop(&mut processor, &mut connection).await;
    }

    /// Test: two executions interleave; state answers delivered in reverse
    /// order reach the right execution
    #[tokio::test]
    async fn test_concurrent_executions_receive_their_own_state() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        let mut connection = start(&mut processor, &validator).await;

        let first_id = connection
            .send_process(&intkey::intkey_request(&IntKeyPayload::inc("a"), "ctx-a"))
            .await;
        let second_id = connection
            .send_process(&intkey::intkey_request(&IntKeyPayload::inc("b"), "ctx-b"))
            .await;

        // Collect both state reads before answering either.
        let mut reads = Vec::new();
        while reads.len() < 2 {
            let (message, request) = connection.expect::<TpStateGetRequest>().await;
            reads.push((message, request));
        }
        let values = [("ctx-a", "a", 100i32), ("ctx-b", "b", 200i32)];
        for (message, request) in reads.iter().rev() {
            let (_, name, value) = values
                .iter()
                .find(|(ctx, _, _)| *ctx == request.context_id)
                .copied()
                .unwrap();
            connection
                .reply(
                    message,
                    TpStateGetResponse {
                        entries: vec![shared_types::TpStateEntry {
                            address: intkey::address(name),
                            data: value.to_le_bytes().to_vec(),
                        }],
                        status: shared_types::StateStatus::Ok,
                    },
                )
                .await;
        }

        // Serve the writes and events, then collect both completions.
        let mut ledger = Ledger::new();
        let mut execution = crate::mock_validator::Execution::default();
        let mut completions: Vec<Message> = Vec::new();
        while completions.len() < 2 {
            let message = connection.recv().await;
            if let Some(message) = connection
                .serve_call(message, &mut ledger, &mut execution)
                .await
            {
                assert_eq!(message.message_type, MessageType::TpProcessResponse);
                completions.push(message);
            }
        }

        for message in &completions {
            let response: TpProcessResponse = message.payload().unwrap();
            assert_eq!(response.status, ProcessStatus::Ok);
            assert!(message.correlation_id == first_id || message.correlation_id == second_id);
        }
        assert_eq!(
            intkey::decode_value(&ledger[&intkey::address("a")]),
            Some(101)
        );
        assert_eq!(
            intkey::decode_value(&ledger[&intkey::address("b")]),
            Some(201)
        );

        stop(&mut processor, &mut connection).await;
    }

    /// Test: keepalive probes are answered while the processor is serving
    #[tokio::test]
    async fn test_ping_answered_while_ready() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        let mut connection = start(&mut processor, &validator).await;

        let ping = Message::new(MessageType::PingRequest, "keepalive-1", vec![]);
        connection.send(&ping).await;
        let pong = connection.recv().await;
        assert_eq!(pong.message_type, MessageType::PingResponse);
        assert_eq!(pong.correlation_id, "keepalive-1");

        stop(&mut processor, &mut connection).await;
    }

    /// Test: add_handler is rejected once started, and start cannot run twice
    #[tokio::test]
    async fn test_registry_frozen_after_start() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        let mut connection = start(&mut processor, &validator).await;

        let late = processor.add_handler(Arc::new(Faulty {
            family: "late",
            outcome: None,
        }));
        assert!(matches!(late, Err(qc_processor::ProcessorError::AlreadyStarted)));
        assert!(matches!(
            processor.start().await,
            Err(qc_processor::ProcessorError::AlreadyStarted)
        ));

        stop(&mut processor, &mut connection).await;
    }

    /// Test: the handler set stays fixed after stop, and a restart
    /// registers exactly the original handlers
    #[tokio::test]
    async fn test_registry_stays_frozen_after_stop() {
        let validator = MockValidator::bind().await;
        let mut processor = TransactionProcessor::new(config(&validator));
        processor.add_handler(Arc::new(IntKeyHandler)).unwrap();
        let mut connection = start(&mut processor, &validator).await;
        stop(&mut processor, &mut connection).await;

        let late = processor.add_handler(Arc::new(Faulty {
            family: "late",
            outcome: None,
        }));
        assert!(matches!(late, Err(qc_processor::ProcessorError::AlreadyStarted)));
        assert_eq!(processor.handlers().len(), 1);

        let (report, mut connection) = tokio::join!(processor.start(), async {
            let mut connection = validator.accept().await;
            let registrations = connection.accept_registrations(1).await;
            assert_eq!(registrations[0].family, intkey::FAMILY);
            connection
        });
        let report = report.unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.all_registered());

        // Nothing beyond the original registration is sent.
        let extra = tokio::time::timeout(Duration::from_millis(100), connection.recv()).await;
        assert!(extra.is_err());

        stop(&mut processor, &mut connection).await;
    }
}
