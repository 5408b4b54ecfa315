//! # Mock Validator
//!
//! A loopback TCP peer that speaks the validator side of the channel.
//!
//! Tests drive it explicitly: accept the SDK's connection, read the frames
//! it sends, and answer them. [`ValidatorConnection::process`] plays a
//! complete execution round: it sends a `TpProcessRequest`, serves every
//! state call the handler makes from an in-memory [`Ledger`], and returns the
//! completion.

use shared_bus::frame::{read_frame, write_frame};
use shared_bus::StreamConfig;
use shared_types::{
    AnnotationStatus, Event, Message, MessageType, Payload, RegisterStatus, StateStatus,
    TpEventAddRequest, TpEventAddResponse, TpProcessRequest, TpProcessResponse,
    TpReceiptAddDataRequest, TpReceiptAddDataResponse, TpRegisterRequest, TpRegisterResponse,
    TpStateDeleteRequest, TpStateDeleteResponse, TpStateEntry, TpStateGetRequest,
    TpStateGetResponse, TpStateSetRequest, TpStateSetResponse, TpUnregisterRequest,
    TpUnregisterResponse,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Frame limit used by the mock.
pub const MAX_FRAME: usize = 16 * 1024 * 1024;

/// How long the mock waits for the SDK before failing the test.
pub const WAIT: Duration = Duration::from_secs(5);

/// Address → data, as the mock validator sees it.
pub type Ledger = HashMap<String, Vec<u8>>;

/// Side effects a handler produced during one execution.
#[derive(Debug, Default)]
pub struct Execution {
    pub response: TpProcessResponse,
    pub events: Vec<Event>,
    pub receipts: Vec<Vec<u8>>,
}

/// Listening side of the mock.
pub struct MockValidator {
    listener: TcpListener,
    url: String,
}

impl MockValidator {
    /// Bind to an ephemeral loopback port.
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("tcp://{}", listener.local_addr().unwrap());
        Self { listener, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stream settings pointing at this mock, with a fast reconnect.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::new(self.url.clone()).with_reconnect_interval(Duration::from_millis(50))
    }

    /// Wait for the next SDK connection.
    pub async fn accept(&self) -> ValidatorConnection {
        let (socket, _) = timeout(WAIT, self.listener.accept())
            .await
            .expect("no connection from SDK")
            .unwrap();
        ValidatorConnection { socket }
    }
}

/// One accepted connection.
pub struct ValidatorConnection {
    socket: TcpStream,
}

impl ValidatorConnection {
    /// Next frame from the SDK.
    pub async fn recv(&mut self) -> Message {
        let frame = timeout(WAIT, read_frame(&mut self.socket, MAX_FRAME))
            .await
            .expect("timed out waiting for SDK frame")
            .unwrap();
        Message::decode(&frame).unwrap()
    }

    /// Next frame, decoded as `P`.
    pub async fn expect<P: Payload>(&mut self) -> (Message, P) {
        let message = self.recv().await;
        let payload = message.payload::<P>().unwrap();
        (message, payload)
    }

    /// Write a frame to the SDK.
    pub async fn send(&mut self, message: &Message) {
        write_frame(&mut self.socket, &message.encode().unwrap(), MAX_FRAME)
            .await
            .unwrap();
    }

    /// Answer `request` with `payload`.
    pub async fn reply<P: Payload>(&mut self, request: &Message, payload: P) {
        self.send(&payload.to_reply(request).unwrap()).await;
    }

    /// Accept `count` registrations, returning them in arrival order.
    pub async fn accept_registrations(&mut self, count: usize) -> Vec<TpRegisterRequest> {
        let mut registrations = Vec::with_capacity(count);
        for _ in 0..count {
            let (message, request) = self.expect::<TpRegisterRequest>().await;
            self.reply(
                &message,
                TpRegisterResponse {
                    status: RegisterStatus::Ok,
                },
            )
            .await;
            registrations.push(request);
        }
        registrations
    }

    /// Accept the unregister notification sent by `stop`.
    pub async fn accept_unregister(&mut self) {
        let (message, _) = self.expect::<TpUnregisterRequest>().await;
        self.reply(
            &message,
            TpUnregisterResponse {
                status: RegisterStatus::Ok,
            },
        )
        .await;
    }

    /// Send an execution request; return its correlation id.
    pub async fn send_process(&mut self, request: &TpProcessRequest) -> String {
        let message = request.to_message().unwrap();
        self.send(&message).await;
        message.correlation_id
    }

    /// Serve one state or annotation call against `ledger`.
    ///
    /// Returns the message unchanged when it is not such a call.
    pub async fn serve_call(
        &mut self,
        message: Message,
        ledger: &mut Ledger,
        execution: &mut Execution,
    ) -> Option<Message> {
        match message.message_type {
            MessageType::TpStateGetRequest => {
                let request: TpStateGetRequest = message.payload().unwrap();
                let entries = request
                    .addresses
                    .iter()
                    .filter_map(|address| {
                        ledger.get(address).map(|data| TpStateEntry {
                            address: address.clone(),
                            data: data.clone(),
                        })
                    })
                    .collect();
                self.reply(
                    &message,
                    TpStateGetResponse {
                        entries,
                        status: StateStatus::Ok,
                    },
                )
                .await;
            }
            MessageType::TpStateSetRequest => {
                let request: TpStateSetRequest = message.payload().unwrap();
                let mut addresses = Vec::new();
                for entry in request.entries {
                    addresses.push(entry.address.clone());
                    ledger.insert(entry.address, entry.data);
                }
                self.reply(
                    &message,
                    TpStateSetResponse {
                        addresses,
                        status: StateStatus::Ok,
                    },
                )
                .await;
            }
            MessageType::TpStateDeleteRequest => {
                let request: TpStateDeleteRequest = message.payload().unwrap();
                let addresses = request
                    .addresses
                    .into_iter()
                    .filter(|address| ledger.remove(address).is_some())
                    .collect();
                self.reply(
                    &message,
                    TpStateDeleteResponse {
                        addresses,
                        status: StateStatus::Ok,
                    },
                )
                .await;
            }
            MessageType::TpEventAddRequest => {
                let request: TpEventAddRequest = message.payload().unwrap();
                execution.events.push(request.event);
                self.reply(
                    &message,
                    TpEventAddResponse {
                        status: AnnotationStatus::Ok,
                    },
                )
                .await;
            }
            MessageType::TpReceiptAddDataRequest => {
                let request: TpReceiptAddDataRequest = message.payload().unwrap();
                execution.receipts.push(request.data);
                self.reply(
                    &message,
                    TpReceiptAddDataResponse {
                        status: AnnotationStatus::Ok,
                    },
                )
                .await;
            }
            _ => return Some(message),
        }
        None
    }

    /// Run one execution to completion against `ledger`.
    pub async fn process(&mut self, request: &TpProcessRequest, ledger: &mut Ledger) -> Execution {
        let correlation_id = self.send_process(request).await;
        let mut execution = Execution::default();

        loop {
            let message = self.recv().await;
            let Some(message) = self.serve_call(message, ledger, &mut execution).await else {
                continue;
            };
            assert_eq!(message.message_type, MessageType::TpProcessResponse);
            assert_eq!(message.correlation_id, correlation_id);
            execution.response = message.payload().unwrap();
            return execution;
        }
    }
}
