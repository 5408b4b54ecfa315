//! # Validator Stream
//!
//! The single duplex connection to the validator.
//!
//! `send` enqueues onto an unbounded channel drained by one writer loop, so
//! concurrent senders never interleave frame bytes. Inbound frames are read
//! by a dedicated reader task and handed to the [`StreamListener`] in arrival
//! order. Keepalive probes are answered here and never reach the listener.
//!
//! On connection loss the stream reconnects every `reconnect_interval` until
//! `disconnect` is called. Messages queued while the socket is down are
//! written once the session is re-established. Nothing above the stream is
//! told about the reconnect, so calls awaiting a response stay pending until
//! a matching response arrives or the caller cancels them.

use crate::config::StreamConfig;
use crate::errors::StreamError;
use crate::frame::{read_frame, write_frame};
use parking_lot::Mutex;
use shared_types::{Message, MessageType, Payload, PingResponse};
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Receiver of inbound frames.
///
/// Called once per frame, in the order frames arrive, from the stream's
/// reader task. Implementations must not block.
pub trait StreamListener: Send + Sync + 'static {
    /// Handle one inbound message.
    fn on_message(&self, message: Message);
}

struct Connection {
    outbound: mpsc::UnboundedSender<Message>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Duplex message channel to the validator.
pub struct Stream {
    config: StreamConfig,
    connection: Mutex<Option<Connection>>,
}

impl Stream {
    /// Create an unconnected stream.
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
        }
    }

    /// Stream configuration.
    #[must_use]
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Start the connection task, delivering inbound frames to `listener`.
    ///
    /// Returns once the task is spawned; the socket itself is opened (and
    /// reopened) in the background. Messages sent before the socket is up are
    /// queued.
    pub fn connect(&self, listener: Arc<dyn StreamListener>) -> Result<(), StreamError> {
        let runtime = Handle::try_current().map_err(|_| StreamError::NoRuntime)?;
        let address = self.config.socket_addr()?;

        let mut guard = self.connection.lock();
        if guard.is_some() {
            return Err(StreamError::AlreadyConnected);
        }

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);

        let session = Session {
            address,
            config: self.config.clone(),
            listener,
            outbound: outbound.clone(),
        };
        let task = runtime.spawn(session.run(outbound_rx, shutdown_rx));

        *guard = Some(Connection {
            outbound,
            shutdown,
            task,
        });
        info!(url = %self.config.url, "Validator stream started");
        Ok(())
    }

    /// Whether `connect` has been called without a matching `disconnect`.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// Queue a message for the validator. Does not wait for any answer.
    pub fn send(&self, message: Message) -> Result<(), StreamError> {
        let guard = self.connection.lock();
        let connection = guard.as_ref().ok_or(StreamError::NotConnected)?;
        connection
            .outbound
            .send(message)
            .map_err(|e| StreamError::SendFailed(e.to_string()))
    }

    /// Stop the connection task and close the socket.
    ///
    /// Messages still queued are discarded. Calling this on an unconnected
    /// stream is a no-op.
    pub async fn disconnect(&self) {
        let connection = self.connection.lock().take();
        let Some(connection) = connection else {
            return;
        };

        let _ = connection.shutdown.send(true);
        drop(connection.outbound);
        if let Err(e) = connection.task.await {
            if e.is_panic() {
                error!(error = %e, "Validator stream task panicked");
            }
        }
        info!(url = %self.config.url, "Validator stream disconnected");
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("url", &self.config.url)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Why a single socket session ended.
enum SessionEnd {
    Shutdown,
    Lost,
}

struct Session {
    address: String,
    config: StreamConfig,
    listener: Arc<dyn StreamListener>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl Session {
    async fn run(
        self,
        mut outbound_rx: mpsc::UnboundedReceiver<Message>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut sessions: u64 = 0;

        loop {
            let connected = tokio::select! {
                biased;
                _ = shutdown.changed() => return,
                result = TcpStream::connect(&self.address) => result,
            };

            let socket = match connected {
                Ok(socket) => socket,
                Err(e) => {
                    warn!(
                        address = %self.address,
                        error = %e,
                        retry_in = ?self.config.reconnect_interval,
                        "Validator connection failed"
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => return,
                        _ = tokio::time::sleep(self.config.reconnect_interval) => continue,
                    }
                }
            };

            if sessions == 0 {
                info!(address = %self.address, "Connected to validator");
            } else {
                info!(address = %self.address, sessions, "Reconnected to validator");
            }
            sessions += 1;

            if let Err(e) = socket.set_nodelay(true) {
                debug!(error = %e, "Failed to set TCP_NODELAY");
            }

            let (read_half, write_half) = socket.into_split();
            match self
                .serve(read_half, write_half, &mut outbound_rx, &mut shutdown)
                .await
            {
                SessionEnd::Shutdown => return,
                SessionEnd::Lost => {
                    warn!(
                        address = %self.address,
                        retry_in = ?self.config.reconnect_interval,
                        "Validator connection lost"
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => return,
                        _ = tokio::time::sleep(self.config.reconnect_interval) => {}
                    }
                }
            }
        }
    }

    async fn serve(
        &self,
        read_half: OwnedReadHalf,
        mut write_half: OwnedWriteHalf,
        outbound_rx: &mut mpsc::UnboundedReceiver<Message>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        let mut reader = tokio::spawn(read_loop(
            read_half,
            self.config.max_frame_size,
            Arc::clone(&self.listener),
            self.outbound.clone(),
        ));

        let end = loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break SessionEnd::Shutdown,
                result = &mut reader => {
                    match result {
                        Ok(e) => debug!(error = %e, "Validator read loop ended"),
                        Err(e) => error!(error = %e, "Validator read loop failed"),
                    }
                    return SessionEnd::Lost;
                }
                next = outbound_rx.recv() => {
                    let Some(message) = next else {
                        break SessionEnd::Shutdown;
                    };
                    let bytes = match message.encode() {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            warn!(
                                correlation_id = %message.correlation_id,
                                error = %e,
                                "Dropping unencodable outbound message"
                            );
                            continue;
                        }
                    };
                    if let Err(e) =
                        write_frame(&mut write_half, &bytes, self.config.max_frame_size).await
                    {
                        warn!(
                            correlation_id = %message.correlation_id,
                            message_type = ?message.message_type,
                            error = %e,
                            "Failed to write frame"
                        );
                        if e.is_transport() {
                            break SessionEnd::Lost;
                        }
                    }
                }
            }
        };

        reader.abort();
        end
    }
}

/// Read frames until the socket fails, returning the failure.
async fn read_loop(
    mut read_half: OwnedReadHalf,
    max_frame_size: usize,
    listener: Arc<dyn StreamListener>,
    outbound: mpsc::UnboundedSender<Message>,
) -> StreamError {
    loop {
        let frame = match read_frame(&mut read_half, max_frame_size).await {
            Ok(frame) => frame,
            Err(e) => return e,
        };

        let message = match Message::decode(&frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, length = frame.len(), "Dropping undecodable frame");
                continue;
            }
        };

        if message.message_type == MessageType::PingRequest {
            let reply = PingResponse {}.to_reply(&message);
            match reply {
                Ok(pong) => {
                    debug!(correlation_id = %message.correlation_id, "Answering ping");
                    if outbound.send(pong).is_err() {
                        return StreamError::NotConnected;
                    }
                }
                Err(e) => warn!(error = %e, "Failed to build ping response"),
            }
            continue;
        }

        listener.on_message(message);
    }
}
