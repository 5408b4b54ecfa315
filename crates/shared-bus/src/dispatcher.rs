//! # Correlated Dispatcher
//!
//! Turns the fire-and-forget [`Stream`] into a request/response interface.
//!
//! Flow:
//! 1. `call` assigns a correlation id if the message has none
//! 2. A pending entry is registered under that id, then the message is sent
//! 3. The stream's reader hands every inbound frame to `resolve`
//! 4. `resolve` removes the matching entry and completes the waiting caller
//!
//! An entry is removed exactly once, by whichever of `resolve`, cancellation
//! or `remove_stale` gets to it first. A response arriving after that finds
//! nothing and is dropped.
//!
//! A second `call` with an id that is still pending does not send again; it
//! waits on the same response as the first caller. A waiter that cancels
//! only gives up its own wait; the entry goes away when the last waiter
//! cancels.

use crate::config::StreamConfig;
use crate::errors::StreamError;
use crate::stream::{Stream, StreamListener};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{FutureExt, Shared};
use shared_types::{Message, MessageType, Payload};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type ResponseFuture = Shared<oneshot::Receiver<Message>>;

/// A call waiting for its response.
struct PendingCall {
    sender: oneshot::Sender<Message>,
    /// Handed to callers that reuse the id while this call is in flight.
    response: ResponseFuture,
    /// Callers currently awaiting `response`.
    waiters: usize,
    /// Distinguishes this call from a later one that reuses the id.
    generation: u64,
    created_at: Instant,
    message_type: MessageType,
}

/// Counters for the pending-call table.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Calls that registered a new pending entry.
    pub registered: AtomicU64,
    /// Calls completed by a matching response.
    pub completed: AtomicU64,
    /// Calls cancelled, timed out, or expired.
    pub cancelled: AtomicU64,
    /// Inbound messages that matched no pending call.
    pub unmatched: AtomicU64,
}

/// Request/response multiplexer over one validator stream.
pub struct CorrelatedDispatcher {
    stream: Stream,
    pending: DashMap<String, PendingCall>,
    stats: DispatcherStats,
}

impl CorrelatedDispatcher {
    /// Create a dispatcher over an unconnected stream.
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        Self {
            stream: Stream::new(config),
            pending: DashMap::new(),
            stats: DispatcherStats::default(),
        }
    }

    /// Connect, with this dispatcher consuming every inbound frame.
    pub fn connect(self: &Arc<Self>) -> Result<(), StreamError> {
        let listener: Arc<dyn StreamListener> = Arc::clone(self) as Arc<dyn StreamListener>;
        self.stream.connect(listener)
    }

    /// Connect with a custom listener.
    ///
    /// The listener is responsible for passing responses to [`Self::resolve`].
    pub fn connect_with(&self, listener: Arc<dyn StreamListener>) -> Result<(), StreamError> {
        self.stream.connect(listener)
    }

    /// Disconnect the stream.
    ///
    /// Calls still waiting are failed with [`StreamError::Cancelled`].
    pub async fn disconnect(&self) {
        self.stream.disconnect().await;

        let abandoned = self.pending.len();
        self.pending.clear();
        if abandoned > 0 {
            self.stats
                .cancelled
                .fetch_add(abandoned as u64, Ordering::Relaxed);
            warn!(abandoned, "Dispatcher disconnected with calls in flight");
        }
    }

    /// Whether the underlying stream is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_connected()
    }

    /// Send `message` and wait for the response carrying the same correlation id.
    pub async fn call(&self, message: Message) -> Result<Message, StreamError> {
        self.call_until(message, std::future::pending()).await
    }

    /// Like [`Self::call`], giving up when `token` is cancelled.
    pub async fn call_with_cancel(
        &self,
        message: Message,
        token: &CancellationToken,
    ) -> Result<Message, StreamError> {
        self.call_until(message, token.cancelled()).await
    }

    /// Like [`Self::call`], giving up after `timeout`.
    pub async fn call_with_timeout(
        &self,
        message: Message,
        timeout: Duration,
    ) -> Result<Message, StreamError> {
        self.call_until(message, tokio::time::sleep(timeout)).await
    }

    async fn call_until<C>(&self, mut message: Message, cancel: C) -> Result<Message, StreamError>
    where
        C: Future<Output = ()>,
    {
        if message.correlation_id.is_empty() {
            message.correlation_id = Message::new_correlation_id();
        }
        let correlation_id = message.correlation_id.clone();

        let (response, generation) = match self.pending.entry(correlation_id.clone()) {
            Entry::Occupied(mut entry) => {
                debug!(
                    correlation_id = %correlation_id,
                    "Joining call already in flight"
                );
                let call = entry.get_mut();
                call.waiters += 1;
                (call.response.clone(), call.generation)
            }
            Entry::Vacant(entry) => {
                let (sender, receiver) = oneshot::channel();
                let response = receiver.shared();
                let generation = self.stats.registered.fetch_add(1, Ordering::Relaxed);
                entry.insert(PendingCall {
                    sender,
                    response: response.clone(),
                    waiters: 1,
                    generation,
                    created_at: Instant::now(),
                    message_type: message.message_type,
                });

                if let Err(e) = self.stream.send(message) {
                    self.pending.remove(&correlation_id);
                    return Err(e);
                }
                (response, generation)
            }
        };

        tokio::select! {
            biased;
            result = response => result.map_err(|_| StreamError::Cancelled),
            () = cancel => {
                self.release(&correlation_id, generation);
                debug!(correlation_id = %correlation_id, "Call cancelled");
                Err(StreamError::Cancelled)
            }
        }
    }

    /// Drop one waiter from the call registered as `generation`; remove the
    /// entry once nobody is left waiting on it.
    fn release(&self, correlation_id: &str, generation: u64) {
        let Entry::Occupied(mut entry) = self.pending.entry(correlation_id.to_string()) else {
            return;
        };
        if entry.get().generation != generation {
            return;
        }
        if entry.get().waiters > 1 {
            entry.get_mut().waiters -= 1;
        } else {
            entry.remove();
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Send a typed request and decode the typed response.
    pub async fn request<Req, Resp>(&self, request: &Req) -> Result<Resp, StreamError>
    where
        Req: Payload,
        Resp: Payload,
    {
        let message = request.to_message().map_err(StreamError::Encode)?;
        let response = self.call(message).await?;
        Ok(response.payload::<Resp>()?)
    }

    /// [`Self::request`] bounded by `timeout`.
    pub async fn request_with_timeout<Req, Resp>(
        &self,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp, StreamError>
    where
        Req: Payload,
        Resp: Payload,
    {
        let message = request.to_message().map_err(StreamError::Encode)?;
        let response = self.call_with_timeout(message, timeout).await?;
        Ok(response.payload::<Resp>()?)
    }

    /// Send a message that answers a validator request.
    ///
    /// No pending entry is created; nothing is expected back.
    pub fn reply(&self, message: Message) -> Result<(), StreamError> {
        self.stream.send(message)
    }

    /// Complete the pending call matching `message`.
    ///
    /// Returns the message back when no call is waiting for it.
    pub fn resolve(&self, message: Message) -> Option<Message> {
        let Some((correlation_id, call)) = self.pending.remove(&message.correlation_id) else {
            self.stats.unmatched.fetch_add(1, Ordering::Relaxed);
            return Some(message);
        };

        debug!(
            correlation_id = %correlation_id,
            request_type = ?call.message_type,
            response_type = ?message.message_type,
            elapsed_ms = call.created_at.elapsed().as_millis(),
            "Call completed"
        );
        if call.sender.send(message).is_ok() {
            self.stats.completed.fetch_add(1, Ordering::Relaxed);
        }
        None
    }

    /// Drop entries older than `max_age`, failing their callers.
    ///
    /// Returns the number of entries removed.
    pub fn remove_stale(&self, max_age: Duration) -> usize {
        let mut removed = 0;
        self.pending.retain(|id, call| {
            let age = call.created_at.elapsed();
            if age > max_age {
                warn!(
                    correlation_id = %id,
                    request_type = ?call.message_type,
                    age_ms = age.as_millis(),
                    "Removing stale pending call"
                );
                removed += 1;
                false
            } else {
                true
            }
        });
        self.stats
            .cancelled
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Number of calls waiting for a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a call with this correlation id is waiting.
    #[must_use]
    pub fn is_pending(&self, correlation_id: &str) -> bool {
        self.pending.contains_key(correlation_id)
    }

    /// Table counters.
    #[must_use]
    pub fn stats(&self) -> &DispatcherStats {
        &self.stats
    }
}

impl StreamListener for CorrelatedDispatcher {
    fn on_message(&self, message: Message) {
        if let Some(unmatched) = self.resolve(message) {
            debug!(
                correlation_id = %unmatched.correlation_id,
                message_type = ?unmatched.message_type,
                "Dropping response with no pending call"
            );
        }
    }
}

impl std::fmt::Debug for CorrelatedDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelatedDispatcher")
            .field("stream", &self.stream)
            .field("pending", &self.pending.len())
            .finish()
    }
}
