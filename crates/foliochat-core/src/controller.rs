//! Session controller: the per-conversation state machine.
//!
//! Owns the message history and the single in-flight cancellation
//! handle. Each turn runs the decision procedure: open the stream
//! transport, project decoded events onto the placeholder record, and on
//! a network-level fault (only) fall back to the sync transport. Every
//! failure resolves to a terminal, user-visible message state; nothing
//! here is fatal to the host process.
//!
//! Multiple handles to one controller are cheap clones sharing the same
//! session; independent sessions are independent controllers.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use foliochat_types::chat::{ChatMessage, MessageRole};
use foliochat_types::error::ChatError;
use foliochat_types::event::{StreamEvent, TurnRequest};

use crate::identity::ThreadIdentityStore;
use crate::projector::project;
use crate::store::KvStore;
use crate::transport::{StreamTransport, SyncTransport};

/// Hard bound on one turn; shares the turn's cancellation token with
/// user-initiated cancellation, so either fires it exactly once.
pub const TURN_TIMEOUT: Duration = Duration::from_secs(60);

/// The in-flight turn's cancellation handle, tagged with a generation
/// number so a superseded turn's cleanup never clears the superseding
/// turn's live handle.
struct InflightTurn {
    generation: u64,
    token: CancellationToken,
}

struct SessionState {
    messages: Vec<ChatMessage>,
    inflight: Option<InflightTurn>,
    turn_seq: u64,
}

struct Inner<S, F, K: KvStore> {
    stream: S,
    sync: F,
    identity: ThreadIdentityStore<K>,
    state: Mutex<SessionState>,
}

/// Conversational session client over a stream transport with a sync
/// fallback.
pub struct SessionController<S, F, K: KvStore> {
    inner: Arc<Inner<S, F, K>>,
}

impl<S, F, K: KvStore> Clone for SessionController<S, F, K> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S, F, K> SessionController<S, F, K>
where
    S: StreamTransport,
    F: SyncTransport,
    K: KvStore,
{
    /// Create a session seeded with the welcome record.
    pub fn new(stream: S, sync: F, store: K) -> Self {
        Self {
            inner: Arc::new(Inner {
                stream,
                sync,
                identity: ThreadIdentityStore::new(store),
                state: Mutex::new(SessionState {
                    messages: vec![ChatMessage::welcome()],
                    inflight: None,
                    turn_seq: 0,
                }),
            }),
        }
    }

    /// Snapshot of the current message history.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state().messages.clone()
    }

    /// True iff a turn is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().inflight.is_some()
    }

    /// Run one turn: append a user record and a streaming placeholder,
    /// consume the event stream, and finalize the placeholder. A send
    /// always supersedes (cancels) any prior in-flight turn. Empty input
    /// is a no-op.
    pub async fn send(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let (token, generation, bot_id) = {
            let mut state = self.state();
            if let Some(prior) = state.inflight.take() {
                debug!("superseding in-flight turn");
                prior.token.cancel();
            }
            state.turn_seq += 1;
            let generation = state.turn_seq;
            let token = CancellationToken::new();
            state.inflight = Some(InflightTurn { generation, token: token.clone() });

            let placeholder = ChatMessage::placeholder();
            let bot_id = placeholder.id;
            state.messages.push(ChatMessage::user(trimmed));
            state.messages.push(placeholder);
            (token, generation, bot_id)
        };

        let thread_id = self.inner.identity.get().await;
        let request = TurnRequest {
            message: trimmed.to_string(),
            thread_id,
        };

        // Safety timer on the shared handle; cancellation is idempotent.
        let watchdog = tokio::spawn({
            let token = token.clone();
            async move {
                tokio::select! {
                    _ = tokio::time::sleep(TURN_TIMEOUT) => {
                        warn!("turn exceeded {}s, cancelling", TURN_TIMEOUT.as_secs());
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            }
        });

        self.run_turn(request, token, bot_id).await;

        watchdog.abort();
        let mut state = self.state();
        if state
            .inflight
            .as_ref()
            .is_some_and(|turn| turn.generation == generation)
        {
            state.inflight = None;
        }
    }

    async fn run_turn(&self, request: TurnRequest, token: CancellationToken, bot_id: Uuid) {
        let mut events = self.inner.stream.open(request.clone(), token.clone());
        let mut fault = None;

        while let Some(item) = events.next().await {
            match item {
                Ok(StreamEvent::Done { thread_id: renamed }) => {
                    self.with_message(bot_id, |m| {
                        project(m, &StreamEvent::Done { thread_id: renamed.clone() });
                    });
                    if !renamed.is_empty() {
                        self.inner.identity.replace(&renamed).await;
                    }
                    break;
                }
                Ok(StreamEvent::Error { message }) => {
                    debug!(message = %message, "server-classified stream error");
                    self.with_message(bot_id, |m| m.finalize_error(message.clone()));
                    break;
                }
                Ok(StreamEvent::ThreadReset { message }) => {
                    info!("server reset the conversation");
                    {
                        let mut state = self.state();
                        state.messages =
                            vec![ChatMessage::welcome(), ChatMessage::notice(message)];
                    }
                    self.inner.identity.reset().await;
                    break;
                }
                Ok(event) => {
                    self.with_message(bot_id, |m| project(m, &event));
                }
                Err(f) => {
                    fault = Some(f);
                    break;
                }
            }
        }
        drop(events);

        match fault {
            None => {
                // Clean stream end (or terminal event already applied).
                self.with_message(bot_id, |m| {
                    if !m.is_error && m.text.is_empty() {
                        m.finalize_error(ChatError::EmptyTurn.to_string());
                    } else {
                        m.is_streaming = false;
                    }
                });
            }
            Some(_) if token.is_cancelled() => {
                // clear() or a superseding send; keep any partial text.
                self.with_message(bot_id, |m| {
                    if m.is_streaming {
                        m.is_streaming = false;
                        if m.text.is_empty() {
                            m.text = ChatError::Cancelled.to_string();
                            m.is_error = true;
                        }
                    }
                });
            }
            Some(fault) => {
                warn!(fault = %fault, "stream transport fault, falling back to sync");
                self.with_message(bot_id, |m| {
                    m.thinking_steps.clear();
                    m.is_fallback = true;
                });
                match self.inner.sync.send(request).await {
                    Ok(reply) => {
                        self.inner.identity.replace(&reply.thread_id).await;
                        self.with_message(bot_id, |m| {
                            m.text = reply.response.clone();
                            m.sources = reply.sources.clone();
                            m.email_sent = Some(reply.email_sent);
                            m.is_streaming = false;
                        });
                    }
                    Err(err) => {
                        self.with_message(bot_id, |m| m.finalize_error(err.to_string()));
                    }
                }
            }
        }
    }

    /// Cancel any in-flight turn, reset the history to the welcome
    /// record, and start a fresh conversation identity.
    pub async fn clear(&self) {
        {
            let mut state = self.state();
            if let Some(turn) = state.inflight.take() {
                turn.token.cancel();
            }
            state.messages = vec![ChatMessage::welcome()];
        }
        self.inner.identity.reset().await;
    }

    /// Resubmit the most recent user message: every record from that
    /// user record onward is removed and `send` recreates the pair, so
    /// the text appears exactly once. No-op without a user record.
    pub async fn retry(&self) {
        let text = {
            let mut state = self.state();
            let Some(idx) = state
                .messages
                .iter()
                .rposition(|m| m.role == MessageRole::User)
            else {
                return;
            };
            let text = state.messages[idx].text.clone();
            state.messages.truncate(idx);
            text
        };
        self.send(&text).await;
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_message(&self, id: Uuid, apply: impl FnOnce(&mut ChatMessage)) {
        let mut state = self.state();
        if let Some(message) = state.messages.iter_mut().find(|m| m.id == id) {
            apply(message);
        }
    }
}
