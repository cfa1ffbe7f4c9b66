//! Interactive, multi-turn sessions.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::input::{input_channel, InputRequester, InputSender};
use crate::agent_loop::{
    AgentEvent, EventEmitter, IterationBudget, LoopState, SessionEvent, TurnEngine, TurnScope,
};
use crate::error::AgentError;
use crate::types::{Message, Usage};

/// Capacity of the session event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 10;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to accept a user message.
    Idle,
    /// A turn is executing in the background.
    Running,
    /// Closed; irreversible.
    Closed,
}

struct Shared {
    messages: Vec<Message>,
    usage: Usage,
    iterations: usize,
    state: SessionState,
    events_tx: Option<mpsc::Sender<SessionEvent>>,
    input_tx: Option<InputSender>,
}

/// A long-lived conversation driven one turn at a time.
///
/// Every [`send`](Self::send) spawns one background turn; progress arrives on
/// the stream returned by [`events`](Self::events). History, usage and the
/// iteration counter persist across turns, and the iteration ceiling applies
/// to the session as a whole.
///
/// # Example
///
/// ```ignore
/// let session = agent.new_session(&CancellationToken::new());
/// let mut events = session.events().unwrap();
/// session.send("What's the weather in Oslo?")?;
/// while let Some(evt) = events.recv().await {
///     if evt.event.is_terminal() { break; }
/// }
/// session.close();
/// ```
pub struct Session {
    id: Uuid,
    engine: TurnEngine,
    max_loops: usize,
    cancel: CancellationToken,
    shared: Arc<RwLock<Shared>>,
    state_tx: Arc<watch::Sender<SessionState>>,
    state_rx: watch::Receiver<SessionState>,
    seq: Arc<AtomicU64>,
    events_rx: Mutex<Option<mpsc::Receiver<SessionEvent>>>,
    input: InputRequester,
}

impl Session {
    pub(crate) fn new(
        engine: TurnEngine,
        system_prompt: &str,
        max_loops: usize,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (input_tx, input) = input_channel(cancel.clone());
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let id = Uuid::new_v4();

        info!(session_id = %id, max_loops, "session opened");

        Self {
            id,
            engine,
            max_loops,
            cancel,
            shared: Arc::new(RwLock::new(Shared {
                messages: vec![Message::system(system_prompt)],
                usage: Usage::default(),
                iterations: 0,
                state: SessionState::Idle,
                events_tx: Some(events_tx),
                input_tx: Some(input_tx),
            })),
            state_tx: Arc::new(state_tx),
            state_rx,
            seq: Arc::new(AtomicU64::new(1)),
            events_rx: Mutex::new(Some(events_rx)),
            input,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a user message and start a background turn.
    ///
    /// Returns as soon as the turn is spawned; must be called from within a
    /// Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`AgentError::SessionClosed`] after [`close`](Self::close);
    /// [`AgentError::ContextCancelled`] once the parent scope is cancelled;
    /// [`AgentError::TurnInProgress`] until the previous turn has delivered its
    /// terminal event (see [`wait_for_idle`](Self::wait_for_idle)).
    pub fn send(&self, text: impl Into<String>) -> Result<(), AgentError> {
        let mut shared = write(&self.shared);
        let events_tx = match (shared.state, &shared.events_tx) {
            (SessionState::Closed, _) | (_, None) => return Err(AgentError::SessionClosed),
            _ if self.cancel.is_cancelled() => return Err(AgentError::ContextCancelled),
            (SessionState::Running, _) => return Err(AgentError::TurnInProgress),
            (SessionState::Idle, Some(tx)) => tx.clone(),
        };
        shared.messages.push(Message::user(text));
        shared.state = SessionState::Running;
        let _ = self.state_tx.send(SessionState::Running);
        let history_len = shared.messages.len();
        drop(shared);

        debug!(session_id = %self.id, messages = history_len, "starting turn");

        let events = EventEmitter::new(self.id, self.seq.clone(), events_tx, self.cancel.clone());
        let turn = Turn {
            session_id: self.id,
            engine: self.engine.clone(),
            max_loops: self.max_loops,
            shared: self.shared.clone(),
            state_tx: self.state_tx.clone(),
            scope: TurnScope {
                input: Some(self.input.with_events(events.clone())),
                events,
                cancel: self.cancel.clone(),
            },
        };
        tokio::spawn(turn.run());
        Ok(())
    }

    /// Deliver a line of input to the tool waiting on it.
    ///
    /// Completes only once a tool has taken the value.
    ///
    /// # Errors
    ///
    /// [`AgentError::SessionClosed`] after [`close`](Self::close);
    /// [`AgentError::ContextCancelled`] if the session is cancelled first.
    pub async fn send_input(&self, text: impl Into<String>) -> Result<(), AgentError> {
        let sender = {
            let shared = read(&self.shared);
            match (shared.state, &shared.input_tx) {
                (SessionState::Closed, _) | (_, None) => return Err(AgentError::SessionClosed),
                (_, Some(tx)) => tx.clone(),
            }
        };
        sender.deliver(text.into(), &self.cancel).await
    }

    /// Take the receiving side of the event stream.
    ///
    /// Returns `None` after the first call. The stream ends once the session
    /// is closed and any running turn has wound down.
    pub fn events(&self) -> Option<mpsc::Receiver<SessionEvent>> {
        self.events_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Close the session. Idempotent.
    ///
    /// Cancels any running turn and closes both channels.
    pub fn close(&self) {
        let mut shared = write(&self.shared);
        if shared.state == SessionState::Closed {
            return;
        }
        shared.state = SessionState::Closed;
        shared.events_tx = None;
        shared.input_tx = None;
        let _ = self.state_tx.send(SessionState::Closed);
        drop(shared);

        self.cancel.cancel();
        info!(session_id = %self.id, "session closed");
    }

    /// Snapshot of the conversation history.
    pub fn history(&self) -> Vec<Message> {
        read(&self.shared).messages.clone()
    }

    /// Usage summed over every turn so far.
    pub fn usage(&self) -> Usage {
        read(&self.shared).usage
    }

    /// Iterations consumed over the session lifetime.
    pub fn iterations(&self) -> usize {
        read(&self.shared).iterations
    }

    pub fn max_loops(&self) -> usize {
        self.max_loops
    }

    pub fn state(&self) -> SessionState {
        read(&self.shared).state
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    pub fn is_turn_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Subscribe to state changes via a [`watch::Receiver`].
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Wait until no turn is running.
    ///
    /// Returns immediately when idle or closed.
    pub async fn wait_for_idle(&self) {
        let mut rx = self.state_rx.clone();
        let _ = rx.wait_for(|state| *state != SessionState::Running).await;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("max_loops", &self.max_loops)
            .finish()
    }
}

/// One background turn.
struct Turn {
    session_id: Uuid,
    engine: TurnEngine,
    max_loops: usize,
    shared: Arc<RwLock<Shared>>,
    state_tx: Arc<watch::Sender<SessionState>>,
    scope: TurnScope,
}

impl Turn {
    async fn run(self) {
        let (mut messages, mut state) = {
            let shared = read(&self.shared);
            (
                shared.messages.clone(),
                LoopState {
                    budget: IterationBudget::resume(self.max_loops, shared.iterations),
                    usage: shared.usage,
                },
            )
        };

        let result = self.engine.run(&mut messages, &mut state, &self.scope).await;
        let iteration = state.budget.used();

        {
            let mut shared = write(&self.shared);
            shared.usage = state.usage;
            shared.iterations = iteration;
            if result.is_ok() {
                shared.messages = messages;
            }
        }

        let event = match result {
            Ok(result) => {
                info!(
                    session_id = %self.session_id,
                    iterations = result.iterations,
                    total_tokens = result.usage.total_tokens,
                    "turn finished"
                );
                AgentEvent::TurnComplete {
                    iteration,
                    content: result.content,
                    usage: result.usage,
                }
            }
            Err(err) => {
                if matches!(err, AgentError::ContextCancelled) {
                    debug!(session_id = %self.session_id, "turn cancelled");
                } else {
                    error!(session_id = %self.session_id, error = %err, "turn failed");
                }
                AgentEvent::Error {
                    iteration,
                    message: err.to_string(),
                }
            }
        };
        self.scope.events.emit(event).await;

        // Only go idle once the terminal event is out, so the next turn's
        // events cannot overtake it.
        let mut shared = write(&self.shared);
        if shared.state == SessionState::Running {
            shared.state = SessionState::Idle;
            let _ = self.state_tx.send(SessionState::Idle);
        }
    }
}

fn read(lock: &RwLock<Shared>) -> RwLockReadGuard<'_, Shared> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(lock: &RwLock<Shared>) -> RwLockWriteGuard<'_, Shared> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
