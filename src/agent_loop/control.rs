use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::events::{AgentEvent, SessionEvent};

/// Publishes events into a session's bounded channel.
///
/// Delivery is best-effort and at-most-once: a full channel applies
/// back-pressure to the turn, but once the scope is cancelled pending and
/// future events are dropped instead of blocking.
#[derive(Clone, Default)]
pub struct EventEmitter {
    inner: Option<Arc<EmitterInner>>,
}

struct EmitterInner {
    session_id: Uuid,
    seq: Arc<AtomicU64>,
    tx: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
}

impl EventEmitter {
    /// An emitter that discards everything (one-shot runs).
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub(crate) fn new(
        session_id: Uuid,
        seq: Arc<AtomicU64>,
        tx: mpsc::Sender<SessionEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inner: Some(Arc::new(EmitterInner {
                session_id,
                seq,
                tx,
                cancel,
            })),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub async fn emit(&self, event: AgentEvent) {
        let Some(inner) = &self.inner else {
            return;
        };
        if inner.cancel.is_cancelled() {
            tracing::debug!(session_id = %inner.session_id, "context cancelled, dropping event");
            return;
        }
        let seq = inner.seq.fetch_add(1, Ordering::SeqCst);
        let envelope = SessionEvent {
            session_id: inner.session_id,
            seq,
            timestamp: chrono::Utc::now(),
            event,
        };
        tokio::select! {
            biased;
            _ = inner.cancel.cancelled() => {
                tracing::debug!(
                    session_id = %inner.session_id,
                    seq,
                    "context cancelled, stopping event emission"
                );
            }
            sent = inner.tx.send(envelope) => {
                if sent.is_err() {
                    tracing::debug!(session_id = %inner.session_id, "event receiver dropped");
                }
            }
        }
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("session_id", &self.inner.as_ref().map(|i| i.session_id))
            .finish()
    }
}
