//! Rendezvous between a running tool and the human driving a session.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::agent_loop::{AgentEvent, EventEmitter};
use crate::error::AgentError;

/// A line of human input plus the acknowledgement the tool sends on receipt.
pub(crate) struct InputDelivery {
    text: String,
    ack: oneshot::Sender<()>,
}

/// Create a connected sender/requester pair.
///
/// The channel holds at most one undelivered line; [`InputSender::deliver`]
/// only returns once a tool has taken it.
pub(crate) fn input_channel(cancel: CancellationToken) -> (InputSender, InputRequester) {
    let (tx, rx) = mpsc::channel(1);
    (
        InputSender { tx },
        InputRequester {
            rx: Arc::new(Mutex::new(rx)),
            events: EventEmitter::disabled(),
            cancel,
        },
    )
}

/// Caller side of the input channel.
#[derive(Clone)]
pub(crate) struct InputSender {
    tx: mpsc::Sender<InputDelivery>,
}

impl InputSender {
    /// Hand `text` to whichever tool is waiting, blocking until it is taken.
    pub(crate) async fn deliver(
        &self,
        text: String,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        let (ack, taken) = oneshot::channel();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::ContextCancelled),
            sent = self.tx.send(InputDelivery { text, ack }) => {
                sent.map_err(|_| AgentError::SessionClosed)?;
            }
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::ContextCancelled),
            taken = taken => taken.map_err(|_| AgentError::SessionClosed),
        }
    }
}

/// Tool side of the input channel, handed to tools via
/// [`ToolContext`](crate::tools::ToolContext).
#[derive(Clone)]
pub struct InputRequester {
    rx: Arc<Mutex<mpsc::Receiver<InputDelivery>>>,
    events: EventEmitter,
    cancel: CancellationToken,
}

impl InputRequester {
    /// Same channel, publishing `NeedInput` through `events`.
    pub(crate) fn with_events(&self, events: EventEmitter) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
            events,
            cancel: self.cancel.clone(),
        }
    }

    /// Announce `prompt` and wait for the next line of input.
    pub async fn request(
        &self,
        prompt: impl Into<String>,
        tool_call_id: &str,
        iteration: usize,
    ) -> Result<String, AgentError> {
        let prompt = prompt.into();
        debug!(tool_call_id, %prompt, "tool requested input");
        self.events
            .emit(AgentEvent::NeedInput {
                iteration,
                tool_call_id: tool_call_id.to_string(),
                prompt,
            })
            .await;

        let mut rx = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(AgentError::ContextCancelled),
            guard = self.rx.lock() => guard,
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AgentError::ContextCancelled),
            delivery = rx.recv() => match delivery {
                Some(InputDelivery { text, ack }) => {
                    // The sender may have been cancelled in the meantime.
                    let _ = ack.send(());
                    Ok(text)
                }
                None => Err(AgentError::SessionClosed),
            },
        }
    }
}

impl std::fmt::Debug for InputRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputRequester")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
