//! Generation session: one request's lifecycle
//!
//! `GenerationSession` owns the state machine from [`state`] plus the single
//! stream task feeding it. Increments travel from the task to the owner over
//! an mpsc channel; the owner pulls them with [`GenerationSession::recv`] and
//! applies them with [`GenerationSession::handle`], so there is exactly one
//! writer and every reader sees whole snapshots.
//!
//! Observers that don't own the session can [`subscribe`](GenerationSession::subscribe)
//! to a watch channel that is updated on every transition.
//!
//! Submitting while a stream is in flight is ignored: the first stream keeps
//! running and its partial result is not reset.

mod model;
mod state;

pub use model::{CodeBlock, PartialCodeBlock, Prompt};
pub use state::{Applied, SessionError, SessionSnapshot, SessionState, SessionStatus};

use crate::events::{SessionEvent, StreamEvent};
use crate::schema::ObjectSchema;
use crate::service::{GenerationService, IncrementStream};
use anyhow::Result;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Capacity of the task -> owner channel. A full channel pauses the stream task.
const EVENT_BUFFER: usize = 64;

/// Result of a submit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A stream was opened with this ticket
    Started(u64),
    /// A stream is already in flight; nothing changed
    Ignored,
}

/// Effect of handling one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The partial result was replaced
    Updated,
    /// The stream closed cleanly
    Completed,
    /// The session moved to errored (transport failure or schema violation)
    Failed,
    /// The event belonged to a finished or superseded stream
    Stale,
}

/// Orchestrates one generation request at a time
pub struct GenerationSession {
    service: Arc<dyn GenerationService>,
    partial_schema: ObjectSchema,
    strict_schema: ObjectSchema,
    state: SessionState,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
    task: Option<JoinHandle<()>>,
    notify: watch::Sender<SessionSnapshot>,
}

impl GenerationSession {
    pub fn new(service: Arc<dyn GenerationService>) -> Result<Self> {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (notify, _) = watch::channel(SessionSnapshot::default());

        Ok(Self {
            service,
            partial_schema: ObjectSchema::code_block_partial()?,
            strict_schema: ObjectSchema::code_block()?,
            state: SessionState::new(),
            events_tx,
            events_rx,
            task: None,
            notify,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn partial(&self) -> &PartialCodeBlock {
        self.state.partial()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.state.error()
    }

    /// The finished object, present once a stream closed with both fields
    pub fn final_block(&self) -> Option<&CodeBlock> {
        self.state.final_block()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// Receive a snapshot on every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.notify.subscribe()
    }

    pub fn service_label(&self) -> String {
        self.service.describe()
    }

    /// Open a stream for `prompt` unless one is already in flight
    pub fn submit(&mut self, prompt: Prompt) -> SubmitOutcome {
        let Some(ticket) = self.state.begin() else {
            tracing::debug!("Submit ignored: a generation is already streaming");
            return SubmitOutcome::Ignored;
        };

        // Nothing from an older stream may survive into this one
        self.abort_task();

        tracing::info!("Generation #{} started ({} chars)", ticket, prompt.as_str().len());
        let stream = self.service.stream(prompt);
        let tx = self.events_tx.clone();
        self.task = Some(tokio::spawn(pump(ticket, stream, tx)));

        self.publish();
        SubmitOutcome::Started(ticket)
    }

    /// Wait for the next event from the stream task.
    ///
    /// Pends forever while nothing is streaming, which makes it safe to use
    /// as a `tokio::select!` branch.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply one event from the stream task
    pub fn handle(&mut self, event: SessionEvent) -> Transition {
        let ticket = event.ticket;
        let transition = match event.kind {
            StreamEvent::Increment(value) => {
                match self.state.apply(ticket, &value, &self.partial_schema) {
                    Applied::Updated => Transition::Updated,
                    Applied::Rejected => {
                        // Close the channel: the offending stream must not deliver more
                        self.abort_task();
                        Transition::Failed
                    }
                    Applied::Stale => Transition::Stale,
                }
            }
            StreamEvent::Finished => {
                if self.state.finish(ticket, &self.strict_schema) {
                    tracing::info!(
                        "Generation #{} complete ({} bytes of code)",
                        ticket,
                        self.state.partial().code_len()
                    );
                    self.task = None;
                    Transition::Completed
                } else {
                    Transition::Stale
                }
            }
            StreamEvent::Failed(err) => {
                if self
                    .state
                    .fail(ticket, SessionError::Transport(err.to_string()))
                {
                    tracing::error!("Generation #{} failed: {}", ticket, err);
                    self.task = None;
                    Transition::Failed
                } else {
                    Transition::Stale
                }
            }
        };

        if transition != Transition::Stale {
            self.publish();
        } else {
            tracing::trace!("Dropped stale event for generation #{}", ticket);
        }
        transition
    }

    /// Stop the in-flight stream. Returns false when nothing was streaming.
    pub fn cancel(&mut self) -> bool {
        if !self.state.cancel() {
            return false;
        }
        self.abort_task();
        tracing::info!("Generation #{} cancelled", self.state.ticket());
        self.publish();
        true
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn publish(&self) {
        self.notify.send_replace(self.state.snapshot());
    }
}

impl Drop for GenerationSession {
    fn drop(&mut self) {
        // Teardown mid-stream closes the connection; nothing outlives the owner
        self.abort_task();
    }
}

/// Forward everything the service produces to the owner, in order
async fn pump(ticket: u64, mut stream: IncrementStream, tx: mpsc::Sender<SessionEvent>) {
    while let Some(item) = stream.next().await {
        let kind = match item {
            Ok(value) => StreamEvent::Increment(value),
            Err(err) => {
                let _ = tx
                    .send(SessionEvent::new(ticket, StreamEvent::Failed(err)))
                    .await;
                return;
            }
        };
        if tx.send(SessionEvent::new(ticket, kind)).await.is_err() {
            // Owner is gone
            return;
        }
    }
    let _ = tx
        .send(SessionEvent::new(ticket, StreamEvent::Finished))
        .await;
}
