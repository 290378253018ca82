// Session state machine
//
// Pure state for one generation session, kept apart from the task and
// channel plumbing in `session::GenerationSession` so every transition can
// be unit tested without a runtime.
//
// State Diagram:
//
//                 submit                  increment (valid)
//   [Idle] ─────────────────▶ [Streaming] ◀──────────┐
//                               │  │  │  └───────────┘
//                 clean close   │  │  │ increment (invalid) / transport error / cancel
//            ┌──────────────────┘  │  └─────────────────────┐
//            ▼                     │                        ▼
//       [Complete]                 │                    [Errored]
//            │      submit         │        submit          │
//            └────────────────▶ [Streaming] ◀───────────────┘
//                         (partial result reset)
//
// Every stream is identified by a ticket. Events carrying any ticket other
// than the current one belong to a stream that was cancelled or superseded
// and are dropped without touching state.

use super::model::{CodeBlock, PartialCodeBlock};
use crate::schema::ObjectSchema;
use serde_json::Value;
use std::fmt;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Errored,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Streaming => "streaming",
            SessionStatus::Complete => "complete",
            SessionStatus::Errored => "errored",
        }
    }
}

/// Why a session ended in `Errored`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The stream terminated abnormally
    Transport(String),
    /// An increment did not match the declared shape
    SchemaViolation(String),
    /// The user stopped the stream
    Cancelled,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(msg) => write!(f, "Transport failure: {}", msg),
            SessionError::SchemaViolation(msg) => write!(f, "Schema violation: {}", msg),
            SessionError::Cancelled => write!(f, "Generation stopped"),
        }
    }
}

impl std::error::Error for SessionError {}

/// What happened to an increment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Replaced the partial result
    Updated,
    /// Failed validation; session is now errored
    Rejected,
    /// Belonged to an old ticket or arrived outside `Streaming`
    Stale,
}

/// Read-only view of a session, handed to renderers and subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub partial: PartialCodeBlock,
    pub error: Option<SessionError>,
    pub final_block: Option<CodeBlock>,
    pub ticket: u64,
}

impl SessionSnapshot {
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Streaming
    }
}

/// State of one session: status, partial result, terminal error
#[derive(Debug, Default)]
pub struct SessionState {
    status: SessionStatus,
    partial: PartialCodeBlock,
    error: Option<SessionError>,
    final_block: Option<CodeBlock>,
    ticket: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn partial(&self) -> &PartialCodeBlock {
        &self.partial
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn final_block(&self) -> Option<&CodeBlock> {
        self.final_block.as_ref()
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Streaming
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            partial: self.partial.clone(),
            error: self.error.clone(),
            final_block: self.final_block.clone(),
            ticket: self.ticket,
        }
    }

    /// Start a new stream. Returns its ticket, or `None` while one is already streaming.
    pub fn begin(&mut self) -> Option<u64> {
        if self.status == SessionStatus::Streaming {
            return None;
        }
        self.ticket += 1;
        self.status = SessionStatus::Streaming;
        self.partial = PartialCodeBlock::default();
        self.error = None;
        self.final_block = None;
        Some(self.ticket)
    }

    fn is_current(&self, ticket: u64) -> bool {
        ticket == self.ticket && self.status == SessionStatus::Streaming
    }

    /// Validate an increment and, if it conforms, replace the partial result with it
    pub fn apply(&mut self, ticket: u64, value: &Value, schema: &ObjectSchema) -> Applied {
        if !self.is_current(ticket) {
            return Applied::Stale;
        }

        if let Err(violation) = schema.check(value) {
            self.reject(violation);
            return Applied::Rejected;
        }

        let next: PartialCodeBlock = match serde_json::from_value(value.clone()) {
            Ok(next) => next,
            Err(e) => {
                self.reject(e.to_string());
                return Applied::Rejected;
            }
        };

        if !self.partial.is_superseded_by(&next) {
            tracing::warn!(
                "Increment shrinks the partial result (code {} -> {} bytes)",
                self.partial.code_len(),
                next.code_len()
            );
        }

        self.partial = next;
        Applied::Updated
    }

    fn reject(&mut self, violation: String) {
        tracing::warn!("Rejected increment: {}", violation);
        self.status = SessionStatus::Errored;
        self.error = Some(SessionError::SchemaViolation(violation));
    }

    /// Clean close. The last valid partial is kept and checked against the strict shape.
    pub fn finish(&mut self, ticket: u64, strict: &ObjectSchema) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.status = SessionStatus::Complete;

        let value = serde_json::to_value(&self.partial).unwrap_or(Value::Null);
        self.final_block = match strict.check(&value) {
            Ok(()) => serde_json::from_value(value).ok(),
            Err(violation) => {
                tracing::warn!("Stream closed with an incomplete object: {}", violation);
                None
            }
        };
        true
    }

    /// Abnormal close. The last valid partial stays visible.
    pub fn fail(&mut self, ticket: u64, error: SessionError) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.status = SessionStatus::Errored;
        self.error = Some(error);
        true
    }

    /// Stop the current stream, if any. Later events for its ticket become stale.
    pub fn cancel(&mut self) -> bool {
        self.fail(self.ticket, SessionError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas() -> (ObjectSchema, ObjectSchema) {
        (
            ObjectSchema::code_block_partial().unwrap(),
            ObjectSchema::code_block().unwrap(),
        )
    }

    #[test]
    fn test_initial_state_is_idle() {
        let state = SessionState::new();
        assert_eq!(state.status(), SessionStatus::Idle);
        assert!(state.partial().is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_begin_refuses_while_streaming() {
        let mut state = SessionState::new();
        assert_eq!(state.begin(), Some(1));
        assert_eq!(state.begin(), None);
        assert_eq!(state.ticket(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let (partial, strict) = schemas();
        let mut state = SessionState::new();
        let ticket = state.begin().unwrap();

        let increments = [
            json!({}),
            json!({ "language": "rust" }),
            json!({ "language": "rust", "code": "fn" }),
            json!({ "language": "rust", "code": "fn main() {}" }),
        ];
        for inc in &increments {
            assert_eq!(state.apply(ticket, inc, &partial), Applied::Updated);
        }

        assert_eq!(
            state.partial(),
            &PartialCodeBlock::new(Some("fn main() {}"), Some("rust"))
        );
        assert!(state.finish(ticket, &strict));
        assert_eq!(state.status(), SessionStatus::Complete);
        assert_eq!(
            state.final_block(),
            Some(&CodeBlock {
                code: "fn main() {}".to_string(),
                language: "rust".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_increment_errors_and_keeps_previous() {
        let (partial, _) = schemas();
        let mut state = SessionState::new();
        let ticket = state.begin().unwrap();

        state.apply(ticket, &json!({ "language": "ts", "code": "a" }), &partial);
        let before = state.partial().clone();

        assert_eq!(
            state.apply(ticket, &json!({ "language": "ts", "code": 7 }), &partial),
            Applied::Rejected
        );
        assert_eq!(state.status(), SessionStatus::Errored);
        assert!(matches!(
            state.error(),
            Some(SessionError::SchemaViolation(_))
        ));
        assert_eq!(state.partial(), &before);

        // Further increments for the same ticket are ignored
        assert_eq!(
            state.apply(ticket, &json!({ "language": "ts", "code": "ab" }), &partial),
            Applied::Stale
        );
        assert_eq!(state.partial(), &before);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let (partial, strict) = schemas();
        let mut state = SessionState::new();
        let first = state.begin().unwrap();
        state.cancel();
        let second = state.begin().unwrap();

        assert_eq!(
            state.apply(first, &json!({ "code": "old" }), &partial),
            Applied::Stale
        );
        assert!(!state.finish(first, &strict));
        assert_eq!(state.status(), SessionStatus::Streaming);
        assert!(state.partial().is_empty());
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_transport_failure_keeps_partial() {
        let (partial, _) = schemas();
        let mut state = SessionState::new();
        let ticket = state.begin().unwrap();
        state.apply(ticket, &json!({ "language": "ts", "code": "x" }), &partial);

        assert!(state.fail(ticket, SessionError::Transport("reset".to_string())));
        assert_eq!(state.status(), SessionStatus::Errored);
        assert!(!state.is_loading());
        assert_eq!(state.partial().code.as_deref(), Some("x"));
    }

    #[test]
    fn test_finish_without_both_fields_has_no_final_block() {
        let (partial, strict) = schemas();
        let mut state = SessionState::new();
        let ticket = state.begin().unwrap();
        state.apply(ticket, &json!({ "language": "ts" }), &partial);

        assert!(state.finish(ticket, &strict));
        assert_eq!(state.status(), SessionStatus::Complete);
        assert!(state.final_block().is_none());
    }

    #[test]
    fn test_resubmit_resets_partial_and_error() {
        let (partial, _) = schemas();
        let mut state = SessionState::new();
        let ticket = state.begin().unwrap();
        state.apply(ticket, &json!({ "language": "ts", "code": "x" }), &partial);
        state.fail(ticket, SessionError::Transport("eof".to_string()));

        state.begin().unwrap();
        assert!(state.partial().is_empty());
        assert!(state.error().is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let mut state = SessionState::new();
        assert!(!state.cancel());
        assert_eq!(state.status(), SessionStatus::Idle);
    }
}
