// Events that flow from a stream task to the session owner
//
// The stream task never touches session state. It forwards what the service
// produced, tagged with the ticket of the stream it belongs to, and the owner
// (TUI loop or headless driver) applies events one at a time in arrival order.

use crate::service::TransportError;
use serde_json::Value;

/// Message sent by a stream task
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Ticket of the stream that produced this event
    pub ticket: u64,
    pub kind: StreamEvent,
}

/// What the stream produced
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A cumulative snapshot of the object so far (not yet validated)
    Increment(Value),
    /// The stream closed cleanly
    Finished,
    /// The stream terminated abnormally
    Failed(TransportError),
}

impl SessionEvent {
    pub fn new(ticket: u64, kind: StreamEvent) -> Self {
        Self { ticket, kind }
    }
}
