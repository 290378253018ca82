//! Generation service contract
//!
//! A generation service takes a prompt and returns an ordered stream of
//! cumulative object snapshots. The stream ends cleanly when the service is
//! done, or yields one `TransportError` and ends. Dropping the stream closes
//! the underlying connection, which is how a consumer cancels early.
//!
//! Framing and wire format belong to the implementation:
//! - [`HttpGenerationService`]: POST + streamed JSON text body
//! - [`ScriptedService`]: fixed script, used for demo mode and tests

mod http;
pub mod partial_json;
mod scripted;

pub use http::HttpGenerationService;
pub use scripted::{ScriptStep, ScriptedService};

use crate::session::Prompt;
use futures::Stream;
use serde_json::Value;
use std::fmt;
use std::pin::Pin;

/// Ordered increments for one request
pub type IncrementStream = Pin<Box<dyn Stream<Item = Result<Value, TransportError>> + Send>>;

/// Something that can turn a prompt into a stream of partial objects
pub trait GenerationService: Send + Sync {
    /// Open one stream for `prompt`
    fn stream(&self, prompt: Prompt) -> IncrementStream;

    /// Short label for logs and the title bar
    fn describe(&self) -> String;
}

/// Abnormal termination of a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or the connection failed
    Request(String),
    /// The service answered with a non-success status
    Status { status: u16, body: String },
    /// The body stream broke off mid-response
    Body(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(msg) => write!(f, "request failed: {}", msg),
            TransportError::Status { status, body } if body.is_empty() => {
                write!(f, "service returned HTTP {}", status)
            }
            TransportError::Status { status, body } => {
                write!(f, "service returned HTTP {}: {}", status, body)
            }
            TransportError::Body(msg) => write!(f, "stream interrupted: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}
