// Scripted generation service
//
// Plays back a fixed list of steps for every request. Demo mode uses it to
// stream a canned code block; tests use it to drive the session through
// exact increment sequences, failures, and streams that never finish.

use super::{GenerationService, IncrementStream, TransportError};
use crate::session::Prompt;
use futures::stream;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One step of a script
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Yield this value as the next increment
    Emit(Value),
    /// Wait before the next step
    Delay(Duration),
    /// Fail the stream with a transport error
    Fail(TransportError),
    /// Never make progress again (stream stays open until dropped)
    Hang,
}

/// Generation service that replays a script
#[derive(Debug, Clone)]
pub struct ScriptedService {
    steps: Vec<ScriptStep>,
    label: String,
    opened: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedService {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            label: "scripted".to_string(),
            opened: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script that emits each value in order, then closes
    pub fn emitting(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(values.into_iter().map(ScriptStep::Emit).collect())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Number of streams opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Prompts received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl GenerationService for ScriptedService {
    fn stream(&self, prompt: Prompt) -> IncrementStream {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.into_inner());
        }

        let steps: VecDeque<ScriptStep> = self.steps.iter().cloned().collect();

        let increments = stream::unfold(steps, |mut steps| async move {
            loop {
                match steps.pop_front()? {
                    ScriptStep::Emit(value) => return Some((Ok(value), steps)),
                    ScriptStep::Delay(delay) => tokio::time::sleep(delay).await,
                    ScriptStep::Fail(err) => return Some((Err(err), VecDeque::new())),
                    ScriptStep::Hang => std::future::pending::<()>().await,
                }
            }
        });

        Box::pin(increments)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_replays_script_per_stream() {
        let service = ScriptedService::new(vec![
            ScriptStep::Emit(json!({ "language": "ts" })),
            ScriptStep::Delay(Duration::from_millis(1)),
            ScriptStep::Emit(json!({ "language": "ts", "code": "x" })),
        ]);

        for _ in 0..2 {
            let values: Vec<_> = service
                .stream(Prompt::new("p").unwrap())
                .collect::<Vec<_>>()
                .await;
            assert_eq!(values.len(), 2);
            assert_eq!(values[1], Ok(json!({ "language": "ts", "code": "x" })));
        }
        assert_eq!(service.opened(), 2);
        assert_eq!(service.prompts(), vec!["p".to_string(), "p".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_ends_stream() {
        let service = ScriptedService::new(vec![
            ScriptStep::Fail(TransportError::Body("reset".to_string())),
            ScriptStep::Emit(json!({})),
        ]);

        let values: Vec<_> = service
            .stream(Prompt::new("p").unwrap())
            .collect::<Vec<_>>()
            .await;
        assert_eq!(values, vec![Err(TransportError::Body("reset".to_string()))]);
    }
}
