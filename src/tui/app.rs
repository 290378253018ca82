// TUI application state
//
// Owns the generation session and everything drawn around it: the prompt
// text and form, the renderer, the copy action, the code panel scroll, and
// toasts. The event loop in `tui::mod` feeds it keys, ticks, and session
// events; `tui::ui` draws it.

use super::clipboard::{ClipboardBackend, ClipboardCopier, CopyError};
use super::components::code_panel::{CodePanel, Placeholder};
use super::components::prompt_input::{FormStatus, PromptForm, Submission};
use super::components::toast::{Toast, ToastKind};
use super::theme::Theme;
use crate::events::SessionEvent;
use crate::logging::LogBuffer;
use crate::render::{CodeView, RenderOptions, StructuredRenderer};
use crate::session::{GenerationSession, Prompt, SessionStatus, SubmitOutcome, Transition};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Copy results reported by the copier's callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Copied,
    CopyFailed(CopyError),
}

pub struct App {
    /// Prompt text, owned here and edited by the form
    pub input: String,
    pub form: PromptForm,
    pub session: GenerationSession,
    renderer: StructuredRenderer,
    pub copier: ClipboardCopier,
    pub code_panel: CodePanel,
    pub render_options: RenderOptions,
    pub log_buffer: LogBuffer,
    pub show_logs: bool,
    pub should_quit: bool,
    pub theme: Theme,
    /// Prompt of the current or last generation
    pub last_prompt: Option<String>,
    toast: Option<Toast>,
    notices: mpsc::Receiver<Notice>,
    started_at: Option<Instant>,
    finished_in: Option<Duration>,
}

impl App {
    pub fn new(
        session: GenerationSession,
        renderer: StructuredRenderer,
        clipboard: Box<dyn ClipboardBackend>,
        copy_timeout: Duration,
        render_options: RenderOptions,
        log_buffer: LogBuffer,
    ) -> Self {
        let (notice_tx, notices) = mpsc::channel();
        let error_tx = notice_tx.clone();
        let copier = ClipboardCopier::new(clipboard, copy_timeout)
            .on_copy(move || {
                let _ = notice_tx.send(Notice::Copied);
            })
            .on_error(move |err| {
                let _ = error_tx.send(Notice::CopyFailed(err.clone()));
            });

        Self {
            input: String::new(),
            form: PromptForm::new(),
            session,
            renderer,
            copier,
            code_panel: CodePanel::new(),
            render_options,
            log_buffer,
            show_logs: false,
            should_quit: false,
            theme: Theme::default(),
            last_prompt: None,
            toast: None,
            notices,
            started_at: None,
            finished_in: None,
        }
    }

    /// Start a generation from a form submission
    pub fn submit(&mut self, submission: Submission) -> SubmitOutcome {
        let Submission(text) = submission;
        let Some(prompt) = Prompt::new(&text) else {
            return SubmitOutcome::Ignored;
        };

        let outcome = self.session.submit(prompt);
        if let SubmitOutcome::Started(_) = outcome {
            self.input.clear();
            self.last_prompt = Some(text);
            self.code_panel.reset();
            self.started_at = Some(Instant::now());
            self.finished_in = None;
        }
        self.sync_form();
        outcome
    }

    /// Apply one event from the stream task
    pub fn on_session_event(&mut self, event: SessionEvent) -> Transition {
        let transition = self.session.handle(event);
        match transition {
            Transition::Completed => {
                self.mark_finished();
                if self.session.final_block().is_none() {
                    self.show_toast("Generation ended without complete code", ToastKind::Error);
                }
            }
            Transition::Failed => {
                self.mark_finished();
                if let Some(err) = self.session.error() {
                    let message = format!("✗ {}", err);
                    self.show_toast(message, ToastKind::Error);
                }
            }
            Transition::Updated | Transition::Stale => {}
        }
        self.sync_form();
        transition
    }

    /// Stop the in-flight generation
    pub fn cancel(&mut self) {
        if self.session.cancel() {
            self.mark_finished();
            self.show_toast("Generation stopped", ToastKind::Info);
        }
        self.sync_form();
    }

    /// Copy the code currently on screen
    pub fn copy_code(&mut self) {
        // Rebind to the current payload; the last frame may predate it
        let _ = self.code_view();
        // Result is reported through the callbacks
        let _ = self.copier.copy_bound();
        self.drain_notices(Instant::now());
    }

    pub fn toggle_line_numbers(&mut self) {
        self.render_options.show_line_numbers = !self.render_options.show_line_numbers;
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }

    /// Periodic housekeeping: spinner, copy acknowledgement, toasts
    pub fn tick(&mut self, now: Instant) {
        if self.session.is_loading() {
            self.form.tick();
        }
        self.copier.tick(now);
        self.drain_notices(now);
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    /// Render the current partial result, binding the copy action to it
    pub fn code_view(&mut self) -> Option<CodeView> {
        self.renderer.render(
            self.session.partial(),
            self.render_options,
            &mut [&mut self.copier],
        )
    }

    /// What the code panel shows before there is a view
    pub fn placeholder(&self) -> Placeholder {
        match self.session.status() {
            SessionStatus::Idle => {
                Placeholder::Hint("Type a prompt and press Enter to generate code.".to_string())
            }
            SessionStatus::Streaming => Placeholder::Waiting,
            SessionStatus::Complete => Placeholder::Hint("No code was generated.".to_string()),
            SessionStatus::Errored => Placeholder::Failed(
                self.session
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Generation failed".to_string()),
            ),
        }
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast::new(message, kind, Instant::now()));
    }

    /// Time the current generation has been running, or took
    pub fn elapsed(&self) -> Option<Duration> {
        self.finished_in
            .or_else(|| self.started_at.map(|started| started.elapsed()))
    }

    fn mark_finished(&mut self) {
        if self.finished_in.is_none() {
            self.finished_in = self.started_at.map(|started| started.elapsed());
        }
    }

    fn sync_form(&mut self) {
        let status = if self.session.is_loading() {
            FormStatus::Streaming
        } else {
            FormStatus::Ready
        };
        self.form.set_status(status);
    }

    fn drain_notices(&mut self, now: Instant) {
        while let Ok(notice) = self.notices.try_recv() {
            let toast = match notice {
                Notice::Copied => Toast::new("✓ Copied to clipboard", ToastKind::Info, now),
                Notice::CopyFailed(err) => Toast::new(format!("✗ {}", err), ToastKind::Error, now),
            };
            self.toast = Some(toast);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{DEMO_PROMPT, TODO_LIST_TSX};
    use crate::render::{Highlighter, DEFAULT_SYNTAX_THEME};
    use crate::service::{ScriptStep, ScriptedService, TransportError};
    use crate::tui::clipboard::{MemoryClipboard, DEFAULT_COPY_TIMEOUT};
    use serde_json::json;
    use std::sync::Arc;

    fn app_with(service: ScriptedService, clipboard: MemoryClipboard) -> App {
        let session = GenerationSession::new(Arc::new(service)).unwrap();
        let renderer = StructuredRenderer::new(Highlighter::new(DEFAULT_SYNTAX_THEME));
        App::new(
            session,
            renderer,
            Box::new(clipboard),
            DEFAULT_COPY_TIMEOUT,
            RenderOptions::default(),
            LogBuffer::new(),
        )
    }

    #[tokio::test]
    async fn test_todo_list_scenario() {
        let code = "export default function TodoList() {\n  return <ul />;\n}\n";
        let service = ScriptedService::emitting([
            json!({ "language": "tsx" }),
            json!({ "language": "tsx", "code": code }),
        ]);
        let clipboard = MemoryClipboard::default();
        let contents = clipboard.contents.clone();
        let mut app = app_with(service, clipboard);

        app.input = DEMO_PROMPT.to_string();
        let submission = app.form.submit(&app.input).unwrap();
        assert!(matches!(app.submit(submission), SubmitOutcome::Started(_)));
        assert!(app.input.is_empty());
        assert_eq!(app.form.status(), FormStatus::Streaming);

        // Language alone renders nothing
        let event = app.session.recv().await.unwrap();
        assert_eq!(app.on_session_event(event), Transition::Updated);
        assert!(app.code_view().is_none());
        assert_eq!(app.placeholder(), Placeholder::Waiting);

        // Language and code render highlighted TSX
        let event = app.session.recv().await.unwrap();
        assert_eq!(app.on_session_event(event), Transition::Updated);
        let view = app.code_view().expect("code view");
        assert_eq!(view.language, "tsx");
        assert!(view.text().contains("export default function TodoList()"));
        assert!(view.lines[0].spans.iter().any(|s| s.style.fg.is_some()));

        // Close
        let event = app.session.recv().await.unwrap();
        assert_eq!(app.on_session_event(event), Transition::Completed);
        assert_eq!(app.session.status(), SessionStatus::Complete);
        assert!(!app.session.is_loading());
        assert_eq!(app.form.status(), FormStatus::Ready);

        // Copy yields the full code
        app.copy_code();
        assert_eq!(contents.borrow().as_deref(), Some(code));
        assert!(app.copier.just_copied());
        assert_eq!(app.toast().map(|t| t.kind), Some(ToastKind::Info));
    }

    #[tokio::test]
    async fn test_demo_script_completes_with_full_component() {
        let service = ScriptedService::new(crate::demo::todo_list_steps(Duration::ZERO));
        let mut app = app_with(service, MemoryClipboard::default());

        app.submit(Submission(DEMO_PROMPT.to_string()));
        while app.session.is_loading() {
            let event = app.session.recv().await.unwrap();
            app.on_session_event(event);
            // Every frame in between renders without panicking
            let _ = app.code_view();
        }

        let block = app.session.final_block().expect("final block");
        assert_eq!(block.code, TODO_LIST_TSX);
        assert_eq!(block.language, "tsx");
    }

    #[tokio::test]
    async fn test_copy_before_code_reports_error() {
        let mut app = app_with(ScriptedService::new(Vec::new()), MemoryClipboard::default());
        app.copy_code();
        assert!(!app.copier.just_copied());
        assert_eq!(app.toast().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[tokio::test]
    async fn test_copy_after_resubmit_does_not_reuse_old_code() {
        let service = ScriptedService::new(vec![
            ScriptStep::Emit(json!({ "language": "ts", "code": "OLD CODE" })),
            ScriptStep::Hang,
        ]);
        let clipboard = MemoryClipboard::default();
        let contents = clipboard.contents.clone();
        let mut app = app_with(service, clipboard);

        app.submit(Submission("one".to_string()));
        let event = app.session.recv().await.unwrap();
        app.on_session_event(event);
        assert!(app.code_view().is_some());

        app.cancel();
        assert!(matches!(
            app.submit(Submission("two".to_string())),
            SubmitOutcome::Started(_)
        ));
        assert!(app.code_view().is_none());

        app.copy_code();
        assert!(contents.borrow().is_none());
        assert!(!app.copier.just_copied());
        let toast = app.toast().expect("copy error toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.contains(&CopyError::NothingToCopy.to_string()));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_error() {
        let service = ScriptedService::new(vec![
            ScriptStep::Emit(json!({ "language": "ts", "code": "let a" })),
            ScriptStep::Fail(TransportError::Body("connection reset".to_string())),
        ]);
        let mut app = app_with(service, MemoryClipboard::default());

        app.submit(Submission("x".to_string()));
        let event = app.session.recv().await.unwrap();
        app.on_session_event(event);
        let event = app.session.recv().await.unwrap();
        assert_eq!(app.on_session_event(event), Transition::Failed);

        assert_eq!(app.form.status(), FormStatus::Ready);
        assert_eq!(app.toast().map(|t| t.kind), Some(ToastKind::Error));
        // Last partial stays on screen
        assert!(app.code_view().is_some());
    }

    #[tokio::test]
    async fn test_cancel_stops_streaming() {
        let service = ScriptedService::new(vec![
            ScriptStep::Emit(json!({ "language": "ts" })),
            ScriptStep::Hang,
        ]);
        let mut app = app_with(service, MemoryClipboard::default());

        app.submit(Submission("x".to_string()));
        let event = app.session.recv().await.unwrap();
        app.on_session_event(event);

        app.cancel();
        assert_eq!(app.session.status(), SessionStatus::Errored);
        assert_eq!(app.form.status(), FormStatus::Ready);
        assert!(matches!(app.placeholder(), Placeholder::Failed(_)));
    }

    #[tokio::test]
    async fn test_submit_while_streaming_keeps_input() {
        let service = ScriptedService::new(vec![ScriptStep::Hang]);
        let mut app = app_with(service, MemoryClipboard::default());

        app.submit(Submission("first".to_string()));
        app.input = "second".to_string();
        assert_eq!(app.submit(Submission("second".to_string())), SubmitOutcome::Ignored);
        assert_eq!(app.input, "second");
        assert_eq!(app.last_prompt.as_deref(), Some("first"));
    }
}
