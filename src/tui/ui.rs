// UI rendering - called on every frame
//
// Layout, top to bottom: title bar, code panel (fills the rest), optional
// logs panel, prompt input (grows with the prompt), status bar. Toasts are
// drawn last, over everything.

use super::app::App;
use super::components::{logs_panel, status_bar, title_bar};
use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

/// Prompt box height bounds, borders included
const PROMPT_MIN_HEIGHT: u16 = 3;
const PROMPT_MAX_HEIGHT: u16 = 8;
const LOGS_HEIGHT: u16 = 8;

pub fn draw(f: &mut Frame, app: &mut App) {
    let prompt_lines = app.input.split('\n').count() as u16;
    let prompt_height = (prompt_lines + 2).clamp(PROMPT_MIN_HEIGHT, PROMPT_MAX_HEIGHT);
    let logs_height = if app.show_logs { LOGS_HEIGHT } else { 0 };

    let [title_area, code_area, logs_area, prompt_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(logs_height),
        Constraint::Length(prompt_height),
        Constraint::Length(2),
    ])
    .areas(f.area());

    title_bar::render(f, title_area, app);

    let view = app.code_view();
    let placeholder = app.placeholder();
    let streaming = app.session.is_loading();
    app.code_panel
        .render(f, code_area, view.as_ref(), &placeholder, &app.theme, streaming);

    if app.show_logs {
        logs_panel::render(f, logs_area, &app.log_buffer, &app.theme);
    }

    app.form
        .render(f, prompt_area, &app.input, &app.theme, !streaming);

    status_bar::render(f, status_area, app);

    if let Some(toast) = app.toast() {
        toast.render(f, f.area(), &app.theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogBuffer;
    use crate::render::{Highlighter, RenderOptions, StructuredRenderer, DEFAULT_SYNTAX_THEME};
    use crate::service::ScriptedService;
    use crate::session::GenerationSession;
    use crate::tui::clipboard::{MemoryClipboard, DEFAULT_COPY_TIMEOUT};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_draws_idle_screen() {
        let session =
            GenerationSession::new(Arc::new(ScriptedService::new(Vec::new()).with_label("demo")))
                .unwrap();
        let mut app = App::new(
            session,
            StructuredRenderer::new(Highlighter::new(DEFAULT_SYNTAX_THEME)),
            Box::new(MemoryClipboard::default()),
            DEFAULT_COPY_TIMEOUT,
            RenderOptions::default(),
            LogBuffer::new(),
        );
        app.show_logs = true;

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = (0..buffer.area.height)
            .flat_map(|y| (0..buffer.area.width).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol().to_string())
            .collect();

        assert!(screen.contains("codecast"));
        assert!(screen.contains("demo"));
        assert!(screen.contains("Type a prompt"));
        assert!(screen.contains("Logs"));
        assert!(screen.contains("idle"));
    }
}
