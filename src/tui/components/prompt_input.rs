//! Prompt input component
//!
//! A controlled text input: the caller owns the `String` and the form edits
//! it in place. Enter submits the trimmed text; Alt+Enter (or Shift+Enter on
//! terminals that report it) inserts a newline. While the session streams,
//! submitting is disabled and a spinner replaces the submit glyph.

use crate::tui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SUBMIT_GLYPH: &str = "↵";
const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
const PLACEHOLDER: &str = "Describe the code to generate…";

/// Whether the form can submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Ready,
    Streaming,
}

/// One submit action's payload: the trimmed input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission(pub String);

#[derive(Debug, Default)]
pub struct PromptForm {
    status: FormStatus,
    animation_frame: usize,
}

impl PromptForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Driven by the session's loading flag
    pub fn set_status(&mut self, status: FormStatus) {
        self.status = status;
    }

    /// Advance the spinner
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// Submit glyph, or the spinner while streaming
    pub fn glyph(&self) -> String {
        match self.status {
            FormStatus::Ready => SUBMIT_GLYPH.to_string(),
            FormStatus::Streaming => SPINNER[self.animation_frame % SPINNER.len()].to_string(),
        }
    }

    /// Apply a key to `input`. Returns a submission at most once per submit key.
    pub fn handle_key(&mut self, input: &mut String, key: KeyEvent) -> Option<Submission> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Enter
                if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
            {
                input.push('\n');
                None
            }
            KeyCode::Enter => self.submit(input),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.clear();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.push(c);
                None
            }
            KeyCode::Backspace => {
                input.pop();
                None
            }
            _ => None,
        }
    }

    /// Submit the trimmed input, if allowed and non-empty
    pub fn submit(&mut self, input: &str) -> Option<Submission> {
        if self.status == FormStatus::Streaming {
            return None;
        }
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        Some(Submission(text.to_string()))
    }

    pub fn render(&self, f: &mut Frame, area: Rect, input: &str, theme: &Theme, focused: bool) {
        let border = if focused { theme.highlight } else { theme.border };
        let glyph_style = match self.status {
            FormStatus::Ready => Style::default().fg(theme.success),
            FormStatus::Streaming => Style::default().fg(theme.warning),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border))
            .title(" Prompt ")
            .title_bottom(
                Line::from(vec![
                    Span::raw(" "),
                    Span::styled(self.glyph(), glyph_style.add_modifier(Modifier::BOLD)),
                    Span::raw(" "),
                ])
                .right_aligned(),
            );

        let paragraph = if input.is_empty() {
            Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(theme.muted)))
        } else {
            Paragraph::new(input.to_string()).style(Style::default().fg(theme.foreground))
        };

        f.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);

        if focused {
            let (x, y) = cursor_position(input, area);
            f.set_cursor_position(Position::new(x, y));
        }
    }
}

/// Cursor after the last character, assuming no soft wraps
fn cursor_position(input: &str, area: Rect) -> (u16, u16) {
    let last_line = input.rsplit('\n').next().unwrap_or("");
    let rows = input.matches('\n').count() as u16;
    let col = unicode_width::UnicodeWidthStr::width(last_line) as u16;

    let max_x = area.right().saturating_sub(2);
    let max_y = area.bottom().saturating_sub(2);
    (
        (area.x + 1 + col).min(max_x),
        (area.y + 1 + rows).min(max_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut PromptForm, input: &mut String, text: &str) {
        for c in text.chars() {
            assert!(form.handle_key(input, key(KeyCode::Char(c))).is_none());
        }
    }

    #[test]
    fn test_enter_emits_trimmed_text_once() {
        let mut form = PromptForm::new();
        let mut input = String::new();
        type_text(&mut form, &mut input, "  build a todo list ");

        let submission = form.handle_key(&mut input, key(KeyCode::Enter));
        assert_eq!(submission, Some(Submission("build a todo list".to_string())));
        // Controlled: the caller decides when to clear
        assert_eq!(input, "  build a todo list ");
    }

    #[test]
    fn test_blank_input_emits_nothing() {
        let mut form = PromptForm::new();
        let mut input = "   \n ".to_string();
        assert!(form.handle_key(&mut input, key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn test_alt_enter_inserts_newline() {
        let mut form = PromptForm::new();
        let mut input = "a".to_string();
        let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert!(form.handle_key(&mut input, alt_enter).is_none());
        assert_eq!(input, "a\n");
    }

    #[test]
    fn test_streaming_disables_submit() {
        let mut form = PromptForm::new();
        let mut input = "hello".to_string();
        form.set_status(FormStatus::Streaming);
        assert!(form.handle_key(&mut input, key(KeyCode::Enter)).is_none());
        assert_ne!(form.glyph(), SUBMIT_GLYPH);

        form.set_status(FormStatus::Ready);
        assert!(form.handle_key(&mut input, key(KeyCode::Enter)).is_some());
        assert_eq!(form.glyph(), SUBMIT_GLYPH);
    }

    #[test]
    fn test_spinner_advances() {
        let mut form = PromptForm::new();
        form.set_status(FormStatus::Streaming);
        let first = form.glyph();
        form.tick();
        assert_ne!(form.glyph(), first);
    }

    #[test]
    fn test_editing_keys() {
        let mut form = PromptForm::new();
        let mut input = "abc".to_string();
        form.handle_key(&mut input, key(KeyCode::Backspace));
        assert_eq!(input, "ab");

        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        form.handle_key(&mut input, ctrl_u);
        assert!(input.is_empty());

        // Other control chords are not text
        let ctrl_y = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL);
        form.handle_key(&mut input, ctrl_y);
        assert!(input.is_empty());
    }

    #[test]
    fn test_render_shows_text_and_glyph() {
        let form = PromptForm::new();
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();

        terminal
            .draw(|f| form.render(f, f.area(), "make a counter", &theme, true))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect();

        assert!(rows[0].contains("Prompt"));
        assert!(rows[1].contains("make a counter"));
        assert!(rows[3].contains(SUBMIT_GLYPH));
    }
}
