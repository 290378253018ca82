// Structured renderer for streamed code blocks
//
// Turns a (possibly partial) `{code, language}` payload into a `CodeView`:
// highlighted lines, an optional line-number gutter, and the glyphs of the
// actions attached to the block. The TUI draws a `CodeView`; the renderer
// itself knows nothing about frames or layout.
//
// Actions are passed in explicitly. On every render each action is bound to
// the payload's current code before its glyph is taken, so an action never
// acts on text older than what is on screen.

pub mod highlight;

pub use highlight::{Highlighter, DEFAULT_SYNTAX_THEME};

use crate::session::PartialCodeBlock;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Something that can be attached to a rendered code block
pub trait CodeAction {
    /// Receive the code currently displayed
    fn bind(&mut self, code: &str);

    /// The block has no code to show; drop whatever was bound before
    fn unbind(&mut self);

    /// Glyph drawn in the block's action strip
    fn glyph(&self) -> Span<'static>;
}

/// Display options for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
        }
    }
}

/// Rendered code block, ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct CodeView {
    pub language: String,
    pub lines: Vec<Line<'static>>,
    pub actions: Vec<Span<'static>>,
}

impl CodeView {
    /// Displayed text without styling (gutter included)
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Highlighted lines for the last payload, reused while it is unchanged
struct Cached {
    language: String,
    code: String,
    lines: Vec<Line<'static>>,
}

pub struct StructuredRenderer {
    highlighter: Highlighter,
    cache: Option<Cached>,
}

impl StructuredRenderer {
    pub fn new(highlighter: Highlighter) -> Self {
        Self {
            highlighter,
            cache: None,
        }
    }

    /// Render a payload.
    ///
    /// Returns `None` until both `code` and `language` are present, so a
    /// half-arrived object never shows a broken code view.
    pub fn render(
        &mut self,
        payload: &PartialCodeBlock,
        options: RenderOptions,
        actions: &mut [&mut dyn CodeAction],
    ) -> Option<CodeView> {
        let (Some(code), Some(language)) = (&payload.code, &payload.language) else {
            for action in actions.iter_mut() {
                action.unbind();
            }
            return None;
        };

        for action in actions.iter_mut() {
            action.bind(code);
        }

        let highlighted = self.highlighted(code, language);
        let lines = if options.show_line_numbers {
            with_line_numbers(highlighted)
        } else {
            highlighted.to_vec()
        };

        Some(CodeView {
            language: language.clone(),
            lines,
            actions: actions.iter().map(|action| action.glyph()).collect(),
        })
    }

    fn highlighted(&mut self, code: &str, language: &str) -> &[Line<'static>] {
        let fresh = match &self.cache {
            Some(cached) => cached.code != code || cached.language != language,
            None => true,
        };
        if fresh {
            self.cache = Some(Cached {
                language: language.to_string(),
                code: code.to_string(),
                lines: self.highlighter.highlight(code, language),
            });
        }
        match &self.cache {
            Some(cached) => cached.lines.as_slice(),
            None => &[],
        }
    }
}

fn with_line_numbers(lines: &[Line<'static>]) -> Vec<Line<'static>> {
    let width = lines.len().max(1).to_string().len();
    let gutter = Style::default().fg(Color::DarkGray);

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(Span::styled(format!("{:>width$} │ ", i + 1), gutter));
            spans.extend(line.spans.iter().cloned());
            Line::from(spans)
        })
        .collect()
}
