//! Code panel component
//!
//! Draws a rendered `CodeView`: language in the title, action glyphs on the
//! right of the title, highlighted lines below. Before the renderer has a
//! view (no code yet, or no language yet) the panel shows a status message
//! instead. Owns its scroll state; follows new lines while streaming.

use super::scrollbar::render_scrollbar;
use crate::render::CodeView;
use crate::tui::scroll::ScrollState;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// What to show when there is no code view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Nothing generated yet
    Hint(String),
    /// Streaming started, no renderable object yet
    Waiting,
    /// The generation failed before any code could be shown
    Failed(String),
}

#[derive(Debug, Default)]
pub struct CodePanel {
    scroll: ScrollState,
}

impl CodePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start following again (new generation)
    pub fn reset(&mut self) {
        self.scroll.reset();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll.scroll_down(lines);
    }

    pub fn page_up(&mut self) {
        self.scroll.page_up();
    }

    pub fn page_down(&mut self) {
        self.scroll.page_down();
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll.scroll_to_top();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll.scroll_to_bottom();
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        view: Option<&CodeView>,
        placeholder: &Placeholder,
        theme: &Theme,
        active: bool,
    ) {
        let border = if active { theme.highlight } else { theme.border };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border));

        let Some(view) = view else {
            let (text, style) = match placeholder {
                Placeholder::Hint(hint) => (hint.clone(), Style::default().fg(theme.muted)),
                Placeholder::Waiting => (
                    "Waiting for code…".to_string(),
                    Style::default().fg(theme.muted),
                ),
                Placeholder::Failed(reason) => (reason.clone(), Style::default().fg(theme.error)),
            };
            let paragraph = Paragraph::new(Span::styled(text, style)).block(block.title(" Code "));
            f.render_widget(paragraph, area);
            return;
        };

        let viewport = area.height.saturating_sub(2) as usize;
        self.scroll.update_dimensions(view.lines.len(), viewport);
        let (start, end) = self.scroll.visible_range();

        let title = Line::from(Span::styled(
            format!(" {} ", view.language),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ));
        let mut actions: Vec<Span<'static>> = Vec::with_capacity(view.actions.len() * 2 + 1);
        for glyph in &view.actions {
            actions.push(Span::raw(" "));
            actions.push(glyph.clone());
        }
        actions.push(Span::raw(" "));

        block = block
            .title(title)
            .title_top(Line::from(actions).right_aligned());
        if !self.scroll.auto_follow {
            block = block.title_bottom(
                Line::from(Span::styled(
                    format!(" {}-{}/{} ", start + 1, end, view.lines.len()),
                    Style::default().fg(theme.muted),
                ))
                .right_aligned(),
            );
        }

        let visible: Vec<Line<'static>> = view.lines[start..end].to_vec();
        f.render_widget(Paragraph::new(visible).block(block), area);
        render_scrollbar(f, area, &self.scroll);
    }
}
