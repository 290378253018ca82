//! Toast notification component
//!
//! A non-blocking overlay in the bottom-right corner that disappears after a
//! fixed time. Used for copy results and generation failures.

use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

const TOAST_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    expires_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind, now: Instant) -> Self {
        Self {
            message: message.into(),
            kind,
            expires_at: now + TOAST_DURATION,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let text_width = unicode_width::UnicodeWidthStr::width(self.message.as_str()) as u16;
        let width = (text_width + 4).min(area.width.saturating_sub(4));
        let height = 3;

        let x = area.right().saturating_sub(width + 2);
        let y = area.bottom().saturating_sub(height + 2);
        let toast_area = Rect::new(x, y, width, height).intersection(area);

        let accent = match self.kind {
            ToastKind::Info => theme.success,
            ToastKind::Error => theme.error,
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(theme.background));

        let text = Paragraph::new(self.message.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.foreground))
            .block(block);

        f.render_widget(Clear, toast_area);
        f.render_widget(text, toast_area);
    }
}
