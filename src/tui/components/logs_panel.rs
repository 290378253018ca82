//! Logs panel component
//!
//! Shows the newest entries of the shared `LogBuffer`, color-coded by level.
//! The buffer is owned by the logging layer; the panel only reads it.

use crate::logging::{LogBuffer, LogEntry, LogLevel};
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, buffer: &LogBuffer, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" Logs ({}) ", buffer.len()));

    if buffer.is_empty() {
        let empty = Paragraph::new("No log entries yet")
            .style(Style::default().fg(theme.muted))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let height = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = buffer
        .recent(height)
        .iter()
        .map(|entry| ListItem::new(format_log_entry(entry)).style(log_level_style(entry.level, theme)))
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "[{}] {:5} {}: {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        short_target(&entry.target),
        entry.message
    )
}

/// Last module path segment ("codecast::service::http" -> "http")
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn log_level_style(level: LogLevel, theme: &Theme) -> Style {
    match level {
        LogLevel::Error => Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        LogLevel::Warn => Style::default().fg(theme.warning),
        LogLevel::Info => Style::default().fg(theme.foreground),
        LogLevel::Debug | LogLevel::Trace => Style::default().fg(theme.muted),
    }
}
