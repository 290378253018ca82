// Title bar component
//
// App name, the service being talked to, and the prompt of the current or
// last generation.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let mut spans = vec![Span::styled(
        " ⧉ codecast",
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )];
    if let Some(prompt) = &app.last_prompt {
        let first_line = prompt.lines().next().unwrap_or_default();
        spans.push(Span::styled(" ──── ", Style::default().fg(theme.border)));
        spans.push(Span::styled(
            first_line.to_string(),
            Style::default().fg(theme.foreground),
        ));
    }

    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.title))
            .title_top(
                Line::from(Span::styled(
                    format!(" {} ", app.session.service_label()),
                    Style::default().fg(theme.muted),
                ))
                .right_aligned(),
            ),
    );

    f.render_widget(title, area);
}
