// Status bar component
//
// Session status with elapsed time and code size on the left, key hints on
// the right. Narrow terminals get the short hint set.

use crate::session::SessionStatus;
use crate::tui::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Below this width only the essential hints are shown
const WIDE_HINTS_MIN_WIDTH: u16 = 100;

const HINTS: &str = "↵ submit │ Alt+↵ newline │ Esc stop │ ^Y copy │ ^L lines │ F2 logs │ ^C quit ";
const SHORT_HINTS: &str = "↵ │ Esc │ ^Y │ ^C ";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let status = app.session.status();

    let status_style = match status {
        SessionStatus::Idle => Style::default().fg(theme.muted),
        SessionStatus::Streaming => Style::default().fg(theme.warning),
        SessionStatus::Complete => Style::default().fg(theme.success),
        SessionStatus::Errored => Style::default().fg(theme.error),
    };

    let mut spans = vec![Span::styled(
        format!(" ● {}", status.as_str()),
        status_style.add_modifier(Modifier::BOLD),
    )];

    if let Some(elapsed) = app.elapsed() {
        spans.push(Span::raw(format!(" │ {:.1}s", elapsed.as_secs_f64())));
    }

    let code_len = app.session.partial().code_len();
    if code_len > 0 {
        spans.push(Span::raw(format!(" │ {} bytes", code_len)));
    }

    if let Some(err) = app.session.error() {
        spans.push(Span::styled(
            format!(" │ {}", err),
            Style::default().fg(theme.error),
        ));
    }

    let hints = if area.width >= WIDE_HINTS_MIN_WIDTH {
        HINTS
    } else {
        SHORT_HINTS
    };
    let hints_width = unicode_width::UnicodeWidthStr::width(hints) as u16;

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(hints_width)]).areas(inner);

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(theme.status_bar)),
        left,
    );
    f.render_widget(
        Paragraph::new(hints)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Right),
        right,
    );
}
