// UI palette
//
// Chrome colors only. Code colors come from the syntect theme in
// `render::highlight`. ANSI colors, so the terminal's own palette applies.

use ratatui::style::Color;
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub background: Color,
    pub title: Color,
    pub border: Color,
    /// Border of the focused or active panel
    pub highlight: Color,
    pub status_bar: Color,
    pub muted: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border_type: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Color::Reset,
            background: Color::Reset,
            title: Color::Cyan,
            border: Color::DarkGray,
            highlight: Color::Magenta,
            status_bar: Color::Gray,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            border_type: BorderType::Rounded,
        }
    }
}
