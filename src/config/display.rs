//! Code view and copy action settings

use serde::Deserialize;

use crate::render::DEFAULT_SYNTAX_THEME;
use crate::tui::clipboard::DEFAULT_COPY_TIMEOUT;

/// Code view settings
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Draw a line-number gutter (toggle at runtime with Ctrl+L)
    pub show_line_numbers: bool,
    /// syntect theme name
    pub syntax_theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            syntax_theme: DEFAULT_SYNTAX_THEME.to_string(),
        }
    }
}

/// [render] section as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileRender {
    pub show_line_numbers: Option<bool>,
    pub syntax_theme: Option<String>,
}

impl RenderConfig {
    pub fn from_file(file: Option<FileRender>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            show_line_numbers: file.show_line_numbers.unwrap_or(defaults.show_line_numbers),
            syntax_theme: file.syntax_theme.unwrap_or(defaults.syntax_theme),
        }
    }
}

/// Copy action settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardConfig {
    /// How long the "copied" acknowledgement stays visible
    pub copy_timeout_ms: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            copy_timeout_ms: DEFAULT_COPY_TIMEOUT.as_millis() as u64,
        }
    }
}

/// [clipboard] section as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileClipboard {
    pub copy_timeout_ms: Option<u64>,
}

impl ClipboardConfig {
    pub fn from_file(file: Option<FileClipboard>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            copy_timeout_ms: file
                .copy_timeout_ms
                .unwrap_or(Self::default().copy_timeout_ms),
        }
    }

    pub fn copy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.copy_timeout_ms)
    }
}
