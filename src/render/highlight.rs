//! Language-aware highlighting backed by syntect
//!
//! Syntaxes and themes come from syntect's bundled defaults. Language
//! identifiers are matched by file extension or name, with a small alias
//! table for identifiers the bundled set doesn't know (`ts`, `tsx`, ...).
//! Anything unresolvable renders as plain text.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Theme used when the configured one doesn't exist
pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Spaces a tab expands to
const TAB_WIDTH: usize = 4;

/// Identifiers mapped onto the closest bundled grammar
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("ts", "js"),
    ("tsx", "js"),
    ("typescript", "js"),
    ("jsx", "js"),
    ("mjs", "js"),
    ("cjs", "js"),
    ("javascript", "js"),
    ("node", "js"),
    ("shell", "sh"),
    ("bash", "sh"),
    ("zsh", "sh"),
    ("console", "sh"),
    ("python", "py"),
    ("python3", "py"),
    ("rust", "rs"),
    ("golang", "go"),
    ("c++", "cpp"),
    ("csharp", "cs"),
    ("c#", "cs"),
    ("yml", "yaml"),
    ("markdown", "md"),
    ("ruby", "rb"),
    ("text", "txt"),
    ("plaintext", "txt"),
];

pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
    theme_name: String,
}

impl Highlighter {
    /// Load bundled syntaxes and the named theme (falls back to the default theme)
    pub fn new(theme_name: &str) -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults();

        let (theme_name, theme) = match themes.themes.remove(theme_name) {
            Some(theme) => (theme_name.to_string(), theme),
            None => {
                let known: Vec<&str> = themes.themes.keys().map(String::as_str).collect();
                tracing::warn!(
                    "Unknown syntax theme '{}', using '{}' (available: {})",
                    theme_name,
                    DEFAULT_SYNTAX_THEME,
                    known.join(", ")
                );
                let theme = themes
                    .themes
                    .remove(DEFAULT_SYNTAX_THEME)
                    .unwrap_or_default();
                (DEFAULT_SYNTAX_THEME.to_string(), theme)
            }
        };

        Self {
            syntaxes,
            theme,
            theme_name,
        }
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    /// Resolve a language identifier to a grammar
    pub fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let token = language.trim().to_lowercase();
        if token.is_empty() {
            return None;
        }
        let token = LANGUAGE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, target)| *target)
            .unwrap_or(token.as_str());

        self.syntaxes
            .find_syntax_by_token(token)
            .filter(|syntax| syntax.name != "Plain Text")
    }

    /// Highlight `code` as `language`. Never fails: unknown languages and
    /// highlighter errors produce undecorated lines.
    pub fn highlight(&self, code: &str, language: &str) -> Vec<Line<'static>> {
        let Some(syntax) = self.find_syntax(language) else {
            return plain_lines(code);
        };

        match self.highlight_with(code, syntax) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("Highlighting as {} failed: {}", syntax.name, e);
                plain_lines(code)
            }
        }
    }

    fn highlight_with(
        &self,
        code: &str,
        syntax: &SyntaxReference,
    ) -> Result<Vec<Line<'static>>, syntect::Error> {
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ranges = highlighter.highlight_line(line, &self.syntaxes)?;
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = expand_tabs(text.trim_end_matches(['\n', '\r']));
                    if text.is_empty() {
                        None
                    } else {
                        Some(Span::styled(text, to_ratatui_style(style)))
                    }
                })
                .collect();
            lines.push(Line::from(spans));
        }

        Ok(lines)
    }
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.lines().map(|line| Line::raw(expand_tabs(line))).collect()
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Foreground and font style only; the terminal keeps its own background
fn to_ratatui_style(style: SyntectStyle) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_aliases_resolve_to_bundled_grammars() {
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        assert!(hl.find_syntax("tsx").is_some());
        assert!(hl.find_syntax("TypeScript").is_some());
        assert!(hl.find_syntax("rust").is_some());
        assert!(hl.find_syntax("py").is_some());
        assert!(hl.find_syntax("no-such-language").is_none());
        assert!(hl.find_syntax("").is_none());
    }

    #[test]
    fn test_highlight_keeps_text() {
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = hl.highlight("fn main() {\n\tprintln!(\"hi\");\n}\n", "rust");
        assert_eq!(
            text_of(&lines),
            vec!["fn main() {", "    println!(\"hi\");", "}"]
        );
        // Highlighted output carries colors
        assert!(lines[0].spans.iter().any(|s| s.style.fg.is_some()));
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = hl.highlight("a b\nc", "klingon");
        assert_eq!(text_of(&lines), vec!["a b", "c"]);
        assert!(lines[0].spans.iter().all(|s| s.style.fg.is_none()));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let hl = Highlighter::new("does-not-exist");
        assert_eq!(hl.theme_name(), DEFAULT_SYNTAX_THEME);
    }
}
