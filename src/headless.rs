// Headless mode - one generation without the TUI
//
// Drives the same session as the TUI from a plain loop: submit, apply events
// until the stream ends, then print the finished code to stdout. Logs go to
// stderr so the output can be piped. Ctrl+C stops the stream.

use crate::render::{CodeView, Highlighter, RenderOptions, StructuredRenderer};
use crate::service::GenerationService;
use crate::session::{
    GenerationSession, PartialCodeBlock, Prompt, SessionStatus, SubmitOutcome, Transition,
};
use crate::tui::clipboard::{ClipboardCopier, SystemClipboard};
use anyhow::{bail, Context, Result};
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor,
};
use crossterm::QueueableCommand;
use ratatui::style::{Color, Modifier};
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

/// How the finished code is printed
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub copy: bool,
    /// Print the code as-is, no colors or gutter
    pub plain: bool,
    pub show_line_numbers: bool,
    pub syntax_theme: String,
    pub copy_timeout: Duration,
}

/// Run one generation to completion and print the result
pub async fn generate(
    service: Arc<dyn GenerationService>,
    prompt: &str,
    options: GenerateOptions,
) -> Result<()> {
    let prompt = Prompt::new(prompt).context("Prompt is empty")?;
    let mut session = GenerationSession::new(service)?;

    if session.submit(prompt) == SubmitOutcome::Ignored {
        bail!("A generation is already running");
    }

    let mut cancelled = false;
    while session.is_loading() {
        tokio::select! {
            Some(event) = session.recv() => {
                if session.handle(event) == Transition::Updated {
                    tracing::debug!("Received {} bytes of code", session.partial().code_len());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                cancelled = session.cancel();
            }
        }
    }

    if cancelled {
        bail!("Generation stopped");
    }

    match session.status() {
        SessionStatus::Complete => {}
        _ => {
            let reason = session
                .error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Generation failed".to_string());
            bail!(reason);
        }
    }

    let Some(block) = session.final_block().cloned() else {
        bail!("Generation finished without both code and language");
    };

    let pretty = !options.plain && std::io::stdout().is_terminal();
    if pretty {
        let mut renderer = StructuredRenderer::new(Highlighter::new(&options.syntax_theme));
        let payload = PartialCodeBlock::from(block.clone());
        let view = renderer.render(
            &payload,
            RenderOptions {
                show_line_numbers: options.show_line_numbers,
            },
            &mut [],
        );
        match view {
            Some(view) => print_view(&view)?,
            None => print!("{}", block.code),
        }
    } else {
        print!("{}", block.code);
        if !block.code.ends_with('\n') {
            println!();
        }
    }
    std::io::stdout().flush().context("Failed to write output")?;

    if options.copy {
        let mut copier =
            ClipboardCopier::new(Box::new(SystemClipboard::new()), options.copy_timeout)
                .on_copy(|| eprintln!("✓ Copied to clipboard"))
                .on_error(|err| eprintln!("✗ {}", err));
        // Failures are reported by the callback; the code is already on stdout
        let _ = copier.copy(Some(&block.code));
    }

    Ok(())
}

/// Write highlighted lines with ANSI colors
fn print_view(view: &CodeView) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.queue(SetAttribute(Attribute::Dim))?
        .queue(Print(format!("── {} ──\n", view.language)))?
        .queue(SetAttribute(Attribute::Reset))?;

    for line in &view.lines {
        for span in &line.spans {
            if let Some(color) = span.style.fg.and_then(term_color) {
                out.queue(SetForegroundColor(color))?;
            }
            if span.style.add_modifier.contains(Modifier::BOLD) {
                out.queue(SetAttribute(Attribute::Bold))?;
            }
            if span.style.add_modifier.contains(Modifier::ITALIC) {
                out.queue(SetAttribute(Attribute::Italic))?;
            }
            out.queue(Print(span.content.as_ref()))?
                .queue(SetAttribute(Attribute::Reset))?
                .queue(ResetColor)?;
        }
        out.queue(Print("\n"))?;
    }
    out.flush()?;
    Ok(())
}

fn term_color(color: Color) -> Option<TermColor> {
    let mapped = match color {
        Color::Reset => return None,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
    };
    Some(mapped)
}
