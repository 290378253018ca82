// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, session events)
// - Key dispatch to the app

pub mod app;
pub mod clipboard;
pub mod components;
pub mod scroll;
pub mod theme;
pub mod ui;

use crate::config::Config;
use crate::logging::LogBuffer;
use crate::render::{Highlighter, RenderOptions, StructuredRenderer};
use crate::service::GenerationService;
use crate::session::GenerationSession;
use anyhow::{Context, Result};
use app::App;
use clipboard::SystemClipboard;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Redraw and housekeeping interval
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Lines moved by the arrow keys in the code panel
const SCROLL_STEP: usize = 1;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// when done, whether or not the loop failed.
pub async fn run_tui(
    config: &Config,
    service: Arc<dyn GenerationService>,
    log_buffer: LogBuffer,
    initial_prompt: Option<String>,
) -> Result<()> {
    let session = GenerationSession::new(service)?;
    let highlighter = Highlighter::new(&config.render.syntax_theme);
    tracing::debug!("Highlighting with syntax theme '{}'", highlighter.theme_name());
    let renderer = StructuredRenderer::new(highlighter);
    let mut app = App::new(
        session,
        renderer,
        Box::new(SystemClipboard::new()),
        config.clipboard.copy_timeout(),
        RenderOptions {
            show_line_numbers: config.render.show_line_numbers,
        },
        log_buffer,
    );
    if let Some(prompt) = initial_prompt {
        app.input = prompt;
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources at once:
/// 1. Keyboard input
/// 2. Timer ticks (spinner, copy acknowledgement expiry, toasts)
/// 3. Session events from the stream task
///
/// The input future owns nothing of the app, so the session branch can
/// borrow it; handlers run after `select!` has released every branch.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            input = poll_input() => {
                if let Some(Event::Key(key_event)) = input {
                    handle_key_event(app, key_event);
                }
            }

            _ = tick_interval.tick() => {
                app.tick(Instant::now());
            }

            Some(event) = app.session.recv() => {
                app.on_session_event(event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Non-blocking check for terminal input
async fn poll_input() -> Option<Event> {
    if event::poll(Duration::from_millis(10)).unwrap_or(false) {
        event::read().ok()
    } else {
        tokio::task::yield_now().await;
        None
    }
}

/// Handle keyboard input
/// Global chords first, then code panel navigation, then the prompt form
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind == KeyEventKind::Release {
        return;
    }

    if handle_global_keys(app, &key_event) {
        return;
    }

    match key_event.code {
        KeyCode::Esc => {
            if app.session.is_loading() {
                app.cancel();
            }
        }
        KeyCode::PageUp => app.code_panel.page_up(),
        KeyCode::PageDown => app.code_panel.page_down(),
        KeyCode::Up => app.code_panel.scroll_up(SCROLL_STEP),
        KeyCode::Down => app.code_panel.scroll_down(SCROLL_STEP),
        KeyCode::Home if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.code_panel.scroll_to_top()
        }
        KeyCode::End if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.code_panel.scroll_to_bottom()
        }
        _ => {
            if let Some(submission) = app.form.handle_key(&mut app.input, key_event) {
                app.submit(submission);
            }
        }
    }
}

/// Handle global keys - returns true if handled
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    match key_event.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
            app.should_quit = true;
            true
        }
        KeyCode::Char('y') if ctrl => {
            app.copy_code();
            true
        }
        KeyCode::Char('l') if ctrl => {
            app.toggle_line_numbers();
            true
        }
        KeyCode::F(2) => {
            app.toggle_logs();
            true
        }
        _ => false,
    }
}
