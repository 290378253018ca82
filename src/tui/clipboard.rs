//! Clipboard copy action with timed acknowledgement
//!
//! `ClipboardCopier` performs one side effect, writing text to the system
//! clipboard, and reports the outcome through optional callbacks. After a
//! successful copy it shows an acknowledgement glyph until a single expiry
//! deadline passes; copying again moves the deadline instead of adding a
//! second one.
//!
//! The system clipboard is reached through `arboard`. It is opened once and
//! kept, so on X11 the copied text stays available while the app runs.

use crate::render::CodeAction;
use anyhow::{Context, Result};
use arboard::Clipboard;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use std::fmt;
use std::time::{Duration, Instant};

/// Default acknowledgement duration
pub const DEFAULT_COPY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Glyph while idle
const COPY_GLYPH: &str = "⧉ copy";
/// Glyph after a successful copy
const COPIED_GLYPH: &str = "✓ copied";

/// Something text can be written to
pub trait ClipboardBackend {
    /// Whether the clipboard can be used at all
    fn is_available(&self) -> bool;

    /// Write `text`, replacing the clipboard contents
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard (Windows, macOS, X11/Wayland)
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    /// Open the system clipboard. A missing display server leaves it unavailable.
    pub fn new() -> Self {
        let inner = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {}", e);
                None
            }
        };
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardBackend for SystemClipboard {
    fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let clipboard = self
            .inner
            .as_mut()
            .context("Failed to access clipboard")?;
        clipboard
            .set_text(text)
            .context("Failed to set clipboard text")?;
        Ok(())
    }
}

/// Why a copy did not happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    /// No clipboard capability in this environment
    Unavailable,
    /// There is no text to copy
    NothingToCopy,
    /// The clipboard rejected the write
    WriteFailed(String),
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyError::Unavailable => write!(f, "Clipboard is not available"),
            CopyError::NothingToCopy => write!(f, "No code to copy"),
            CopyError::WriteFailed(msg) => write!(f, "Copy failed: {}", msg),
        }
    }
}

impl std::error::Error for CopyError {}

type CopyCallback = Box<dyn FnMut()>;
type ErrorCallback = Box<dyn FnMut(&CopyError)>;

/// Copy action for a code block
pub struct ClipboardCopier {
    backend: Box<dyn ClipboardBackend>,
    timeout: Duration,
    just_copied: bool,
    /// The single pending expiry, if any
    expires_at: Option<Instant>,
    /// Text most recently bound by the renderer
    target: Option<String>,
    on_copy: Option<CopyCallback>,
    on_error: Option<ErrorCallback>,
}

impl ClipboardCopier {
    pub fn new(backend: Box<dyn ClipboardBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            just_copied: false,
            expires_at: None,
            target: None,
            on_copy: None,
            on_error: None,
        }
    }

    /// Called after every successful copy
    pub fn on_copy(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_copy = Some(Box::new(callback));
        self
    }

    /// Called with the reason whenever a copy does not happen
    pub fn on_error(mut self, callback: impl FnMut(&CopyError) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn just_copied(&self) -> bool {
        self.just_copied
    }

    pub fn pending_expiry(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Copy `text` now
    pub fn copy(&mut self, text: Option<&str>) -> Result<(), CopyError> {
        self.copy_at(text, Instant::now())
    }

    /// Copy the text last bound by the renderer
    pub fn copy_bound(&mut self) -> Result<(), CopyError> {
        let target = self.target.clone();
        self.copy(target.as_deref())
    }

    /// Copy `text`, treating `now` as the current time
    pub fn copy_at(&mut self, text: Option<&str>, now: Instant) -> Result<(), CopyError> {
        let result = self.write(text);

        match &result {
            Ok(()) => {
                self.just_copied = true;
                // Replaces any earlier deadline
                self.expires_at = Some(deadline_after(now, self.timeout));
                if let Some(callback) = self.on_copy.as_mut() {
                    callback();
                }
            }
            Err(err) => {
                tracing::debug!("Copy not performed: {}", err);
                if let Some(callback) = self.on_error.as_mut() {
                    callback(err);
                }
            }
        }

        result
    }

    fn write(&mut self, text: Option<&str>) -> Result<(), CopyError> {
        if !self.backend.is_available() {
            return Err(CopyError::Unavailable);
        }
        let text = match text {
            Some(text) if !text.is_empty() => text,
            _ => return Err(CopyError::NothingToCopy),
        };
        self.backend
            .write_text(text)
            .map_err(|e| CopyError::WriteFailed(format!("{:#}", e)))
    }

    /// Expire the acknowledgement if its deadline has passed. Returns true on change.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.expires_at = None;
                self.just_copied = false;
                true
            }
            _ => false,
        }
    }
}

impl CodeAction for ClipboardCopier {
    fn bind(&mut self, code: &str) {
        if self.target.as_deref() != Some(code) {
            self.target = Some(code.to_string());
        }
    }

    fn unbind(&mut self) {
        self.target = None;
    }

    fn glyph(&self) -> Span<'static> {
        if self.just_copied {
            Span::styled(COPIED_GLYPH, Style::default().fg(Color::Green))
        } else {
            Span::raw(COPY_GLYPH)
        }
    }
}

/// `now + timeout`, saturating at roughly a century out
fn deadline_after(now: Instant, timeout: Duration) -> Instant {
    const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// In-memory clipboard for tests
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    pub unavailable: bool,
    pub reject: bool,
    pub contents: std::rc::Rc<std::cell::RefCell<Option<String>>>,
}

#[cfg(test)]
impl ClipboardBackend for MemoryClipboard {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.reject {
            anyhow::bail!("permission denied");
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Copier over a memory clipboard, with callback counters
    fn copier(
        backend: MemoryClipboard,
    ) -> (ClipboardCopier, Rc<RefCell<u32>>, Rc<RefCell<Vec<CopyError>>>) {
        let successes = Rc::new(RefCell::new(0));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let s = successes.clone();
        let e = errors.clone();
        let copier = ClipboardCopier::new(Box::new(backend), DEFAULT_COPY_TIMEOUT)
            .on_copy(move || *s.borrow_mut() += 1)
            .on_error(move |err| e.borrow_mut().push(err.clone()));
        (copier, successes, errors)
    }

    #[test]
    fn test_copy_none_reports_error_only() {
        let (mut copier, successes, errors) = copier(MemoryClipboard::default());

        assert_eq!(copier.copy(None), Err(CopyError::NothingToCopy));
        assert_eq!(copier.copy(Some("")), Err(CopyError::NothingToCopy));

        assert_eq!(*successes.borrow(), 0);
        assert_eq!(errors.borrow().len(), 2);
        assert!(!copier.just_copied());
        assert!(copier.pending_expiry().is_none());
    }

    #[test]
    fn test_unavailable_clipboard_reports_error() {
        let backend = MemoryClipboard {
            unavailable: true,
            ..Default::default()
        };
        let contents = backend.contents.clone();
        let (mut copier, successes, errors) = copier(backend);

        assert_eq!(copier.copy(Some("hello")), Err(CopyError::Unavailable));
        assert_eq!(*successes.borrow(), 0);
        assert_eq!(*errors.borrow(), vec![CopyError::Unavailable]);
        assert!(contents.borrow().is_none());
    }

    #[test]
    fn test_rejected_write_keeps_state() {
        let backend = MemoryClipboard {
            reject: true,
            ..Default::default()
        };
        let (mut copier, successes, errors) = copier(backend);

        let err = copier.copy(Some("hello")).unwrap_err();
        assert!(matches!(err, CopyError::WriteFailed(ref msg) if msg.contains("permission denied")));
        assert_eq!(*successes.borrow(), 0);
        assert_eq!(errors.borrow().len(), 1);
        assert!(!copier.just_copied());
    }

    #[test]
    fn test_successful_copy_sets_and_expires_acknowledgement() {
        let backend = MemoryClipboard::default();
        let contents = backend.contents.clone();
        let (mut copier, successes, _) = copier(backend);
        let t0 = Instant::now();

        copier.copy_at(Some("hello"), t0).unwrap();
        assert!(copier.just_copied());
        assert_eq!(*successes.borrow(), 1);
        assert_eq!(contents.borrow().as_deref(), Some("hello"));
        assert_eq!(copier.glyph().content, COPIED_GLYPH);

        assert!(!copier.tick(t0 + Duration::from_millis(1999)));
        assert!(copier.just_copied());
        assert!(copier.tick(t0 + Duration::from_millis(2000)));
        assert!(!copier.just_copied());
        assert_eq!(copier.glyph().content, COPY_GLYPH);
    }

    #[test]
    fn test_second_copy_restarts_single_expiry() {
        let (mut copier, successes, _) = copier(MemoryClipboard::default());
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(500);

        copier.copy_at(Some("hello"), t0).unwrap();
        copier.copy_at(Some("world"), t1).unwrap();

        assert_eq!(*successes.borrow(), 2);
        assert_eq!(copier.pending_expiry(), Some(t1 + DEFAULT_COPY_TIMEOUT));

        // The first copy's deadline passes without clearing the acknowledgement
        assert!(!copier.tick(t0 + DEFAULT_COPY_TIMEOUT));
        assert!(copier.just_copied());

        assert!(copier.tick(t1 + DEFAULT_COPY_TIMEOUT));
        assert!(!copier.just_copied());
        assert!(copier.pending_expiry().is_none());
    }

    #[test]
    fn test_copy_bound_uses_latest_binding() {
        let backend = MemoryClipboard::default();
        let contents = backend.contents.clone();
        let (mut copier, _, errors) = copier(backend);

        assert_eq!(copier.copy_bound(), Err(CopyError::NothingToCopy));
        assert_eq!(errors.borrow().len(), 1);

        copier.bind("export default");
        copier.bind("export default function App() {}");
        copier.copy_bound().unwrap();
        assert_eq!(
            contents.borrow().as_deref(),
            Some("export default function App() {}")
        );
    }

    #[test]
    fn test_custom_timeout() {
        let mut copier = ClipboardCopier::new(
            Box::new(MemoryClipboard::default()),
            Duration::from_millis(100),
        );
        let t0 = Instant::now();
        copier.copy_at(Some("x"), t0).unwrap();
        assert!(copier.tick(t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_huge_timeout_does_not_overflow() {
        let mut copier =
            ClipboardCopier::new(Box::new(MemoryClipboard::default()), Duration::MAX);
        let t0 = Instant::now();
        copier.copy_at(Some("x"), t0).unwrap();
        assert!(copier.just_copied());
        assert!(copier.pending_expiry().is_some_and(|deadline| deadline >= t0));
        assert!(!copier.tick(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn test_unbind_clears_copy_target() {
        let backend = MemoryClipboard::default();
        let contents = backend.contents.clone();
        let (mut copier, _, errors) = copier(backend);

        copier.bind("old code");
        copier.unbind();
        assert_eq!(copier.copy_bound(), Err(CopyError::NothingToCopy));
        assert_eq!(errors.borrow().len(), 1);
        assert!(contents.borrow().is_none());
    }
}
