//! Configuration for the generation client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/codecast/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod display;
mod observability;
mod serialization;
mod service;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use display::{ClipboardConfig, FileClipboard, FileRender, RenderConfig};
pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use service::{FileService, ServiceConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/codegen";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Generation service connection
    pub service: ServiceConfig,

    /// Code view settings
    pub render: RenderConfig,

    /// Copy action settings
    pub clipboard: ClipboardConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Demo mode: stream a scripted generation instead of calling the service
    pub demo_mode: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub endpoint: Option<String>,

    /// Optional [service] section
    pub service: Option<FileService>,

    /// Optional [render] section
    pub render: Option<FileRender>,

    /// Optional [clipboard] section
    pub clipboard: Option<FileClipboard>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/codecast/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("codecast").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }

        let template = Self::default().to_toml();
        if let Err(e) = std::fs::write(&path, template) {
            tracing::debug!("Could not write default config to {}: {}", path.display(), e);
        }
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be read or parsed is fatal: the
    /// process exits with a clear message instead of running on defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Invalid boolean values (use true/false)");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `codecast config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        Self::resolve(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        // Endpoint: env > file > default
        let endpoint = env("CODECAST_ENDPOINT")
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let service = ServiceConfig::from_file(endpoint, file.service, &env);

        // Syntax theme: env > file > default
        let mut render = RenderConfig::from_file(file.render);
        if let Some(theme) = env("CODECAST_THEME") {
            render.syntax_theme = theme;
        }

        let clipboard = ClipboardConfig::from_file(file.clipboard);
        let logging = LoggingConfig::from_file(file.logging);

        // Demo mode: env only (runtime flag)
        let demo_mode = env("CODECAST_DEMO")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            service,
            render,
            clipboard,
            logging,
            demo_mode,
        }
    }
}
