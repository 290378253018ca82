// CLI module - command-line argument parsing and handlers
//
// With no subcommand the TUI starts, optionally with a prompt already typed.
// Subcommands:
// - generate: one generation without the TUI, code printed to stdout
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR
// - config --path: Show config file path

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::Command;

/// codecast - stream generated code from a structured-output service
#[derive(Parser, Debug)]
#[command(name = "codecast")]
#[command(version = VERSION)]
#[command(about = "Stream generated code into your terminal", long_about = None)]
pub struct Cli {
    /// Use the built-in scripted service instead of the network
    #[arg(long, global = true)]
    pub demo: bool,

    /// Prompt to pre-fill in the TUI
    pub prompt: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate once and print the code
    Generate {
        /// What to generate
        prompt: String,

        /// Copy the finished code to the clipboard
        #[arg(long)]
        copy: bool,

        /// Hide the line-number gutter
        #[arg(long)]
        no_line_numbers: bool,

        /// Print the code without colors or gutter
        #[arg(long)]
        plain: bool,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle the config subcommand. Returns true if it ran (exit after).
pub fn handle_config_command(cli: &Cli) -> bool {
    let Some(Commands::Config {
        show,
        reset,
        edit,
        path,
    }) = &cli.command
    else {
        return false;
    };

    if *path {
        handle_config_path();
    } else if *show {
        handle_config_show();
    } else if *reset {
        handle_config_reset();
    } else if *edit {
        handle_config_edit();
    } else {
        // No flag provided, show help
        println!("Usage: codecast config [--show|--reset|--edit|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --path    Show config file path");
    }
    true
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() && !confirm(&format!(
        "Config file exists at {}. Overwrite? [y/N] ",
        path.display()
    )) {
        println!("Aborted.");
        return;
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

/// Ask on stderr, read one line from stdin. Anything but "y" is a no.
fn confirm(question: &str) -> bool {
    eprint!("{}", question);
    if std::io::stderr().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    match std::io::stdin().read_line(&mut input) {
        Ok(_) => input.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_runs_tui() {
        let cli = Cli::try_parse_from(["codecast"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.prompt.is_none());
        assert!(!cli.demo);
    }

    #[test]
    fn test_tui_prompt_and_demo() {
        let cli = Cli::try_parse_from(["codecast", "--demo", "a todo list"]).unwrap();
        assert!(cli.demo);
        assert_eq!(cli.prompt.as_deref(), Some("a todo list"));
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "codecast",
            "generate",
            "fizzbuzz in rust",
            "--copy",
            "--no-line-numbers",
            "--demo",
        ])
        .unwrap();
        assert!(cli.demo);
        match cli.command {
            Some(Commands::Generate {
                prompt,
                copy,
                no_line_numbers,
                plain,
            }) => {
                assert_eq!(prompt, "fizzbuzz in rust");
                assert!(copy);
                assert!(no_line_numbers);
                assert!(!plain);
            }
            other => panic!("expected generate, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_requires_prompt() {
        assert!(Cli::try_parse_from(["codecast", "generate"]).is_err());
    }

    #[test]
    fn test_config_subcommand_is_handled_elsewhere() {
        let cli = Cli::try_parse_from(["codecast", "generate", "x"]).unwrap();
        assert!(!handle_config_command(&cli));
    }
}
