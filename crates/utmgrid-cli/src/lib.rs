//! Shared CLI definitions for utmgrid.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// Log verbosity for the file logger
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Command-line arguments for utmgrid
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "utmgrid",
    version,
    about = "Spreadsheet-style UTM link builder for the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Directory holding the persisted rows and saved links (default: platform data dir)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Number of undo steps to keep (default: 50)
    #[arg(long = "history-limit", value_name = "N")]
    pub history_limit: Option<usize>,

    /// Quiet period in milliseconds before edited rows are written to disk (default: 500)
    #[arg(long = "autosave-ms", value_name = "MS")]
    pub autosave_ms: Option<u64>,

    /// Number of empty rows to start with when nothing has been saved yet (default: 3)
    #[arg(long = "default-rows", value_name = "N")]
    pub default_rows: Option<usize>,

    /// Display row numbers on the left side of the grid
    #[arg(long = "row-numbers", action)]
    pub row_numbers: bool,

    /// Log level for the log file (overrides config and RUST_LOG)
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Discard the persisted grid rows and exit
    #[arg(long = "reset-rows", action)]
    pub reset_rows: bool,

    /// Remove all saved links and exit
    #[arg(long = "clear-saved", action)]
    pub clear_saved: bool,

    /// Generate default configuration file at ~/.config/utmgrid/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
