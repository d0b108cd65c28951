//! CLI argument definitions using clap
//!
//! This module defines all command-line arguments for apigee-variabilizer.

use clap::{Parser, ValueEnum, ArgAction};
use std::path::PathBuf;

/// apigee-variabilizer - Turn per-environment backend URLs into KVM-backed templates
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "apigee-variabilizer", version, about, long_about = None)]
pub struct Args {
    // =========================================================================
    // INPUTS
    // =========================================================================

    /// OpenAPI 3.x or Swagger 2.0 documents (JSON or YAML), one group each
    #[arg(value_name = "SPEC")]
    pub specs: Vec<PathBuf>,

    /// Ad hoc backend server as URL or ENV=URL; all --server values form one group
    #[arg(long = "server", value_name = "[ENV=]URL", action = ArgAction::Append)]
    pub servers: Vec<String>,

    // =========================================================================
    // VARIABILIZATION
    // =========================================================================

    /// First KVM entry index (defaults to the config value, then 1)
    #[arg(short = 's', long = "start-index", value_name = "N",
          value_parser = clap::value_parser!(u32).range(1..))]
    pub start_index: Option<u32>,

    /// Explicit config file instead of the default location
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Output format
    #[arg(short = 'f', long = "format", value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only list servers and their detected environments
    #[arg(long = "list", action = ArgAction::SetTrue)]
    pub list: bool,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Verbose logging. Use -vv for debug logs
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format for logs: json (JSON Lines) or text (default)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Debug mode: dump parsed arguments and show full errors
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Generate shell completions for the specified shell
    #[arg(long = "generate-completions", value_name = "SHELL", value_enum, hide = true)]
    pub generate_completions: Option<Shell>,
}

/// Report format
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// YAML
    Yaml,
    /// Human-readable summary
    Summary,
}

/// Log format for structured output (CI/CD)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
