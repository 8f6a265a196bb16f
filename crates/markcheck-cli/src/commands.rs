//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use markcheck::DEFAULT_CONFIG_FILE;

/// Markcheck: verify markdown prices on the promotional catalog
#[derive(Parser, Debug)]
#[command(name = "markcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suite configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify workbook rows against the live catalog
    Run(RunArgs),

    /// Clear the note columns and price highlights of every data row
    Reset(ResetArgs),

    /// List the environments defined in the configuration
    Envs,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Environment to run against
    #[arg(short, long)]
    pub env: String,

    /// Workbook path (overrides the configuration)
    #[arg(short, long)]
    pub workbook: Option<PathBuf>,

    /// Rows to run: "all", a row number, or an inclusive range like "2-5"
    #[arg(short, long, default_value = "all")]
    pub rows: String,

    /// Clear previous results before running
    #[arg(long)]
    pub reset: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium binary (auto-detected when absent)
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Storefront user name
    #[arg(long, env = "MARKCHECK_USERNAME")]
    pub username: Option<String>,

    /// Storefront password
    #[arg(long, env = "MARKCHECK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Write the run report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the reset command
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Workbook path (overrides the configuration)
    #[arg(short, long)]
    pub workbook: Option<PathBuf>,
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect terminal support
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}
