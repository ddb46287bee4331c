//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "npk_pumps", version, about = "Aquarium NPK dosing pump controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/npk_config.toml")]
    pub config: PathBuf,

    /// Log and print as JSON lines instead of plain text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the broker and serve both pumps until interrupted
    Run,
    /// Send one command to a pump locally, without a broker, and wait until it is idle
    Dose {
        /// Channel id, e.g. NPK_1
        #[arg(long)]
        channel: String,
        /// Payload exactly as it would arrive on `on/set` (seconds, or 0 for off)
        #[arg(allow_hyphen_values = true)]
        payload: String,
    },
    /// Validate config, open every output and drive it to its idle level
    SelfCheck,
}
