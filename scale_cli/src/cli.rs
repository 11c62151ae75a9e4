//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "scale", version, about = "Talking kitchen scale")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/scale_config.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

impl Cli {
    /// Commands that never touch the config file.
    pub fn needs_config(&self) -> bool {
        !matches!(self.cmd, Commands::Say { .. } | Commands::Vocab)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scale until it powers off or is interrupted
    Run {
        /// Use simulated devices on a virtual clock instead of GPIO
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Keypad script for the simulator, one symbol per tick ('.' = no key)
        #[arg(long, value_name = "KEYS", default_value = "", requires = "sim")]
        keys: String,
        /// Grams added to the simulated load on every sample
        #[arg(long, value_name = "GRAMS", default_value_t = 0.0, requires = "sim")]
        ramp_g: f32,
        /// Stop ramping once the simulated load reaches this many grams
        #[arg(long, value_name = "GRAMS", requires = "sim")]
        ramp_to: Option<f32>,
        /// Stop after this many loop ticks
        #[arg(long, value_name = "N")]
        max_ticks: Option<u64>,
        /// Override timing.idle_timeout_s from the config
        #[arg(long, value_name = "SECONDS")]
        idle_timeout_s: Option<u64>,
    },
    /// Print the clips used to speak a number
    Say {
        /// Whole number in -999999..=999999
        #[arg(allow_hyphen_values = true)]
        n: i32,
    },
    /// Classify a reading against a target with the configured thresholds
    Zone {
        #[arg(long, value_name = "GRAMS", allow_hyphen_values = true)]
        target: i32,
        #[arg(long, value_name = "GRAMS", allow_hyphen_values = true)]
        reading: i32,
    },
    /// List the clip table (track number, name and text)
    Vocab,
    /// Quick health check (device presence / sim ok)
    SelfCheck {
        /// Check the simulated device set instead of GPIO
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
}
