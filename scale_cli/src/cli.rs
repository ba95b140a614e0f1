//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config file used when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG: &str = "etc/scale_config.toml";

#[derive(Parser, Debug)]
#[command(name = "scale", version, about = "Weighing scale CLI (simulated peripherals)")]
pub struct Cli {
    /// Path to config TOML (default: etc/scale_config.toml if present, else built-in defaults)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// Poll weight on a fixed cadence and alarm while overweight
    Realtime,
    /// Check weight only on Tare/Measure and block the key when overweight
    Keycheck,
}

impl From<ModeArg> for scale_core::OverweightMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Realtime => scale_core::OverweightMode::RealTime,
            ModeArg::Keycheck => scale_core::OverweightMode::KeyCheck,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scale main loop against a simulated load cell
    #[command(
        long_about = "Run the scale main loop against a simulated load cell.\n\nKey commands are read from stdin, one per line:\n  tare | calib | measure | power   press a front-panel key\n  key <N>                          press the key wired to channel N\n  load <GRAMS>                     change the simulated load\n  mode realtime|keycheck           switch overweight detection\n  status                           print a status snapshot\n  quit                             stop the loop"
    )]
    Run {
        /// Grams placed on the platform after start-up
        #[arg(long, value_name = "GRAMS", default_value_t = 0.0)]
        load_grams: f32,
        /// Stop after this many milliseconds (default: run until quit or Ctrl-C)
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Override the configured overweight mode
        #[arg(long, value_enum, value_name = "MODE")]
        mode: Option<ModeArg>,
        /// Status snapshot cadence in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 500)]
        snapshot_ms: u32,
    },
    /// Zero the scale, then derive the scale factor from a known weight
    Calibrate {
        /// Reference weight in grams placed on the simulated platform
        /// (1 to about 980 g; heavier loads saturate the converter)
        #[arg(long, value_name = "GRAMS")]
        known_grams: u32,
    },
    /// Quick check that the pipeline reads zero with an empty platform
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}
