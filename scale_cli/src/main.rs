mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{RunParams, calibrate, run_scale, self_check};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn load_config(path: Option<&Path>) -> eyre::Result<scale_config::Config> {
    match path {
        Some(p) => scale_config::load_file(p),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            scale_config::load_file(Path::new(DEFAULT_CONFIG))
        }
        None => Ok(scale_config::Config::default()),
    }
}

fn init_tracing(json: bool, cli_level: Option<&str>, logging: &scale_config::Logging) {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (pretty, json_layer) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            None,
        )
    };

    let file_layer = logging.file.as_deref().and_then(|file| {
        use tracing_appender::rolling::{RollingFileAppender, Rotation};
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let prefix = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scale.log".to_string());
        let rotation = match logging.rotation.as_deref() {
            Some("daily") => Rotation::DAILY,
            Some("hourly") => Rotation::HOURLY,
            _ => Rotation::NEVER,
        };
        match RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(prefix)
            .build(dir)
        {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                Some(fmt::layer().json().with_ansi(false).with_writer(writer))
            }
            Err(e) => {
                eprintln!("warning: file logging disabled: {e}");
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json_layer)
        .with(file_layer)
        .try_init();
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    match cli.cmd {
        Commands::Run {
            load_grams,
            duration_ms,
            mode,
            snapshot_ms,
        } => {
            if !load_grams.is_finite() || load_grams < 0.0 {
                eyre::bail!("--load-grams must be a finite value >= 0");
            }
            run_scale(
                &cfg,
                RunParams {
                    load_grams,
                    duration_ms,
                    mode: mode.map(Into::into),
                    snapshot_ms,
                    json: cli.json,
                },
                shutdown,
            )
            .wrap_err("scale run failed")?;
        }
        Commands::Calibrate { known_grams } => {
            let report = calibrate(&cfg, known_grams)?;
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "known_grams": known_grams,
                        "zero_point": report.zero_point,
                        "full_scale_count": report.full_scale_count,
                        "scale_factor": report.scale_factor,
                    })
                );
            } else {
                println!(
                    "Calibration complete: zero_point={} full_scale_count={} scale_factor={:.6} g/count",
                    report.zero_point, report.full_scale_count, report.scale_factor
                );
            }
        }
        Commands::SelfCheck => {
            let grams = self_check(&cfg)?;
            tracing::info!(grams, "self-check passed");
            println!("OK");
        }
        Commands::Health => {
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "status": "ok",
                        "version": env!("CARGO_PKG_VERSION"),
                        "overweight_mode": format!("{:?}", cfg.scale.overweight_mode).to_ascii_lowercase(),
                        "overweight_limit_g": cfg.scale.overweight_limit_g,
                        "timer_period_us": cfg.timer.period_us,
                    })
                );
            } else {
                println!("healthy");
            }
        }
    }
    Ok(())
}
