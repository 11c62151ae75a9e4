#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use serde_json::json;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE, json_mode};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{RunArgs, RunReport, run_scale, self_check, stop_reason_name};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = try_main(cli) {
        tracing::debug!(error = ?err, "command failed");
        if json_mode() {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn try_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = if cli.needs_config() {
        Some(load_config(&cli.config)?)
    } else {
        None
    };
    init_tracing(&cli, cfg.as_ref().map(|c| &c.logging))?;

    match (cli.cmd, cfg) {
        (Commands::Say { n }, _) => cmd_say(n),
        (Commands::Vocab, _) => {
            cmd_vocab();
            Ok(())
        }
        (Commands::Zone { target, reading }, Some(cfg)) => {
            cmd_zone(&cfg, target, reading);
            Ok(())
        }
        (
            Commands::Run {
                sim,
                keys,
                ramp_g,
                ramp_to,
                max_ticks,
                idle_timeout_s,
            },
            Some(cfg),
        ) => {
            let args = RunArgs {
                sim,
                keys,
                ramp_g,
                ramp_to,
                max_ticks,
                idle_timeout_s,
            };
            let interrupt = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&interrupt);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            let report = run_scale(&cfg, &args, &interrupt)?;
            print_report(&report);
            Ok(())
        }
        (Commands::SelfCheck { sim }, Some(cfg)) => {
            self_check(&cfg, sim)?;
            if json_mode() {
                println!("{}", json!({ "status": "ok", "sim": sim }));
            } else {
                println!("OK");
            }
            Ok(())
        }
        (_, None) => eyre::bail!("command needs a config file"),
    }
}

fn load_config(path: &Path) -> eyre::Result<scale_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = scale_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

// ── Logging ──────────────────────────────────────────────────────────────────

/// Console logs go to stderr so stdout stays clean for command output.
/// `RUST_LOG` overrides `--log-level`. When `[logging] file` is set, JSON
/// lines are also written there through a non-blocking appender.
fn init_tracing(cli: &Cli, logging: Option<&scale_config::Logging>) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .wrap_err("invalid --log-level")?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if cli.json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    if let Some(log) = logging
        && let Some(file) = &log.file
    {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let name = path.file_name().map_or_else(|| "scale.log".into(), |n| n.to_os_string());
        let appender = match log.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_filter = EnvFilter::try_new(log.level.as_deref().unwrap_or("info"))
            .wrap_err("invalid logging.level")?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn cmd_say(n: i32) -> eyre::Result<()> {
    let tokens = scale_core::compose(n)?;
    let names: Vec<&str> = tokens.iter().map(|t| t.name()).collect();
    if json_mode() {
        let tracks: Vec<u16> = tokens.iter().map(|t| t.track()).collect();
        let decoded = scale_core::decode(&tokens);
        println!(
            "{}",
            json!({ "n": n, "tokens": names, "tracks": tracks, "decoded": decoded })
        );
    } else {
        println!("{}", names.join(" "));
    }
    Ok(())
}

fn cmd_vocab() {
    if json_mode() {
        let rows: Vec<_> = scale_core::Token::ALL
            .iter()
            .map(|t| json!({ "track": t.track(), "name": t.name(), "text": t.text() }))
            .collect();
        println!("{}", serde_json::Value::Array(rows));
        return;
    }
    for t in scale_core::Token::ALL {
        println!("{:04}_{}\t{}", t.track(), t.name(), t.text());
    }
}

fn cmd_zone(cfg: &scale_config::Config, target: i32, reading: i32) {
    let guidance: scale_core::GuidanceCfg = (&cfg.guidance).into();
    let zone = scale_core::classify(&guidance, target, reading);
    if json_mode() {
        println!(
            "{}",
            json!({ "target_g": target, "reading_g": reading, "zone": zone.as_str() })
        );
    } else {
        println!("{zone}");
    }
}

fn print_report(r: &RunReport) {
    if json_mode() {
        let spoken = r
            .spoken
            .as_ref()
            .map(|s| s.iter().map(|t| t.name()).collect::<Vec<_>>());
        println!(
            "{}",
            json!({
                "reason": stop_reason_name(r.outcome.reason),
                "ticks": r.outcome.ticks,
                "target_g": r.target_g,
                "reading_g": r.reading_g,
                "zone": r.zone.as_str(),
                "voice_muted": r.voice_muted,
                "sensor_fault": r.sensor_fault,
                "power_cut": r.power_cut,
                "spoken": spoken,
            })
        );
        return;
    }
    if let Some(spoken) = &r.spoken {
        let names: Vec<&str> = spoken.iter().map(|t| t.name()).collect();
        println!("spoken: {}", names.join(" "));
    }
    let opt = |v: Option<i32>| v.map_or_else(|| "-".to_string(), |g| g.to_string());
    println!(
        "run finished: reason={} ticks={} target_g={} reading_g={} zone={}",
        stop_reason_name(r.outcome.reason),
        r.outcome.ticks,
        opt(r.target_g),
        opt(r.reading_g),
        r.zone,
    );
}
