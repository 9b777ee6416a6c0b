//! # Logging
//!
//! Process-wide `tracing` setup: an `EnvFilter`, a console layer and a plain-text
//! file layer written through a non-blocking appender.

use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE: &str = "bot.log";

/// Used when `RUST_LOG` is unset. Keeps the Discord and HTTP stacks quiet.
pub const DEFAULT_FILTER: &str = "info,serenity=warn,poise=warn,reqwest=warn,hyper=warn";

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. The returned guard flushes the file writer on
/// drop and must be held until shutdown.
pub fn init(log_dir: &str) -> anyhow::Result<WorkerGuard> {
    let dir = Path::new(log_dir);
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory {log_dir}"))?;
    }

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
