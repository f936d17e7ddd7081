use anyhow::Result;
use std::sync::OnceLock;
use tracing::Level;

use crate::config::{Config, LogLevel};

static DECORATED: OnceLock<bool> = OnceLock::new();

const DIVIDER_WIDTH: usize = 64;

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Installs the global subscriber. Call once at startup.
pub fn init(config: &Config) -> Result<()> {
    DECORATED.get_or_init(|| config.pretty_log);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::from(config.log_level))
        .with_ansi(config.pretty_log)
        .with_target(config.pretty_log)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge log crate -> tracing (so log::info! etc. work)
    tracing_log::LogTracer::init()?;
    Ok(())
}

fn decorated() -> bool {
    *DECORATED.get().unwrap_or(&true)
}

/// Logs a banner marking the start of a larger unit of work.
pub fn section(title: &str) {
    if decorated() {
        let line = "─".repeat(DIVIDER_WIDTH);
        log::info!("{line}");
        log::info!("{title}");
        log::info!("{line}");
    } else {
        log::info!("== {title} ==");
    }
}

/// Cuts a topic down for log lines.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
