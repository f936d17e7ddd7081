use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{ReportError, Result};

/// Placeholder value shipped in `.env.example`.
pub const API_KEY_PLACEHOLDER: &str = "your_tavily_api_key_here";
const MIN_API_KEY_LEN: usize = 10;

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub log_level: LogLevel,
    pub pretty_log: bool,
    pub output_dir: PathBuf,
    pub report_language: String,
    pub bind_addr: String,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source, `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get_opt = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or_default = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| default.to_string())
        };

        let credentials = Credentials::default();
        if let Some(key) = get_opt("TAVILY_API_KEY") {
            // rejected keys show up as "not configured" at startup
            credentials.set(&key).ok();
        }

        Config {
            credentials,
            log_level: LogLevel::parse(&get_or_default("LOG_LEVEL", "INFO")),
            pretty_log: get_or_default("PRETTY_LOG", "1") != "0",
            output_dir: PathBuf::from(get_or_default("REPORT_OUTPUT_DIR", "reports")),
            report_language: get_or_default("REPORT_LANGUAGE", "Korean"),
            bind_addr: get_or_default("BIND_ADDR", "127.0.0.1:8501"),
            static_dir: PathBuf::from(get_or_default("STATIC_DIR", "static")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            credentials: Credentials::default(),
            log_level: LogLevel::Info,
            pretty_log: true,
            output_dir: PathBuf::from("reports"),
            report_language: "Korean".to_string(),
            bind_addr: "127.0.0.1:8501".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Ordered log severities accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Unknown values fall back to `Info`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Shared handle to the search API key.
///
/// Cloning shares the same slot, so a key entered through the UI is seen by
/// every search client built from this handle.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    api_key: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    pub fn with_key(key: &str) -> Result<Self> {
        let credentials = Credentials::default();
        credentials.set(key)?;
        Ok(credentials)
    }

    /// Stores `key` if it passes [`validate_api_key`].
    pub fn set(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if !validate_api_key(key) {
            return Err(ReportError::Configuration(
                "invalid Tavily API key format".to_string(),
            ));
        }
        // the slot is a plain Option, so a poisoned lock still holds a usable value
        let mut slot = self
            .api_key
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(key.to_string());
        Ok(())
    }

    pub fn get(&self) -> Option<String> {
        self.api_key
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_configured(&self) -> bool {
        self.get().is_some()
    }

    /// Returns the key or the `Configuration` error a pipeline run fails with.
    pub fn require(&self) -> Result<String> {
        self.get().ok_or_else(|| {
            ReportError::Configuration(
                "Tavily API key is not set. Set TAVILY_API_KEY in .env or enter it in the UI."
                    .to_string(),
            )
        })
    }
}

/// Shape check only; the provider does the real validation.
pub fn validate_api_key(api_key: &str) -> bool {
    if api_key.is_empty() {
        return false;
    }
    if api_key == API_KEY_PLACEHOLDER || api_key.chars().count() < MIN_API_KEY_LEN {
        return false;
    }
    true
}
