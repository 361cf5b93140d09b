//! Process settings resolved from the environment.
//!
//! - `PDG_CONFIG`: metric document path (default `config.yml`)
//! - `PDG_LOG_LEVEL`: `DEBUG`, `INFO`, `WARN`/`WARNING` or `ERROR`;
//!   anything else silently means `INFO`

use std::net::SocketAddr;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "PDG_CONFIG";
pub const LOG_LEVEL_ENV: &str = "PDG_LOG_LEVEL";
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const LISTEN_PORT: u16 = 9000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub log_level: LogLevel,
    pub listen: SocketAddr,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config_path = lookup(CONFIG_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let log_level = lookup(LOG_LEVEL_ENV)
            .and_then(|l| LogLevel::parse(&l))
            .unwrap_or_default();

        Self {
            config_path,
            log_level,
            listen: SocketAddr::from(([0, 0, 0, 0], LISTEN_PORT)),
        }
    }
}
