//! Typed configuration, validated once at load time.
//!
//! Sources in increasing precedence: built-in defaults, `config.json`,
//! environment (`.env` is read first).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::core::AlertError;
use crate::market_hours::MarketHours;
use crate::news::NewsOptions;

/// Placeholder shipped in sample configs; never a valid topic.
pub const PLACEHOLDER_TOPIC: &str = "CHANGE-ME";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogConfig,
    pub ntfy: NtfyConfig,
    /// Symbols checked in this order every run.
    pub tickers: Vec<String>,
    /// Alert when the move against the open reaches ±this many percent.
    pub threshold_pct: f64,
    pub state_file: PathBuf,
    pub company_cache_file: PathBuf,
    pub market_hours: MarketHours,
    pub test: TestConfig,
    pub news: NewsOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            ntfy: NtfyConfig::default(),
            tickers: vec!["AAPL".into()],
            threshold_pct: 3.0,
            state_file: PathBuf::from("alert_state.json"),
            company_cache_file: PathBuf::from("company_cache.json"),
            market_hours: MarketHours::default(),
            test: TestConfig::default(),
            news: NewsOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `DEBUG`, `INFO`, `WARNING`, `ERROR` (case-insensitive).
    pub level: String,
    pub to_file: bool,
    pub file_path: PathBuf,
    /// Size at which the log file is rolled over.
    pub file_max_bytes: u64,
    /// Rolled-over files kept next to the live one.
    pub file_backup_count: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "INFO".into(),
            to_file: false,
            file_path: PathBuf::from("alerts.log"),
            file_max_bytes: 1_000_000,
            file_backup_count: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NtfyConfig {
    pub server: String,
    /// Secret topic name; only ever logged masked.
    pub topic: String,
}

impl Default for NtfyConfig {
    fn default() -> Self {
        Self {
            server: "https://ntfy.sh".into(),
            topic: PLACEHOLDER_TOPIC.into(),
        }
    }
}

/// Rehearsal switches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub enabled: bool,
    pub bypass_market_hours: bool,
    /// Replaces the measured move for every ticker.
    pub force_delta_pct: Option<f64>,
    /// Log notifications instead of sending them. Honoured even when
    /// `enabled` is off.
    pub dry_run: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bypass_market_hours: true,
            force_delta_pct: None,
            dry_run: false,
        }
    }
}

impl TestConfig {
    pub fn bypasses_market_hours(&self) -> bool {
        self.enabled && self.bypass_market_hours
    }

    pub fn forced_delta(&self) -> Option<f64> {
        self.force_delta_pct.filter(|_| self.enabled)
    }
}

impl AppConfig {
    /// Loads `.env`, then `path` (missing file means defaults), applies
    /// environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if validation fails.
    pub fn load(path: &Path) -> Result<Self, AlertError> {
        dotenvy::dotenv().ok();

        let mut cfg = match fs::read_to_string(path) {
            Ok(text) => Self::from_json_str(&text).map_err(|e| {
                AlertError::Config(format!("{} could not be read: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };

        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses a JSON document; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or has wrongly typed keys.
    pub fn from_json_str(text: &str) -> Result<Self, AlertError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies `LOG_LEVEL`, `NTFY_SERVER` and `NTFY_TOPIC` from `lookup`.
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = get("NTFY_SERVER") {
            self.ntfy.server = v;
        }
        if let Some(v) = get("NTFY_TOPIC") {
            self.ntfy.topic = v;
        }
    }

    /// Checks values a run cannot start without.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), AlertError> {
        let bad = |msg: &str| Err(AlertError::Config(msg.to_string()));

        let topic = self.ntfy.topic.trim();
        if topic.is_empty() || topic == PLACEHOLDER_TOPIC {
            return bad("please set a secret ntfy topic (config.json or NTFY_TOPIC)");
        }
        match Url::parse(&self.ntfy.server) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => return bad("ntfy.server must be an http(s) URL"),
        }
        if self.tickers.is_empty() {
            return bad("tickers must not be empty");
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            return bad("tickers must not contain blank symbols");
        }
        if !(self.threshold_pct.is_finite() && self.threshold_pct > 0.0) {
            return bad("threshold_pct must be a positive number");
        }
        let mh = &self.market_hours;
        if mh.start_hour >= mh.end_hour || mh.end_hour > 24 {
            return bad("market_hours needs 0 <= start_hour < end_hour <= 24");
        }
        if self.test.force_delta_pct.is_some_and(|d| !d.is_finite()) {
            return bad("test.force_delta_pct must be a finite number");
        }
        if self.log.to_file && (self.log.file_max_bytes == 0 || self.log.file_backup_count == 0) {
            return bad("log.file_max_bytes and log.file_backup_count must be at least 1");
        }
        if self.news.enabled && self.news.limit == 0 {
            return bad("news.limit must be at least 1");
        }
        Ok(())
    }
}
