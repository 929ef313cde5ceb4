// src/config/mod.rs
//! Runtime configuration.
//!
//! Resolution order (later wins):
//! 1) built-in defaults
//! 2) TOML file: `$RELAY_CONFIG_PATH`, else `config/relay.toml` if present
//! 3) environment variables (a `.env` file is loaded by the binary first)

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::feed::stocktwits::{DEFAULT_FEED_LIMIT, DEFAULT_FEED_URL};

pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/relay.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Discord webhook. Append `?thread_id=...` to post into a thread.
    pub webhook_url: Option<String>,
    pub slack_webhook_url: Option<String>,
    /// Per-request timeout for every webhook sink.
    pub notify_timeout_secs: u64,
    pub feed_url: String,
    pub feed_limit: u32,
    pub poll_interval_secs: u64,
    pub weekend_sleep_secs: u64,
    pub skip_weekends: bool,
    /// Forced starting watermark; posts above it are replayed on the first cycle.
    pub start_after_id: Option<u64>,
    /// `host:port` for the Prometheus `/metrics` listener; off when unset.
    pub metrics_addr: Option<String>,
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            slack_webhook_url: None,
            notify_timeout_secs: 5,
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_limit: DEFAULT_FEED_LIMIT,
            poll_interval_secs: 300,
            weekend_sleep_secs: 3600,
            skip_weekends: true,
            start_after_id: None,
            metrics_addr: None,
            log_format: LogFormat::Compact,
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file_default()?;
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading relay config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn load_file_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }

    /// Overlay environment values. Empty strings count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("WEBHOOK_URL") {
            self.webhook_url = Some(v);
        }
        if let Some(v) = get("SLACK_WEBHOOK_URL") {
            self.slack_webhook_url = Some(v);
        }
        if let Some(v) = get("NOTIFY_TIMEOUT_SECS") {
            self.notify_timeout_secs = parse_var("NOTIFY_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("FEED_URL") {
            self.feed_url = v;
        }
        if let Some(v) = get("FEED_LIMIT") {
            self.feed_limit = parse_var("FEED_LIMIT", &v)?;
        }
        if let Some(v) = get("POLL_INTERVAL_SECS") {
            self.poll_interval_secs = parse_var("POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = get("WEEKEND_SLEEP_SECS") {
            self.weekend_sleep_secs = parse_var("WEEKEND_SLEEP_SECS", &v)?;
        }
        if let Some(v) = get("SKIP_WEEKENDS") {
            self.skip_weekends = parse_bool("SKIP_WEEKENDS", &v)?;
        }
        if let Some(v) = get("RELAY_START_AFTER_ID") {
            self.start_after_id = Some(parse_var("RELAY_START_AFTER_ID", &v)?);
        }
        if let Some(v) = get("METRICS_ADDR") {
            self.metrics_addr = Some(v);
        }
        if let Some(v) = get("LOG_FORMAT") {
            self.log_format = v.parse::<LogFormat>().context("LOG_FORMAT")?;
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("invalid {name}={raw:?}: {e}"))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("invalid {name}={raw:?}: expected a boolean")),
    }
}
