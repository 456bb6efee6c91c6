use crate::session::AnalysisParams;
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const LOOKBACK_RANGE: RangeInclusive<usize> = 5..=60;
const MA_WINDOW_RANGE: RangeInclusive<usize> = 3..=30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NotifierConfig {
    Slack { webhook_url: String },
    Telegram { bot_token: String, chat_id: i64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub sid: String,
    #[serde(default)]
    pub name: Option<String>,
    pub lookback_days: usize,
    pub ma_window: usize,
    #[serde(default = "default_bias_ma_window")]
    pub bias_ma_window: usize,
    #[serde(default = "default_history_days")]
    pub history_days: usize,
}

impl SecurityConfig {
    pub fn params(&self) -> AnalysisParams {
        AnalysisParams {
            lookback: self.lookback_days,
            ma_window: self.ma_window,
            bias_ma_window: self.bias_ma_window,
            history_days: self.history_days,
        }
    }

    /// Name for log lines: `2337 (Macronix)` or just the id.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.sid, name),
            None => self.sid.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub check_interval_seconds: Option<u64>,
    #[serde(default)]
    pub monitor: bool,
    #[serde(default)]
    pub notifier: Option<NotifierConfig>,
    pub securities: Vec<SecurityConfig>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.securities.is_empty() {
            return Err(ConfigError::Invalid("no securities configured".into()));
        }
        if self.check_interval_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "check_interval_seconds must be positive".into(),
            ));
        }
        if self.monitor && self.notifier.is_none() {
            return Err(ConfigError::Invalid(
                "monitor is enabled but no notifier is configured".into(),
            ));
        }

        for sec in &self.securities {
            if !crate::utils::is_valid_security_id(&sec.sid) {
                return Err(ConfigError::Invalid(format!("bad security id '{}'", sec.sid)));
            }
            if !LOOKBACK_RANGE.contains(&sec.lookback_days) {
                return Err(ConfigError::Invalid(format!(
                    "{}: lookback_days {} outside {:?}",
                    sec.sid, sec.lookback_days, LOOKBACK_RANGE
                )));
            }
            if !MA_WINDOW_RANGE.contains(&sec.ma_window) {
                return Err(ConfigError::Invalid(format!(
                    "{}: ma_window {} outside {:?}",
                    sec.sid, sec.ma_window, MA_WINDOW_RANGE
                )));
            }
            if sec.bias_ma_window == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{}: bias_ma_window must be positive",
                    sec.sid
                )));
            }
            let needed = sec.bias_ma_window + sec.lookback_days - 1;
            if sec.history_days < needed {
                return Err(ConfigError::Invalid(format!(
                    "{}: history_days {} cannot cover {} prices",
                    sec.sid, sec.history_days, needed
                )));
            }
        }
        Ok(())
    }
}

fn default_db_path() -> String {
    "data.db".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_bias_ma_window() -> usize {
    5
}

fn default_history_days() -> usize {
    180
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
