use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::time_series_processor::{MovingAverageWindow, ProcessorConfig};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub requests_per_minute: u32,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub processor: ProcessorConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("ALPHA_VANTAGE_API_KEY").ok_or(ConfigError::Missing("ALPHA_VANTAGE_API_KEY"))?;

        let requests_per_minute: u32 = parse_var(&get, "REQUESTS_PER_MINUTE", 5)?;
        if requests_per_minute == 0 {
            return Err(ConfigError::Invalid {
                var: "REQUESTS_PER_MINUTE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let ma_windows = match lookup("MA_WINDOWS") {
            Some(value) => parse_ma_windows(&value)?,
            None => MovingAverageWindow::ALL.to_vec(),
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url: get("ALPHA_VANTAGE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var(&get, "PORT", 8050)?,
            request_timeout: Duration::from_secs(parse_var(&get, "REQUEST_TIMEOUT", 30)?),
            max_retries: parse_var(&get, "MAX_RETRIES", 3)?,
            retry_delay: Duration::from_secs(parse_var(&get, "RETRY_DELAY", 1)?),
            requests_per_minute,
            cache_enabled: parse_var(&get, "CACHE_ENABLED", false)?,
            cache_ttl: Duration::from_secs(parse_var(&get, "CACHE_TTL", 300)?),
            processor: ProcessorConfig { ma_windows },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

/// Parse `"5,10,20"`. An empty value disables every window.
fn parse_ma_windows(value: &str) -> Result<Vec<MovingAverageWindow>, ConfigError> {
    let mut windows = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let window = part
            .parse::<usize>()
            .ok()
            .and_then(MovingAverageWindow::from_len)
            .ok_or_else(|| ConfigError::Invalid {
                var: "MA_WINDOWS",
                value: value.to_string(),
                reason: format!("unsupported window '{part}', expected 5, 10 or 20"),
            })?;
        if !windows.contains(&window) {
            windows.push(window);
        }
    }
    windows.sort();
    Ok(windows)
}
