use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// A single listing feed: either a local JSON file or an HTTP endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DealConfig {
    /// Fraction below the group average that counts as a deal (0.15 = 15%).
    pub deviation_threshold: f64,
    /// Absolute amount below the group average that counts as a deal.
    pub min_price_delta: f64,
    /// Groups smaller than this are too thin to judge.
    pub min_group_size: usize,
}

impl Default for DealConfig {
    fn default() -> Self {
        Self {
            deviation_threshold: 0.15,
            min_price_delta: 150.0,
            min_group_size: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Share of filter tokens that must appear in the stored value when no
    /// canonical category applies.
    pub token_overlap: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { token_overlap: 2.0 / 3.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    pub check_interval_seconds: u64,
    pub price_band_step: u32,
    /// Where unparseable feed bodies are saved; `null` disables the dump.
    pub debug_dump_dir: Option<String>,
    pub feeds: Vec<FeedConfig>,
    pub deals: DealConfig,
    pub matching: MatchingConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "catalog.db".to_string(),
            check_interval_seconds: 3600,
            price_band_step: 100,
            debug_dump_dir: Some("logs/feeds".to_string()),
            feeds: Vec::new(),
            deals: DealConfig::default(),
            matching: MatchingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Loads the config from `path`. A missing file yields the defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = parse_config(r#"{"feeds": [{"name": "amazon", "path": "feed.json"}]}"#).unwrap();
        assert_eq!(cfg.database_path, "catalog.db");
        assert_eq!(cfg.feeds.len(), 1);
        assert_eq!(cfg.feeds[0].path.as_deref(), Some("feed.json"));
        assert!(cfg.feeds[0].url.is_none());
        assert_eq!(cfg.deals.min_group_size, 3);
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert_eq!(cfg.debug_dump_dir.as_deref(), Some("logs/feeds"));
    }

    #[test]
    fn nested_sections_override_partially() {
        let cfg = parse_config(
            r#"{"deals": {"deviation_threshold": 0.2}, "logging": {"format": "json"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.deals.deviation_threshold, 0.2);
        assert_eq!(cfg.deals.min_price_delta, 150.0);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn null_disables_the_debug_dump() {
        let cfg = parse_config(r#"{"debug_dump_dir": null}"#).unwrap();
        assert!(cfg.debug_dump_dir.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = load_config("/nonexistent/laptop-sniper.json").unwrap();
        assert_eq!(cfg.check_interval_seconds, 3600);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(parse_config("{"), Err(ConfigError::Invalid(_))));
    }
}
