//! Configuration for the merchant console.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tui_table::SortOrder;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| Self::parse(&s).ok())
            .unwrap_or_default()
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    /// Default config file path, if a home directory is available.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "merchant-console")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Log file location: `logging.file` if set, otherwise the data dir.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.logging.file.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "merchant-console")
                .map(|d| d.data_dir().join("merchant-console.log"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Currency used for amounts with no currency of their own
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Show "3 days ago" instead of dates in tables
    #[serde(default = "default_true")]
    pub relative_dates: bool,
}

fn default_page_size() -> usize {
    10
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_true() -> bool {
    true
}

impl DisplayConfig {
    /// `currency`, or the configured default when it is blank.
    pub fn currency_or_default<'a>(&'a self, currency: &'a str) -> &'a str {
        if currency.trim().is_empty() {
            &self.currency
        } else {
            currency
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            currency: "USD".to_string(),
            relative_dates: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub default_sort: SortOrder,
    #[serde(default)]
    pub cell_border: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown names fall back to INFO.
    pub fn level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.display.page_size, 10);
        assert_eq!(config.table.default_sort, SortOrder::Latest);
        assert_eq!(config.logging.level(), tracing::Level::INFO);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [display]
            page_size = 20
            relative_dates = false

            [table]
            default_sort = "oldest"
            cell_border = true

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.display.page_size, 20);
        assert_eq!(config.display.currency, "USD");
        assert!(!config.display.relative_dates);
        assert_eq!(config.table.default_sort, SortOrder::Oldest);
        assert!(config.table.cell_border);
        assert_eq!(config.logging.level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_currency_fallback() {
        let display = DisplayConfig {
            currency: "EUR".to_string(),
            ..DisplayConfig::default()
        };
        assert_eq!(display.currency_or_default("GBP"), "GBP");
        assert_eq!(display.currency_or_default(""), "EUR");
        assert_eq!(display.currency_or_default("  "), "EUR");
    }

    #[test]
    fn test_unknown_sort_key_is_unsorted() {
        let config = Config::parse("[table]\ndefault_sort = \"newest\"\n").unwrap();
        assert_eq!(config.table.default_sort, SortOrder::Unsorted);
    }

    #[test]
    fn test_round_trip_toml() {
        let mut config = Config::default();
        config.logging.file = Some(PathBuf::from("/tmp/merchants.log"));
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/merchants.log")));
    }
}
