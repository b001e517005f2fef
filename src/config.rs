//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Kind of row source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Row-store CSV export
    Csv,
    /// JSON history snapshots from the upstream feed
    Json,
}

impl SourceKind {
    /// Guess the kind from a file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceKind::Json,
            _ => SourceKind::Csv,
        }
    }
}

/// Raw data configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Path to the raw rows
    pub path: Option<String>,

    /// Source kind; guessed from the file extension when unset
    pub kind: Option<SourceKind>,

    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_has_header() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            kind: None,
            has_header: default_has_header(),
        }
    }
}

impl SourceConfig {
    /// Configured kind, or the one implied by the path
    pub fn resolved_kind(&self, path: &Path) -> SourceKind {
        self.kind.unwrap_or_else(|| SourceKind::from_path(path))
    }
}

/// Default request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_granularity")]
    pub granularity: String,

    #[serde(default = "default_metric")]
    pub metric: String,
}

fn default_granularity() -> String {
    "Daily".to_string()
}

fn default_metric() -> String {
    "Pace of change".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            granularity: default_granularity(),
            metric: default_metric(),
        }
    }
}

/// Result output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// table, csv or json
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Write results here instead of stdout
    pub path: Option<String>,
}

fn default_output_format() -> String {
    "table".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        // Try default config locations
        let config_paths = [
            dirs::config_dir().map(|p| p.join("frontline").join("config.toml")),
            Some(PathBuf::from("/etc/frontline/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Source overrides
        if let Some(path) = var("FRONTLINE_RAW_DATA") {
            self.source.path = Some(path);
        }

        // Query overrides
        if let Some(granularity) = var("FRONTLINE_GRANULARITY") {
            self.query.granularity = granularity;
        }
        if let Some(metric) = var("FRONTLINE_METRIC") {
            self.query.metric = metric;
        }

        // Output overrides
        if let Some(format) = var("FRONTLINE_OUTPUT_FORMAT") {
            self.output.format = format;
        }

        // Logging overrides
        if let Some(level) = var("FRONTLINE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FRONTLINE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Frontline Configuration
#
# Environment variables override these settings:
# - FRONTLINE_RAW_DATA
# - FRONTLINE_GRANULARITY
# - FRONTLINE_METRIC
# - FRONTLINE_OUTPUT_FORMAT
# - FRONTLINE_LOG_LEVEL
# - FRONTLINE_LOG_FORMAT

[source]
# Raw rows: a row-store CSV export or a JSON history export
# path = "~/frontline/raw_data.csv"

# csv or json (guessed from the file extension when unset)
# kind = "csv"

# Whether the CSV starts with a header row
has_header = true

[query]
# Daily, Weekly, Monthly, "Last 30 days" or "23.02.2022 to date"
granularity = "Daily"

# "Pace of change", "Area change", "Average pace" or "Top 5 Changes"
metric = "Pace of change"

[output]
# table, csv or json
format = "table"

# Optional output file (default: stdout)
# path = "./result.csv"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/frontline/frontline.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.query.granularity, "Daily");
        assert_eq!(config.query.metric, "Pace of change");
        assert_eq!(config.output.format, "table");
        assert!(config.source.has_header);
        assert!(config.source.path.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
[source]
path = "rows.json"
kind = "json"

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.source.kind, Some(SourceKind::Json));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.query.metric, "Pace of change");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FRONTLINE_RAW_DATA", "/data/rows.csv"),
            ("FRONTLINE_GRANULARITY", "Weekly"),
            ("FRONTLINE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.path.as_deref(), Some("/data/rows.csv"));
        assert_eq!(config.query.granularity, "Weekly");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.query.metric, "Pace of change");
    }

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a/b.JSON")), SourceKind::Json);
        assert_eq!(SourceKind::from_path(Path::new("rows.csv")), SourceKind::Csv);
        assert_eq!(SourceKind::from_path(Path::new("rows")), SourceKind::Csv);
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/frontline.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[query\n").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
