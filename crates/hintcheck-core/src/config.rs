//! Configuration schema (hintcheck.toml)

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the dbt manifest, relative to the project root
pub const DEFAULT_MANIFEST_PATH: &str = "target/manifest.json";

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "hintcheck.toml";

/// Where and whether to send the per-run hook event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelemetryConfig {
    /// Master switch
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Append events as JSON lines to this file instead of logging them
    #[serde(default)]
    pub events_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            events_file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Path to manifest.json (CLI flag wins)
    #[serde(default)]
    pub manifest: Option<PathBuf>,

    /// Check disabled models as well
    #[serde(default)]
    pub include_disabled: bool,

    /// Hook event settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: None,
            include_disabled: false,
            telemetry: TelemetryConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Manifest path: explicit override, then config value, then the dbt default.
    ///
    /// Relative config values are resolved against the config file's directory.
    pub fn manifest_path(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_override {
            return path.to_path_buf();
        }

        match &self.manifest {
            Some(path) if path.is_relative() => self.project_root.join(path),
            Some(path) => path.clone(),
            None => PathBuf::from(DEFAULT_MANIFEST_PATH),
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(!config.include_disabled);
        assert!(config.telemetry.enabled);
        assert_eq!(config.manifest_path(None), PathBuf::from(DEFAULT_MANIFEST_PATH));
    }

    #[test]
    fn parse_full_config() {
        let config = Config::from_toml(
            r#"
            manifest = "build/manifest.json"
            include_disabled = true

            [telemetry]
            enabled = false
            events_file = "events.jsonl"
            "#,
        )
        .unwrap();

        assert!(config.include_disabled);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.events_file, Some(PathBuf::from("events.jsonl")));
        assert!(config.manifest_path(None).ends_with("build/manifest.json"));
    }

    #[test]
    fn cli_manifest_wins() {
        let config = Config::from_toml(r#"manifest = "build/manifest.json""#).unwrap();
        assert_eq!(
            config.manifest_path(Some(Path::new("other.json"))),
            PathBuf::from("other.json")
        );
    }

    #[test]
    fn absolute_manifest_is_kept() {
        let config = Config::from_toml(r#"manifest = "/srv/dbt/manifest.json""#).unwrap();
        assert_eq!(config.manifest_path(None), PathBuf::from("/srv/dbt/manifest.json"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::from_toml("include_disabled = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(Path::new("/definitely/not/here/hintcheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
