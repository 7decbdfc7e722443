//! Service configuration

use config::{Config, ConfigError, Environment, File};
use fallback::AttributionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_FILE: &str = "config/service";

/// Environment variable prefix, e.g. `VALUATION__BIND_ADDR`
pub const ENV_PREFIX: &str = "VALUATION";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// Persisted bundle; `.json` or `.bin` (postcard)
    pub bundle_path: PathBuf,
    /// Reuse the first fallback reload instead of reading the bundle per request
    pub cache_reloads: bool,
    pub attribution: AttributionConfig,
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            bundle_path: PathBuf::from("models/baseline.json"),
            cache_reloads: false,
            attribution: AttributionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Layer defaults, the config file and the environment.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_FILE)).required(path.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.bundle_path, PathBuf::from("models/baseline.json"));
        assert!(!config.cache_reloads);
        assert!(config.attribution.library_enabled);
        assert_eq!(config.attribution.max_exact_features, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        std::fs::write(
            &path,
            r#"
bundle_path = "/srv/models/baseline.bin"
cache_reloads = true

[attribution]
library_enabled = false
"#,
        )
        .unwrap();

        let config = ServiceConfig::load(path.to_str()).unwrap();
        assert_eq!(config.bundle_path, PathBuf::from("/srv/models/baseline.bin"));
        assert!(config.cache_reloads);
        assert!(!config.attribution.library_enabled);
        // Untouched keys keep their defaults
        assert_eq!(config.attribution.max_exact_features, 10);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(ServiceConfig::load(Some("/definitely/not/here/service.toml")).is_err());
    }
}
