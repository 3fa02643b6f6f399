//! # CityAds Runtime Configuration
//!
//! Settings are layered, later layers overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. `cityads.json` in the configuration directory, then
//!    `cityads.<mode>.json` when `RUNNING_MODE_CITYADS` is set (both optional,
//!    values under a `Cityads` section),
//! 3. `CITYADS_*` environment variables, after a `.env` file is loaded.
//!
//! The configuration directory is `CONFIGS_LOCATION`, or the current
//! directory when that is unset.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use config::{ext::*, *};

const CONFIG_FILE_STEM: &str = "cityads";
const CONFIG_SECTION: &str = "cityads";
const ENV_PREFIX: &str = "CITYADS_";
const RUNNING_MODE_VAR: &str = "RUNNING_MODE_CITYADS";
const CONFIGS_LOCATION_VAR: &str = "CONFIGS_LOCATION";

const DEFAULT_BASE_URL: &str = "https://cityads.com/api/rest/webmaster/json/";
const DEFAULT_PAGE_SIZE: u32 = 1000;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to load configuration files: {0}")]
    LoadError(String),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("No webmaster token configured (set CITYADS_TOKEN or Cityads:Token)")]
    MissingToken,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityadsConfig {
    /// Webmaster token. Never printed by `Display`.
    pub token: Option<String>,
    pub base_url: String,
    pub page_size: u32,
    /// Per-request timeout; `None` keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,
    pub log_level: String,
    /// Directory for JSON log files; `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
}

impl Default for CityadsConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
        }
    }
}

impl fmt::Display for CityadsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CityadsConfig
    Token: {},
    Base URL: {},
    Page size: {},
    Timeout (s): {:?},
    Log level: {},
    Log dir: {:?}
",
            if self.token.is_some() { "<set>" } else { "<missing>" },
            self.base_url,
            self.page_size,
            self.timeout_secs,
            self.log_level,
            self.log_dir
        )
    }
}

impl CityadsConfig {
    /// Loads `.env`, the JSON layers from the configuration directory and the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config_dir = match env::var(CONFIGS_LOCATION_VAR) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => env::current_dir()?,
        };
        let mode = env::var(RUNNING_MODE_VAR).ok();

        let mut config = Self::load_from_dir(&config_dir, mode.as_deref())?;
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults overlaid with `cityads.json` and `cityads.<mode>.json` from `dir`.
    pub fn load_from_dir(dir: &Path, mode: Option<&str>) -> Result<Self, ConfigError> {
        let mut files = vec![dir.join(format!("{CONFIG_FILE_STEM}.json"))];
        if let Some(mode) = mode {
            files.push(dir.join(format!("{CONFIG_FILE_STEM}.{mode}.json")));
        }

        let mut config = Self::default();
        config.apply_options(&read_json_layers(&files)?)?;
        Ok(config)
    }

    /// Applies flattened `Section:Key` options (keys compared case-insensitively).
    pub fn apply_options(&mut self, options: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        for (key, value) in options {
            let key = key.to_lowercase();
            let Some(name) = key
                .strip_prefix(CONFIG_SECTION)
                .and_then(|rest| rest.strip_prefix(':'))
            else {
                continue;
            };
            self.set(name, value, &key)?;
        }
        Ok(())
    }

    /// Applies `CITYADS_*` variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in ["token", "baseurl", "pagesize", "timeoutsecs", "loglevel", "logdir"] {
            let var = format!("{ENV_PREFIX}{}", env_suffix(name));
            if let Some(value) = lookup(&var) {
                self.set(name, &value, &var)?;
            }
        }
        Ok(())
    }

    /// The webmaster token, required to build a client.
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    fn set(&mut self, name: &str, value: &str, source: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: source.to_string(),
            value: value.to_string(),
        };
        match name {
            "token" => self.token = Some(value.trim().to_string()),
            "baseurl" => self.base_url = value.trim().to_string(),
            "pagesize" => {
                self.page_size = value.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(invalid)?
            }
            "timeoutsecs" => {
                self.timeout_secs = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().parse::<u64>().map_err(|_| invalid())?)
                }
            }
            "loglevel" => self.log_level = value.trim().to_lowercase(),
            "logdir" => {
                self.log_dir = Some(value.trim())
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            }
            _ => {}
        }
        Ok(())
    }
}

fn env_suffix(name: &str) -> &'static str {
    match name {
        "token" => "TOKEN",
        "baseurl" => "BASE_URL",
        "pagesize" => "PAGE_SIZE",
        "timeoutsecs" => "TIMEOUT_SECS",
        "loglevel" => "LOG_LEVEL",
        _ => "LOG_DIR",
    }
}

/// Reads the given JSON files (each optional) into flattened options.
fn read_json_layers(files: &[PathBuf]) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut builder = DefaultConfigurationBuilder::new();
    for file in files {
        let path = file.to_string_lossy().to_string();
        builder.add_json_file(&path.is().optional());
    }

    let config_data: Box<dyn ConfigurationRoot> = builder
        .build()
        .map_err(|e| ConfigError::LoadError(format!("{e:?}")))?;

    let mut options: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in config_data.iter(None) {
        options.insert(key.to_string(), value.to_string());
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_point_at_production() {
        let config = CityadsConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 1000);
        assert!(matches!(config.token(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn applies_section_options_case_insensitively() {
        let mut config = CityadsConfig::default();
        config
            .apply_options(&options(&[
                ("Cityads:Token", "abc"),
                ("CITYADS:PageSize", "250"),
                ("cityads:TimeoutSecs", "15"),
                ("Other:Token", "ignored"),
            ]))
            .unwrap();
        assert_eq!(config.token().unwrap(), "abc");
        assert_eq!(config.page_size, 250);
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut config = CityadsConfig::default();
        let err = config
            .apply_options(&options(&[("Cityads:PageSize", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(config.apply_options(&options(&[("Cityads:PageSize", "0")])).is_err());
    }

    #[test]
    fn environment_overrides_files() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CITYADS_TOKEN", "from-env"),
            ("CITYADS_LOG_LEVEL", "DEBUG"),
            ("CITYADS_LOG_DIR", "/tmp/cityads-logs"),
        ]);
        let mut config = CityadsConfig::default();
        config.apply_options(&options(&[("Cityads:Token", "from-file")])).unwrap();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.token().unwrap(), "from-env");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/cityads-logs")));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = CityadsConfig {
            token: Some("  ".into()),
            ..Default::default()
        };
        assert!(config.token().is_err());
    }

    #[test]
    fn display_hides_token() {
        let config = CityadsConfig {
            token: Some("very-secret".into()),
            ..Default::default()
        };
        assert!(!config.to_string().contains("very-secret"));
    }

    #[test]
    fn loads_json_layers_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("cityads.json"),
            r#"{"Cityads": {"Token": "file-token", "PageSize": "500"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("cityads.staging.json"),
            r#"{"Cityads": {"BaseUrl": "https://staging.example.com/json/"}}"#,
        )
        .unwrap();

        let config = CityadsConfig::load_from_dir(dir.path(), Some("staging")).unwrap();
        assert_eq!(config.token().unwrap(), "file-token");
        assert_eq!(config.page_size, 500);
        assert_eq!(config.base_url, "https://staging.example.com/json/");
    }

    #[test]
    fn missing_mode_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cityads.json"), r#"{"Cityads": {"LogLevel": "debug"}}"#).unwrap();

        let config = CityadsConfig::load_from_dir(dir.path(), Some("absent")).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn missing_files_leave_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CityadsConfig::load_from_dir(dir.path(), Some("production")).unwrap();
        assert_eq!(config, CityadsConfig::default());
    }
}
