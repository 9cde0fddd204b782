//! Configuration file parsing and management.
//!
//! The CLI keeps a small YAML file (by default `$HOME/.urlquery-cli.yaml`)
//! with four recognized keys. Environment variables with the `URLQUERY_`
//! prefix override the file, and command-line flags override both.

use crate::error::UrlqueryError;
use crate::types::Access;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the default configuration file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".urlquery-cli.yaml";

/// Configuration loaded from the YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// API key sent as `x-apikey`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,

    /// Directory where downloaded files are written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Default user agent for submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub useragent: Option<String>,

    /// Default access level for submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
}

impl FileConfig {
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::ApiKey => self.apikey.as_deref(),
            ConfigKey::Output => self.output.as_deref(),
            ConfigKey::UserAgent => self.useragent.as_deref(),
            ConfigKey::Access => self.access.as_deref(),
        }
    }

    fn slot(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::ApiKey => &mut self.apikey,
            ConfigKey::Output => &mut self.output,
            ConfigKey::UserAgent => &mut self.useragent,
            ConfigKey::Access => &mut self.access,
        }
    }
}

/// The keys `config set` and `config unset` accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiKey,
    Output,
    UserAgent,
    Access,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::ApiKey,
        ConfigKey::Output,
        ConfigKey::UserAgent,
        ConfigKey::Access,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "apikey",
            ConfigKey::Output => "output",
            ConfigKey::UserAgent => "useragent",
            ConfigKey::Access => "access",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = UrlqueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ConfigKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| {
                let valid: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
                UrlqueryError::config(format!(
                    "Unknown config key '{}'. Valid keys: {}",
                    s.trim(),
                    valid.join(", ")
                ))
            })
    }
}

/// Reads and writes one configuration file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manage the configuration file at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Manage `$HOME/.urlquery-cli.yaml`.
    ///
    /// # Errors
    ///
    /// Fails when `HOME` is not set.
    pub fn with_default_path() -> Result<Self, UrlqueryError> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration file.
    ///
    /// A missing file is not an error and yields an empty configuration.
    pub fn load(&self) -> Result<FileConfig, UrlqueryError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file");
            return Ok(FileConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            UrlqueryError::file_error(
                self.path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        if content.trim().is_empty() {
            return Ok(FileConfig::default());
        }

        let config: FileConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write `config` back to disk, replacing the previous file.
    pub fn save(&self, config: &FileConfig) -> Result<(), UrlqueryError> {
        let content = serde_yaml::to_string(config)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    UrlqueryError::file_error(parent.to_string_lossy(), e.to_string())
                })?;
            }
        }

        fs::write(&self.path, content).map_err(|e| {
            UrlqueryError::file_error(
                self.path.to_string_lossy(),
                format!("Failed to write configuration file: {}", e),
            )
        })
    }

    /// Set `key` to `value` and persist the file.
    ///
    /// `access` must be one of `public`, `restricted`, `private`.
    pub fn set(&self, key: ConfigKey, value: &str) -> Result<FileConfig, UrlqueryError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(UrlqueryError::config(format!(
                "Value for '{}' cannot be empty",
                key
            )));
        }

        let value = match key {
            ConfigKey::Access => Access::parse(value)
                .ok_or_else(|| {
                    UrlqueryError::config(format!(
                        "Invalid access '{}'. Valid values: public, restricted, private",
                        value
                    ))
                })?
                .as_str()
                .to_string(),
            _ => value.to_string(),
        };

        let mut config = self.load()?;
        *config.slot(key) = Some(value);
        self.save(&config)?;
        Ok(config)
    }

    /// Remove `key` from the file.
    ///
    /// Returns `false`, and leaves the file untouched, when the key was not set.
    pub fn unset(&self, key: ConfigKey) -> Result<bool, UrlqueryError> {
        let mut config = self.load()?;
        if config.slot(key).take().is_none() {
            return Ok(false);
        }
        self.save(&config)?;
        Ok(true)
    }

    /// The keys that are set, in display order.
    pub fn entries(&self) -> Result<Vec<(ConfigKey, String)>, UrlqueryError> {
        let config = self.load()?;
        Ok(ConfigKey::ALL
            .iter()
            .filter_map(|k| config.get(*k).map(|v| (*k, v.to_string())))
            .collect())
    }
}

/// `$HOME/.urlquery-cli.yaml`.
pub fn default_config_path() -> Result<PathBuf, UrlqueryError> {
    env::var_os("HOME")
        .map(|home| Path::new(&home).join(CONFIG_FILE_NAME))
        .ok_or_else(|| UrlqueryError::config("HOME is not set; pass --config explicitly"))
}

/// Hide all but the last four characters of a secret.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

/// Settings taken from `URLQUERY_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub apikey: Option<String>,
    pub output: Option<String>,
    pub useragent: Option<String>,
    pub access: Option<String>,
    pub base_url: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from environment variables.
///
/// Blank values are ignored. An invalid `URLQUERY_ACCESS` is logged and
/// ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|name| env::var(name).ok())
}

fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| {
        let value = lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if value.is_some() {
            tracing::info!("using {}", name);
        }
        value
    };

    let access = read("URLQUERY_ACCESS").and_then(|value| match Access::parse(&value) {
        Some(access) => Some(access.as_str().to_string()),
        None => {
            tracing::warn!("ignoring invalid URLQUERY_ACCESS='{}'", value);
            None
        }
    });

    EnvConfig {
        apikey: read("URLQUERY_APIKEY"),
        output: read("URLQUERY_OUTPUT"),
        useragent: read("URLQUERY_USERAGENT"),
        access,
        base_url: read("URLQUERY_BASE_URL"),
        config: read("URLQUERY_CONFIG"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn manager_in(dir: &TempDir) -> ConfigManager {
        ConfigManager::new(dir.path().join("urlquery-cli.yaml"))
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
apikey: secret-key
output: /tmp/reports
access: private
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigManager::new(temp_file.path()).load().unwrap();
        assert_eq!(config.apikey.as_deref(), Some("secret-key"));
        assert_eq!(config.output.as_deref(), Some("/tmp/reports"));
        assert_eq!(config.useragent, None);
        assert_eq!(config.access.as_deref(), Some("private"));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = manager_in(&dir).load().unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_malformed_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"apikey: [unclosed").unwrap();
        temp_file.flush().unwrap();

        let result = ConfigManager::new(temp_file.path()).load();
        assert!(matches!(result, Err(UrlqueryError::ConfigError { .. })));
    }

    #[test]
    fn test_set_and_unset_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        manager.set(ConfigKey::ApiKey, "abc123").unwrap();
        manager.set(ConfigKey::Access, " restricted ").unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.apikey.as_deref(), Some("abc123"));
        assert_eq!(config.access.as_deref(), Some("restricted"));

        assert!(manager.unset(ConfigKey::ApiKey).unwrap());
        assert!(!manager.unset(ConfigKey::ApiKey).unwrap());
        assert_eq!(manager.load().unwrap().apikey, None);
    }

    #[test]
    fn test_set_rejects_invalid_access() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        let result = manager.set(ConfigKey::Access, "everyone");
        assert!(matches!(result, Err(UrlqueryError::ConfigError { .. })));
        assert!(!manager.path().exists());
    }

    #[test]
    fn test_config_key_parsing() {
        assert_eq!("apikey".parse::<ConfigKey>().unwrap(), ConfigKey::ApiKey);
        assert_eq!(" Output ".parse::<ConfigKey>().unwrap(), ConfigKey::Output);
        assert_eq!("useragent".parse::<ConfigKey>().unwrap(), ConfigKey::UserAgent);

        let err = "colour".parse::<ConfigKey>().unwrap_err();
        assert!(err.to_string().contains("Unknown config key 'colour'"));
    }

    #[test]
    fn test_entries_in_display_order() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        manager.set(ConfigKey::Access, "public").unwrap();
        manager.set(ConfigKey::ApiKey, "k").unwrap();

        let keys: Vec<ConfigKey> = manager.entries().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![ConfigKey::ApiKey, ConfigKey::Access]);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefgh1234"), "********1234");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = [
            ("URLQUERY_APIKEY", "env-key"),
            ("URLQUERY_OUTPUT", "  "),
            ("URLQUERY_ACCESS", "nobody"),
            ("URLQUERY_BASE_URL", "http://localhost:8080"),
        ]
        .into_iter()
        .collect();

        let env_config = load_env_config_from(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(env_config.apikey.as_deref(), Some("env-key"));
        assert_eq!(env_config.output, None);
        assert_eq!(env_config.access, None);
        assert_eq!(env_config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(env_config.config, None);
    }
}
