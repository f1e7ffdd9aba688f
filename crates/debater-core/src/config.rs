use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::api::RequestPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const BASE_URL_ENV: &str = "DEBATER_BASE_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_timeout_secs: Option<u64>,
}

/// Backend URL precedence: command line, then environment, then the config
/// file, then the default. Blank values count as unset.
pub fn resolve_base_url(cli: Option<String>, env: Option<String>, file: &Config) -> String {
    [cli, env, file.base_url.clone()]
        .into_iter()
        .flatten()
        .map(|url| url.trim().to_string())
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Zero counts as unset.
fn bound(secs: Option<u64>, default: Duration) -> Duration {
    secs.filter(|&s| s > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn policy(&self) -> RequestPolicy {
        let defaults = RequestPolicy::default();
        RequestPolicy {
            generate_timeout: bound(self.generate_timeout_secs, defaults.generate_timeout),
            upload_timeout: bound(self.upload_timeout_secs, defaults.upload_timeout),
            list_timeout: bound(self.list_timeout_secs, defaults.list_timeout),
            database_timeout: bound(self.database_timeout_secs, defaults.database_timeout),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("debater").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.policy(), RequestPolicy::default());
        assert_eq!(config.policy().generate_timeout, Duration::from_secs(600));
        assert_eq!(config.policy().upload_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_url: Some("http://debate.local:8080".to_string()),
            generate_timeout_secs: Some(90),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.policy().generate_timeout, Duration::from_secs(90));
        assert_eq!(loaded.policy().list_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"upload_timeout_secs": 5}"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.policy().upload_timeout, Duration::from_secs(5));
        assert!(loaded.base_url.is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_bound_means_default() {
        let config = Config {
            generate_timeout_secs: Some(0),
            database_timeout_secs: Some(0),
            upload_timeout_secs: Some(45),
            ..Config::default()
        };
        let policy = config.policy();
        assert_eq!(policy.generate_timeout, Duration::from_secs(600));
        assert_eq!(policy.database_timeout, Duration::from_secs(180));
        assert_eq!(policy.upload_timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_base_url_precedence() {
        let file = Config {
            base_url: Some("http://from-file:5000".to_string()),
            ..Config::default()
        };
        let empty = Config::default();
        let s = |v: &str| Some(v.to_string());

        let cases = [
            (s("http://cli:1"), s("http://env:2"), &file, "http://cli:1"),
            (None, s("http://env:2"), &file, "http://env:2"),
            (None, None, &file, "http://from-file:5000"),
            (None, None, &empty, DEFAULT_BASE_URL),
            (None, s("   "), &file, "http://from-file:5000"),
            (None, s(""), &empty, DEFAULT_BASE_URL),
            (s(" "), s("http://env:2"), &file, "http://env:2"),
            (s("http://cli:1"), None, &empty, "http://cli:1"),
        ];
        for (cli, env, config, expected) in cases {
            assert_eq!(
                resolve_base_url(cli.clone(), env.clone(), config),
                expected,
                "cli={cli:?} env={env:?}"
            );
        }
    }
}
