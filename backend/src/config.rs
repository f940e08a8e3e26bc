//! Application configuration.
//!
//! Loaded from `analytics.toml` (or the file named by `ANALYTICS_CONFIG`),
//! with every field defaulted, then overridden from the environment:
//!
//! | Variable                      | Field                               |
//! |-------------------------------|-------------------------------------|
//! | `HOST`                        | `server.host`                       |
//! | `PORT`                        | `server.port`                       |
//! | `REPOSITORY_TYPE`             | `repository.type`                   |
//! | `LOCAL_SEED_PATH`             | `repository.seed_path`              |
//! | `MONGODB_URL`                 | `repository.mongodb_url`            |
//! | `MONGODB_DATABASE`            | `repository.database`               |
//! | `JWT_SECRET_KEY`              | `auth.secret_key`                   |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | `auth.access_token_expire_minutes`  |
//! | `PROTECT_REPORTS`             | `auth.protect_reports`              |

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::password::DEFAULT_ITERATIONS;
use crate::db::RepositorySettings;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "ANALYTICS_CONFIG";

const SEARCH_PATHS: [&str; 3] = ["analytics.toml", "backend/analytics.toml", "../analytics.toml"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub repository: RepositorySettings,
    pub auth: AuthConfig,
    pub reports: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Generated per process when left empty.
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    /// Require a valid admin token on `/users*` and `/analytics/*`.
    pub protect_reports: bool,
    /// PBKDF2 iterations for newly created admin passwords.
    pub password_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            access_token_expire_minutes: 30,
            protect_reports: false,
            password_iterations: DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub default_trend_days: u32,
    pub max_trend_days: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_trend_days: 30,
            max_trend_days: 3650,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the config file (explicit or searched), apply environment
    /// overrides and fill in a signing secret if none is configured.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::locate() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::info!("No configuration file found, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;

        if config.auth.secret_key.is_empty() {
            log::warn!("JWT_SECRET_KEY is not set; issued tokens will not survive a restart");
            config.auth.secret_key = format!(
                "{}{}",
                Uuid::new_v4().simple(),
                Uuid::new_v4().simple()
            );
        }
        Ok(config)
    }

    fn locate() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(explicit));
        }
        SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_value("PORT", &port)?;
        }
        if let Some(repo_type) = lookup("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        if let Some(seed) = lookup("LOCAL_SEED_PATH") {
            self.repository.seed_path = Some(PathBuf::from(seed));
        }
        if let Some(url) = lookup("MONGODB_URL") {
            self.repository.mongodb_url = Some(url);
        }
        if let Some(database) = lookup("MONGODB_DATABASE") {
            self.repository.database = database;
        }
        if let Some(secret) = lookup("JWT_SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        if let Some(minutes) = lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.auth.access_token_expire_minutes =
                parse_value("ACCESS_TOKEN_EXPIRE_MINUTES", &minutes)?;
        }
        if let Some(protect) = lookup("PROTECT_REPORTS") {
            self.auth.protect_reports = parse_flag("PROTECT_REPORTS", &protect)?;
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.repository.database, "dev-boaidb");
        assert_eq!(config.auth.access_token_expire_minutes, 30);
        assert!(!config.auth.protect_reports);
        assert_eq!(config.reports.default_trend_days, 30);
        assert_eq!(config.reports.max_trend_days, 3650);
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::from_toml_str(
            r#"
[server]
port = 9000

[auth]
protect_reports = true

[reports]
max_trend_days = 90
"#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(config.auth.protect_reports);
        assert_eq!(config.reports.max_trend_days, 90);
        assert_eq!(config.reports.default_trend_days, 30);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("PORT", "8080"),
                ("REPOSITORY_TYPE", "mongo"),
                ("MONGODB_URL", "mongodb://db:27017"),
                ("JWT_SECRET_KEY", "abc"),
                ("PROTECT_REPORTS", "yes"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.repository.repo_type, "mongo");
        assert_eq!(config.repository.mongodb_url.as_deref(), Some("mongodb://db:27017"));
        assert_eq!(config.auth.secret_key, "abc");
        assert!(config.auth.protect_reports);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("PORT", "eighty")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value 'eighty' for PORT");

        assert!(config
            .apply_overrides(lookup_from(&[("PROTECT_REPORTS", "maybe")]))
            .is_err());
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.toml");
        std::fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            AppConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
