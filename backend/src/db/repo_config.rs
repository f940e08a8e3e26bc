//! Repository configuration.
//!
//! The `[repository]` table of the application config file:
//!
//! ```toml
//! [repository]
//! type = "local"
//! seed_path = "seed.json"
//! mongodb_url = "mongodb://localhost:27017"
//! database = "dev-boaidb"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::{RepositoryError, RepositoryResult};

pub const DEFAULT_DATABASE: &str = "dev-boaidb";

/// Repository settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
    /// JSON snapshot loaded into the local repository at startup.
    pub seed_path: Option<PathBuf>,
    pub mongodb_url: Option<String>,
    pub database: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: "local".to_string(),
            seed_path: None,
            mongodb_url: None,
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl RepositorySettings {
    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> RepositoryResult<RepositoryType> {
        RepositoryType::from_str(&self.repo_type).map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })
    }

    /// Connection string, required for the mongo backend.
    pub fn mongodb_url(&self) -> RepositoryResult<&str> {
        match self.mongodb_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(RepositoryError::configuration(
                "Mongo repository requires 'repository.mongodb_url' (MONGODB_URL)",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let settings: RepositorySettings = toml::from_str(
            r#"
type = "local"
seed_path = "data/seed.json"
"#,
        )
        .unwrap();
        assert_eq!(settings.repository_type().unwrap(), RepositoryType::Local);
        assert_eq!(settings.seed_path, Some(PathBuf::from("data/seed.json")));
        assert_eq!(settings.database, DEFAULT_DATABASE);
    }

    #[test]
    fn test_parse_mongo_config() {
        let settings: RepositorySettings = toml::from_str(
            r#"
type = "mongodb"
mongodb_url = "mongodb://localhost:27017"
database = "analytics"
"#,
        )
        .unwrap();
        assert_eq!(settings.repository_type().unwrap(), RepositoryType::Mongo);
        assert_eq!(settings.mongodb_url().unwrap(), "mongodb://localhost:27017");
    }

    #[test]
    fn test_mongo_requires_url() {
        let settings = RepositorySettings {
            repo_type: "mongo".into(),
            mongodb_url: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            settings.mongodb_url(),
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_invalid_type() {
        let settings = RepositorySettings {
            repo_type: "postgres".into(),
            ..Default::default()
        };
        assert!(settings.repository_type().is_err());
    }
}
