//! Repository factory for dependency injection.
//!
//! The repository is constructed once at process start from
//! [`RepositorySettings`] and handed to the HTTP layer as an
//! `Arc<dyn FullRepository>`. Initialization failures abort startup.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositorySettings;
use super::repositories::LocalRepository;
#[cfg(feature = "mongo-repo")]
use super::repositories::MongoRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
    /// MongoDB document store
    Mongo,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("local", "memory", "mongo", "mongodb").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Mongo => write!(f, "mongo"),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use lineup_analytics::db::{RepositoryFactory, RepositorySettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repo = RepositoryFactory::create(&RepositorySettings::default()).await?;
///     println!("backend: {}", repo.backend_name());
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create the repository selected by `settings`.
    pub async fn create(settings: &RepositorySettings) -> RepositoryResult<Arc<dyn FullRepository>> {
        match settings.repository_type()? {
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    let local = Self::create_local(settings.seed_path.as_deref())?;
                    Ok(local as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Local repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Mongo => {
                #[cfg(feature = "mongo-repo")]
                {
                    let mongo =
                        Self::create_mongo(settings.mongodb_url()?, &settings.database).await?;
                    Ok(mongo as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "mongo-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Mongo repository feature not enabled",
                    ))
                }
            }
        }
    }

    /// Create an in-memory local repository, optionally seeded from a snapshot.
    pub fn create_local(seed_path: Option<&Path>) -> RepositoryResult<Arc<LocalRepository>> {
        let repo = match seed_path {
            Some(path) => LocalRepository::from_snapshot_file(path)?,
            None => LocalRepository::new(),
        };
        Ok(Arc::new(repo))
    }

    /// Connect to MongoDB.
    #[cfg(feature = "mongo-repo")]
    pub async fn create_mongo(url: &str, database: &str) -> RepositoryResult<Arc<MongoRepository>> {
        let repo = MongoRepository::connect(url, database).await?;
        Ok(Arc::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::CatalogRepository;

    #[test]
    fn test_repository_type_parsing() {
        assert_eq!("local".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert_eq!(" MongoDB ".parse::<RepositoryType>(), Ok(RepositoryType::Mongo));
        assert!("postgres".parse::<RepositoryType>().is_err());
        assert_eq!(RepositoryType::Mongo.to_string(), "mongo");
    }

    #[tokio::test]
    async fn test_create_local_default() {
        let repo = RepositoryFactory::create(&RepositorySettings::default())
            .await
            .unwrap();
        assert_eq!(repo.backend_name(), "local");
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_seed_file_fails() {
        let settings = RepositorySettings {
            seed_path: Some("/definitely/not/here.json".into()),
            ..Default::default()
        };
        let result = RepositoryFactory::create(&settings).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }

    #[cfg(not(feature = "mongo-repo"))]
    #[tokio::test]
    async fn test_mongo_without_feature() {
        let settings = RepositorySettings {
            repo_type: "mongo".into(),
            ..Default::default()
        };
        assert!(RepositoryFactory::create(&settings).await.is_err());
    }
}
