//! Store-level operations: health and collection introspection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RepositoryResult;

/// Name and document count of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub count: u64,
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store answered
    /// - `Ok(false)` if it is known to be unavailable
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Human-readable backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Every collection with its document count, sorted by name.
    async fn collection_stats(&self) -> RepositoryResult<Vec<CollectionInfo>>;

    /// One document from `collection`, as stored.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the collection does not exist
    /// * `Ok(None)` - If it exists but is empty
    async fn sample_document(&self, collection: &str) -> RepositoryResult<Option<Value>>;
}
