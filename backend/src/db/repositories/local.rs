//! In-memory local repository implementation.
//!
//! A tiny document store: each collection is a list of raw JSON documents,
//! decoded on read with the same tolerant types the MongoDB backend uses.
//! It can be seeded from (and written back to) a JSON snapshot file of the
//! form `{"users": [...], "workspaces": [...], ...}`, which makes it suitable
//! for unit tests and local development.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::repository::*;
use crate::models::{
    AdminDocument, DocumentId, RawVideoRecord, UserDocument, WorkspaceDocument, ADMINS, LINEUPS,
    USERS, WORKSPACES,
};

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same underlying data.
///
/// # Example
/// ```
/// use lineup_analytics::db::repositories::LocalRepository;
/// use serde_json::json;
///
/// let repo = LocalRepository::new();
/// repo.insert_document("users", json!({"email": "ana@example.com"}));
/// assert_eq!(repo.document_count("users"), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    collections: BTreeMap<String, Vec<Value>>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        let collections = [ADMINS, USERS, WORKSPACES, LINEUPS]
            .into_iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        Self {
            collections,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new repository with the four standard collections, all empty.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Build a repository from a snapshot object mapping collection names to
    /// arrays of documents.
    pub fn from_snapshot(snapshot: Value) -> RepositoryResult<Self> {
        let Value::Object(collections) = snapshot else {
            return Err(RepositoryError::validation(
                "Snapshot must be a JSON object of collections",
            ));
        };

        let repo = Self::new();
        for (name, documents) in collections {
            let Value::Array(documents) = documents else {
                return Err(RepositoryError::validation(format!(
                    "Snapshot collection '{}' must be an array",
                    name
                )));
            };
            for document in documents {
                repo.insert_document(&name, document);
            }
        }
        Ok(repo)
    }

    /// Load a snapshot file.
    pub fn from_snapshot_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        let snapshot: Value = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to parse snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        let repo = Self::from_snapshot(snapshot)?;
        log::info!(
            "Loaded local snapshot from {} ({} documents)",
            path.display(),
            repo.total_documents()
        );
        Ok(repo)
    }

    /// Export every collection as a snapshot object.
    pub fn snapshot(&self) -> Value {
        let data = self.data.read();
        let collections: Map<String, Value> = data
            .collections
            .iter()
            .map(|(name, docs)| (name.clone(), Value::Array(docs.clone())))
            .collect();
        Value::Object(collections)
    }

    /// Write the current contents to a snapshot file.
    pub fn write_snapshot_file<P: AsRef<Path>>(&self, path: P) -> RepositoryResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, content).map_err(|e| {
            RepositoryError::internal(format!(
                "Failed to write snapshot {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Add a document to a collection, creating the collection if needed.
    ///
    /// Object documents without an `_id` get a generated object id. Returns the
    /// document's id, or `None` when the document carries no usable id.
    pub fn insert_document(&self, collection: &str, mut document: Value) -> Option<DocumentId> {
        let id = match document.as_object_mut() {
            Some(fields) => match fields.get("_id") {
                Some(existing) => serde_json::from_value(existing.clone()).ok(),
                None => {
                    let id = generate_object_id();
                    if let Ok(encoded) = serde_json::to_value(&id) {
                        fields.insert("_id".to_string(), encoded);
                    }
                    Some(id)
                }
            },
            None => None,
        };

        let mut data = self.data.write();
        data.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        id
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Remove every document, keeping the standard (empty) collections.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of documents in one collection.
    pub fn document_count(&self, collection: &str) -> usize {
        self.data
            .read()
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn total_documents(&self) -> usize {
        self.data.read().collections.values().map(Vec::len).sum()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }

    /// Decode every document of a collection.
    fn decode_all<T: DeserializeOwned + Default>(&self, collection: &str) -> Vec<T> {
        let data = self.data.read();
        data.collections
            .get(collection)
            .map(|docs| docs.iter().map(crate::models::decode_or_default).collect())
            .unwrap_or_default()
    }

    fn find_first<T, F>(&self, collection: &str, predicate: F) -> Option<T>
    where
        T: DeserializeOwned + Default,
        F: Fn(&T) -> bool,
    {
        self.decode_all::<T>(collection).into_iter().find(|doc| predicate(doc))
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_object_id() -> DocumentId {
    let hex = Uuid::new_v4().simple().to_string();
    DocumentId::object(&hex[..24])
}

#[async_trait]
impl AdminRepository for LocalRepository {
    async fn find_admin_by_email(&self, email: &str) -> RepositoryResult<Option<AdminDocument>> {
        self.check_health("find_admin_by_email")?;
        Ok(self.find_first(ADMINS, |admin: &AdminDocument| {
            admin.email.as_deref() == Some(email)
        }))
    }

    async fn find_admin_by_id(&self, id: &DocumentId) -> RepositoryResult<Option<AdminDocument>> {
        self.check_health("find_admin_by_id")?;
        Ok(self.find_first(ADMINS, |admin: &AdminDocument| {
            admin.id.as_ref().is_some_and(|stored| stored.matches(id))
        }))
    }

    async fn insert_admin(&self, admin: &AdminDocument) -> RepositoryResult<DocumentId> {
        self.check_health("insert_admin")?;
        let id = generate_object_id();
        let stored = AdminDocument {
            id: Some(id.clone()),
            ..admin.clone()
        };
        let document = serde_json::to_value(&stored)?;
        self.insert_document(ADMINS, document);
        Ok(id)
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn list_users(&self) -> RepositoryResult<Vec<UserDocument>> {
        self.check_health("list_users")?;
        Ok(self.decode_all(USERS))
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserDocument>> {
        self.check_health("find_user_by_email")?;
        Ok(self.find_first(USERS, |user: &UserDocument| {
            user.email.as_deref() == Some(email)
        }))
    }
}

#[async_trait]
impl WorkspaceRepository for LocalRepository {
    async fn find_workspace(&self, id: &DocumentId) -> RepositoryResult<Option<WorkspaceDocument>> {
        self.check_health("find_workspace")?;
        Ok(self.find_first(WORKSPACES, |ws: &WorkspaceDocument| {
            ws.id.as_ref().is_some_and(|stored| stored.matches(id))
        }))
    }

    async fn list_workspaces(&self) -> RepositoryResult<Vec<WorkspaceDocument>> {
        self.check_health("list_workspaces")?;
        Ok(self.decode_all(WORKSPACES))
    }
}

#[async_trait]
impl LineupRepository for LocalRepository {
    async fn find_lineups(&self, ids: &[String]) -> RepositoryResult<HashMap<String, RawVideoRecord>> {
        self.check_health("find_lineups")?;
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut found = HashMap::new();
        for record in self.decode_all::<RawVideoRecord>(LINEUPS) {
            let Some(key) = record.id.as_ref().map(ToString::to_string) else {
                continue;
            };
            if wanted.contains(key.as_str()) {
                found.entry(key).or_insert(record);
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn collection_stats(&self) -> RepositoryResult<Vec<CollectionInfo>> {
        self.check_health("collection_stats")?;
        let data = self.data.read();
        Ok(data
            .collections
            .iter()
            .map(|(name, docs)| CollectionInfo {
                name: name.clone(),
                count: docs.len() as u64,
            })
            .collect())
    }

    async fn sample_document(&self, collection: &str) -> RepositoryResult<Option<Value>> {
        self.check_health("sample_document")?;
        let data = self.data.read();
        let docs = data.collections.get(collection).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Collection '{}' not found", collection),
                ErrorContext::new("sample_document").with_entity(collection),
            )
        })?;
        Ok(docs.first().cloned())
    }
}
