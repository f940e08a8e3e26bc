//! MongoDB repository implementation.
//!
//! Documents are fetched as raw BSON, converted to relaxed extended JSON and
//! decoded with the same tolerant types the local store uses, so both
//! backends see identical shapes (`{"$oid": ..}`, `{"$date": ..}`).

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::db::repository::*;
use crate::models::{
    decode_or_default, AdminDocument, DocumentId, RawVideoRecord, UserDocument,
    WorkspaceDocument, ADMINS, LINEUPS, USERS, WORKSPACES,
};

/// MongoDB-backed repository.
#[derive(Clone)]
pub struct MongoRepository {
    client: Client,
    db: Database,
}

impl MongoRepository {
    /// Connect and verify the deployment answers a `ping`.
    ///
    /// Fails instead of retrying when the server is unreachable.
    pub async fn connect(url: &str, database: &str) -> RepositoryResult<Self> {
        let options = ClientOptions::parse(url)
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("connect"))?;
        let client = Client::with_options(options)?;
        let db = client.database(database);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("ping"))?;

        log::info!("Connected to MongoDB database '{}'", database);
        Ok(Self { client, db })
    }

    /// Underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }

    async fn find_all<T: DeserializeOwned + Default>(
        &self,
        collection: &str,
        filter: Document,
    ) -> RepositoryResult<Vec<T>> {
        let cursor = self.collection(collection).find(filter).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(decode_document).collect())
    }

    async fn find_first<T: DeserializeOwned + Default>(
        &self,
        collection: &str,
        filter: Document,
    ) -> RepositoryResult<Option<T>> {
        let found = self.collection(collection).find_one(filter).await?;
        Ok(found.map(decode_document))
    }
}

fn to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

fn decode_document<T: DeserializeOwned + Default>(document: Document) -> T {
    decode_or_default(&to_json(document))
}

/// Stored ids may be either native object ids or plain strings.
fn id_candidates(key: &str) -> Vec<Bson> {
    let mut candidates = vec![Bson::String(key.to_string())];
    if let Ok(oid) = ObjectId::parse_str(key) {
        candidates.push(Bson::ObjectId(oid));
    }
    candidates
}

fn id_filter(key: &str) -> Document {
    doc! { "_id": { "$in": id_candidates(key) } }
}

#[async_trait]
impl AdminRepository for MongoRepository {
    async fn find_admin_by_email(&self, email: &str) -> RepositoryResult<Option<AdminDocument>> {
        self.find_first(ADMINS, doc! { "email": email }).await
    }

    async fn find_admin_by_id(&self, id: &DocumentId) -> RepositoryResult<Option<AdminDocument>> {
        self.find_first(ADMINS, id_filter(&id.to_string())).await
    }

    async fn insert_admin(&self, admin: &AdminDocument) -> RepositoryResult<DocumentId> {
        let document = doc! {
            "email": admin.email.clone(),
            "password": admin.password.clone(),
            "is_super_admin": admin.is_super_admin,
        };
        let result = self
            .collection(ADMINS)
            .insert_one(document)
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("insert_admin"))?;

        Ok(match result.inserted_id {
            Bson::ObjectId(oid) => DocumentId::object(oid.to_hex()),
            Bson::String(s) => DocumentId::Text(s),
            other => DocumentId::Text(other.to_string()),
        })
    }
}

#[async_trait]
impl UserRepository for MongoRepository {
    async fn list_users(&self) -> RepositoryResult<Vec<UserDocument>> {
        self.find_all(USERS, doc! {}).await
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserDocument>> {
        self.find_first(USERS, doc! { "email": email }).await
    }
}

#[async_trait]
impl WorkspaceRepository for MongoRepository {
    async fn find_workspace(&self, id: &DocumentId) -> RepositoryResult<Option<WorkspaceDocument>> {
        self.find_first(WORKSPACES, id_filter(&id.to_string())).await
    }

    async fn list_workspaces(&self) -> RepositoryResult<Vec<WorkspaceDocument>> {
        self.find_all(WORKSPACES, doc! {}).await
    }
}

#[async_trait]
impl LineupRepository for MongoRepository {
    async fn find_lineups(&self, ids: &[String]) -> RepositoryResult<HashMap<String, RawVideoRecord>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let candidates: Vec<Bson> = ids.iter().flat_map(|id| id_candidates(id)).collect();
        let records: Vec<RawVideoRecord> = self
            .find_all(LINEUPS, doc! { "_id": { "$in": candidates } })
            .await?;

        let mut found = HashMap::new();
        for record in records {
            if let Some(key) = record.id.as_ref().map(ToString::to_string) {
                found.entry(key).or_insert(record);
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl CatalogRepository for MongoRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        match self.db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => Ok(true),
            Err(e) => {
                log::warn!("MongoDB health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    async fn collection_stats(&self) -> RepositoryResult<Vec<CollectionInfo>> {
        let mut names = self.db.list_collection_names().await?;
        names.sort();

        let mut stats = Vec::with_capacity(names.len());
        for name in names {
            let count = self.collection(&name).count_documents(doc! {}).await?;
            stats.push(CollectionInfo { name, count });
        }
        Ok(stats)
    }

    async fn sample_document(&self, collection: &str) -> RepositoryResult<Option<Value>> {
        let names = self.db.list_collection_names().await?;
        if !names.iter().any(|name| name == collection) {
            return Err(RepositoryError::not_found_with_context(
                format!("Collection '{}' not found", collection),
                ErrorContext::new("sample_document").with_entity(collection),
            ));
        }
        let found = self.collection(collection).find_one(doc! {}).await?;
        Ok(found.map(to_json))
    }
}
