//! Collection introspection for administrators.

use serde_json::{Map, Value};

use super::ServiceResult;
use crate::db::{CollectionInfo, FullRepository};

/// Every collection with its document count.
pub async fn list_collections<R>(repo: &R) -> ServiceResult<Vec<CollectionInfo>>
where
    R: FullRepository + ?Sized,
{
    Ok(repo.collection_stats().await?)
}

/// Field name -> type name of one sample document. Empty for an empty
/// collection; unknown collections fail with a repository `NotFound`.
pub async fn collection_schema<R>(repo: &R, collection: &str) -> ServiceResult<Map<String, Value>>
where
    R: FullRepository + ?Sized,
{
    let sample = repo.sample_document(collection).await?;
    Ok(match sample {
        Some(Value::Object(fields)) => fields
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(type_name(value).to_string())))
            .collect(),
        _ => Map::new(),
    })
}

/// Type name of a stored value, recognising extended-JSON wrappers.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(fields) if fields.contains_key("$oid") => "objectId",
        Value::Object(fields) if fields.contains_key("$date") => "date",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::services::ServiceError;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&json!({"$oid": "x"})), "objectId");
        assert_eq!(type_name(&json!({"$date": 0})), "date");
        assert_eq!(type_name(&json!(1.5)), "float");
        assert_eq!(type_name(&json!(3)), "integer");
        assert_eq!(type_name(&json!({"a": 1})), "object");
    }

    #[tokio::test]
    async fn test_schema_of_sample() {
        let repo = LocalRepository::new();
        repo.insert_document(
            "users",
            json!({"email": "a@b.c", "credits": 4, "workspaces": [], "registered_at": {"$date": "2024-01-01T00:00:00Z"}}),
        );

        let schema = collection_schema(&repo, "users").await.unwrap();
        assert_eq!(schema["_id"], "objectId");
        assert_eq!(schema["email"], "string");
        assert_eq!(schema["credits"], "integer");
        assert_eq!(schema["workspaces"], "array");
        assert_eq!(schema["registered_at"], "date");

        assert!(collection_schema(&repo, "admins").await.unwrap().is_empty());
        let err = collection_schema(&repo, "nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(ref e) if e.is_not_found()));
    }
}
