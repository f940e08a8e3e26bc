//! Tolerant document types for the four collections.
//!
//! Stored documents are loosely shaped: identifiers may be plain strings or
//! `{"$oid": ...}` wrappers, timestamps may be ISO strings or `{"$date": ...}`
//! values, and any field can be missing. Every field here is optional and is
//! decoded leniently, so one malformed field never rejects the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Collection holding administrator accounts.
pub const ADMINS: &str = "admins";
/// Collection holding end users.
pub const USERS: &str = "users";
/// Collection holding workspaces.
pub const WORKSPACES: &str = "workspaces";
/// Collection holding full video records.
pub const LINEUPS: &str = "lineups";

/// Opaque document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    /// Extended-JSON object id: `{"$oid": "65f0..."}`.
    Object {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Text(String),
    Number(i64),
}

impl DocumentId {
    pub fn object(oid: impl Into<String>) -> Self {
        Self::Object { oid: oid.into() }
    }

    /// True when both ids render to the same key, regardless of representation.
    pub fn matches(&self, other: &DocumentId) -> bool {
        self.to_string() == other.to_string()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Object { oid } => write!(f, "{}", oid),
            DocumentId::Text(s) => write!(f, "{}", s),
            DocumentId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId::Text(s.to_string())
    }
}

/// A stored timestamp before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    /// Extended-JSON date: `{"$date": ...}`.
    Extended {
        #[serde(rename = "$date")]
        date: ExtendedDate,
    },
}

/// Payload of an extended-JSON `$date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtendedDate {
    /// Relaxed form, an ISO-8601 string.
    Iso(String),
    /// Epoch milliseconds.
    Millis(i64),
    /// Canonical form: `{"$numberLong": "<millis>"}`.
    NumberLong {
        #[serde(rename = "$numberLong")]
        millis: String,
    },
}

/// Administrator account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminDocument {
    #[serde(rename = "_id", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    /// Salted password hash.
    #[serde(default, deserialize_with = "lenient")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_super_admin: bool,
}

/// End user record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<DocumentId>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub registered_at: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub industry: Option<String>,
    /// Identifiers of the workspaces this user owns.
    #[serde(default, deserialize_with = "lenient_list")]
    pub workspaces: Vec<DocumentId>,
    /// Credit balance, passed through as stored.
    #[serde(default)]
    pub credits: Option<Value>,
}

/// Workspace with its embedded screenplay and lineup maps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<DocumentId>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub screenplays: Map<String, Value>,
    /// Lineup id -> embedded lineup sub-document.
    #[serde(default, deserialize_with = "lenient_map")]
    pub lineups: Map<String, Value>,
}

/// A video record, either a full `lineups` document or a workspace's embedded
/// lineup entry. Only the documented fields are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVideoRecord {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<DocumentId>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<RawTimestamp>,
    #[serde(rename = "createdAt", default, deserialize_with = "lenient")]
    pub created_at_camel: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub creation_date: Option<RawTimestamp>,
    #[serde(default)]
    pub clips: Option<Value>,
    #[serde(default)]
    pub audio: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub speed: Option<Value>,
    #[serde(default)]
    pub style: Option<Value>,
    #[serde(default)]
    pub xml: Option<Value>,
}

impl RawVideoRecord {
    /// Decode a record from an arbitrary value. Non-object values yield an
    /// empty record.
    pub fn from_value(value: &Value) -> Self {
        decode_or_default(value)
    }

    /// Timestamp candidates in precedence order.
    pub fn timestamp_candidates(&self) -> [Option<&RawTimestamp>; 3] {
        [
            self.created_at.as_ref(),
            self.created_at_camel.as_ref(),
            self.creation_date.as_ref(),
        ]
    }
}

impl WorkspaceDocument {
    pub fn screenplay_ids(&self) -> Vec<String> {
        self.screenplays.keys().cloned().collect()
    }

    pub fn lineup_ids(&self) -> Vec<String> {
        self.lineups.keys().cloned().collect()
    }
}

/// Decode `value` into `T`, falling back to `T::default()` when the shape
/// does not match.
pub fn decode_or_default<T: DeserializeOwned + Default>(value: &Value) -> T {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    })
}
