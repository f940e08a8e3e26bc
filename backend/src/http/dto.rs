//! Request and response bodies specific to the HTTP layer.
//!
//! Report payloads are the service types themselves and are re-exported here.

use serde::{Deserialize, Serialize};

pub use crate::auth::AccessToken;
pub use crate::db::CollectionInfo;
pub use crate::services::events::UserVideo;
pub use crate::services::users::{UserCredits, UserSummary, UserWorkspaces};
pub use crate::services::{VideoTrend, WorkspaceUsage};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub database: String,
}

/// `application/x-www-form-urlencoded` login body. `username` carries the
/// admin's email.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_super_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Query parameters for `/analytics/video-trend`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoTrendQuery {
    pub user_email: String,
    pub days: Option<i64>,
}

/// Query parameters for `/analytics/workspace-usage`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceUsageQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_granularity")]
    pub granularity: String,
}

fn default_granularity() -> String {
    "daily".to_string()
}
