//! Service layer for report computation.
//!
//! Services sit between the HTTP handlers and the repository traits. They
//! take `&R where R: FullRepository + ?Sized`, so they accept both a concrete
//! repository and the `Arc<dyn FullRepository>` held by the server state.
//!
//! Data flows repository -> [`events`] -> [`models::time`](crate::models::time)
//! -> [`bucketing`] -> [`video_trend`] / [`workspace_usage`].

pub mod bucketing;
pub mod collections;
pub mod events;
pub mod users;
pub mod video_trend;
pub mod workspace_usage;

use crate::db::RepositoryError;

pub use bucketing::{aggregate, Granularity, HourlyCounts, TrendPoint, UsageStatistics};
pub use collections::{collection_schema, list_collections};
pub use events::{extract_user_events, extract_user_videos, UserVideo, VideoEvent};
pub use users::{list_users, user_credits, user_workspaces};
pub use video_trend::{video_trend, VideoTrend};
pub use workspace_usage::{workspace_usage, UsageQuery, WorkspaceUsage};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by report services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A user or other requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A request parameter was rejected before any work was done.
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
