//! Workspace and video-record lookups.

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::RepositoryResult;
use crate::models::{DocumentId, RawVideoRecord, WorkspaceDocument};

/// Repository trait for the `workspaces` collection.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Fetch one workspace. A dangling reference yields `Ok(None)`.
    async fn find_workspace(&self, id: &DocumentId) -> RepositoryResult<Option<WorkspaceDocument>>;

    /// List every workspace with its embedded lineup map.
    async fn list_workspaces(&self) -> RepositoryResult<Vec<WorkspaceDocument>>;
}

/// Repository trait for the `lineups` collection of full video records.
#[async_trait]
pub trait LineupRepository: Send + Sync {
    /// Fetch several video records in one round trip.
    ///
    /// The result is keyed by the rendered document id. Ids without a
    /// matching record are absent from the map.
    async fn find_lineups(&self, ids: &[String]) -> RepositoryResult<HashMap<String, RawVideoRecord>>;
}
