//! Event extraction: walks a user's workspaces and resolves every embedded
//! lineup entry to its full video record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{normalize_creation_time, RawVideoRecord};

/// Placeholder for missing user location or industry.
pub const UNKNOWN: &str = "Unknown";

/// A resolved video with the owning user's metadata attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserVideo {
    pub video_id: String,
    pub workspace_id: String,
    /// Normalized creation instant, `None` when no candidate field parses.
    pub creation_date: Option<NaiveDateTime>,
    pub user_location: String,
    pub user_industry: String,
    pub clips: Value,
    pub audio: Value,
    pub output: Option<Value>,
    pub speed: Option<Value>,
    pub style: Option<Value>,
    pub xml: Option<Value>,
}

/// A timestamped video creation, the input to every trend computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEvent {
    pub video_id: String,
    pub workspace_id: String,
    pub created_at: NaiveDateTime,
}

/// Resolve every video of the user with `email`.
///
/// Workspaces are visited in the user's order and lineups in each
/// workspace's map order. Dangling workspace or lineup references are
/// skipped. Fails with [`ServiceError::NotFound`] when the user is unknown.
pub async fn extract_user_videos<R>(repo: &R, email: &str) -> ServiceResult<Vec<UserVideo>>
where
    R: FullRepository + ?Sized,
{
    let user = repo
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))?;

    let location = user.location.clone().unwrap_or_else(|| UNKNOWN.to_string());
    let industry = user.industry.clone().unwrap_or_else(|| UNKNOWN.to_string());

    let mut videos = Vec::new();
    for workspace_id in &user.workspaces {
        let Some(workspace) = repo.find_workspace(workspace_id).await? else {
            log::warn!("User {} references missing workspace {}", email, workspace_id);
            continue;
        };

        let mut records = repo.find_lineups(&workspace.lineup_ids()).await?;
        for (lineup_id, entry) in &workspace.lineups {
            let Some(record) = records.remove(lineup_id) else {
                log::warn!(
                    "Workspace {} references missing lineup {}",
                    workspace_id,
                    lineup_id
                );
                continue;
            };
            let embedded = RawVideoRecord::from_value(entry);
            let creation_date = normalize_creation_time(&record, Some(&embedded));

            videos.push(UserVideo {
                video_id: record
                    .id
                    .as_ref()
                    .map_or_else(|| lineup_id.clone(), ToString::to_string),
                workspace_id: workspace_id.to_string(),
                creation_date,
                user_location: location.clone(),
                user_industry: industry.clone(),
                clips: record.clips.unwrap_or_else(|| json!([])),
                audio: record.audio.unwrap_or_else(|| json!({})),
                output: record.output,
                speed: record.speed,
                style: record.style,
                xml: record.xml,
            });
        }
    }

    log::info!("Retrieved {} videos for user {}", videos.len(), email);
    Ok(videos)
}

/// Convert resolved videos into events, dropping those without a creation
/// instant. Returns the events and the number of dropped videos.
pub fn to_events(videos: &[UserVideo]) -> (Vec<VideoEvent>, usize) {
    let events: Vec<VideoEvent> = videos
        .iter()
        .filter_map(|video| {
            let created_at = video.creation_date?;
            Some(VideoEvent {
                video_id: video.video_id.clone(),
                workspace_id: video.workspace_id.clone(),
                created_at,
            })
        })
        .collect();
    let skipped = videos.len() - events.len();
    (events, skipped)
}

/// The user's video events. Videos without a parseable creation instant are
/// counted and logged, never reported as errors.
pub async fn extract_user_events<R>(repo: &R, email: &str) -> ServiceResult<Vec<VideoEvent>>
where
    R: FullRepository + ?Sized,
{
    let videos = extract_user_videos(repo, email).await?;
    let (events, skipped) = to_events(&videos);
    if skipped > 0 {
        log::warn!(
            "Skipped {} videos without a creation timestamp for user {}",
            skipped,
            email
        );
    }
    Ok(events)
}
