//! User-facing report queries.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ServiceError, ServiceResult};
use crate::db::FullRepository;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub email: String,
    pub username: String,
    pub signup_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceContent {
    pub workspace_id: String,
    pub name: Option<String>,
    pub screenplay_ids: Vec<String>,
    pub lineup_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWorkspaces {
    pub user_email: String,
    pub workspaces: Vec<WorkspaceContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCredits {
    pub user_email: String,
    pub credits: Value,
}

/// Every registered user.
pub async fn list_users<R>(repo: &R) -> ServiceResult<Vec<UserSummary>>
where
    R: FullRepository + ?Sized,
{
    let users = repo.list_users().await?;
    let summaries: Vec<UserSummary> = users
        .into_iter()
        .map(|user| UserSummary {
            email: user.email.unwrap_or_else(|| "No email".to_string()),
            username: user.username.unwrap_or_else(|| "No username".to_string()),
            signup_date: user.registered_at.as_ref().and_then(|ts| ts.to_naive_utc()),
        })
        .collect();
    log::info!("Retrieved {} users", summaries.len());
    Ok(summaries)
}

/// Screenplay and lineup ids of each of the user's workspaces.
pub async fn user_workspaces<R>(repo: &R, email: &str) -> ServiceResult<UserWorkspaces>
where
    R: FullRepository + ?Sized,
{
    let user = repo
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))?;

    let mut workspaces = Vec::with_capacity(user.workspaces.len());
    for workspace_id in &user.workspaces {
        match repo.find_workspace(workspace_id).await? {
            Some(workspace) => workspaces.push(WorkspaceContent {
                workspace_id: workspace_id.to_string(),
                screenplay_ids: workspace.screenplay_ids(),
                lineup_ids: workspace.lineup_ids(),
                name: workspace.name,
            }),
            None => log::warn!("User {} references missing workspace {}", email, workspace_id),
        }
    }

    log::info!(
        "Retrieved content for {} workspaces for user {}",
        workspaces.len(),
        email
    );
    Ok(UserWorkspaces {
        user_email: email.to_string(),
        workspaces,
    })
}

/// The user's credit balance, as stored.
pub async fn user_credits<R>(repo: &R, email: &str) -> ServiceResult<UserCredits>
where
    R: FullRepository + ?Sized,
{
    let user = repo
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))?;

    let credits = user
        .credits
        .ok_or_else(|| ServiceError::not_found("Credits not found for this user"))?;

    log::debug!("Retrieved credits for user {}", email);
    Ok(UserCredits {
        user_email: email.to_string(),
        credits,
    })
}
