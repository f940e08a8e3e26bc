//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Form, Json,
};
use chrono::Utc;
use serde_json::{Map, Value};

use super::auth::{CurrentAdmin, SuperAdmin};
use super::dto::{
    AccessToken, CollectionInfo, CreateAdminRequest, HealthResponse, LoginForm, MessageResponse,
    UserCredits, UserSummary, UserVideo, UserWorkspaces, VideoTrend, VideoTrendQuery,
    WorkspaceUsage, WorkspaceUsageQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::CatalogRepository;
use crate::services::{self, video_trend::validate_days, UsageQuery};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.repository.backend_name().to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Admin
// =============================================================================

/// POST /admin/login
///
/// Exchange form credentials for a bearer token.
pub async fn admin_login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> HandlerResult<AccessToken> {
    let Form(form) = form?;
    let token = state.auth.authenticate(&form.username, &form.password).await?;
    Ok(Json(token))
}

/// POST /admin/create
///
/// Create an admin. Only super admins may call this.
pub async fn create_admin(
    State(state): State<AppState>,
    SuperAdmin(caller): SuperAdmin,
    request: Result<Json<CreateAdminRequest>, JsonRejection>,
) -> HandlerResult<MessageResponse> {
    let Json(request) = request?;
    state
        .auth
        .create_admin(&request.email, &request.password, request.is_super_admin)
        .await?;
    log::info!("Admin {} created by {}", request.email, caller.email);

    Ok(Json(MessageResponse {
        message: "Admin created successfully".to_string(),
    }))
}

/// GET /admin/collections
pub async fn list_collections(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
) -> HandlerResult<Vec<CollectionInfo>> {
    let collections = services::list_collections(state.repository.as_ref()).await?;
    Ok(Json(collections))
}

/// GET /admin/collections/{name}/schema
///
/// Field types of one sample document.
pub async fn collection_schema(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(name): Path<String>,
) -> HandlerResult<Map<String, Value>> {
    let schema = services::collection_schema(state.repository.as_ref(), &name).await?;
    Ok(Json(schema))
}

// =============================================================================
// Users
// =============================================================================

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> HandlerResult<Vec<UserSummary>> {
    let users = services::list_users(state.repository.as_ref()).await?;
    Ok(Json(users))
}

/// GET /users/{email}/videos
pub async fn user_videos(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> HandlerResult<Vec<UserVideo>> {
    let videos = services::extract_user_videos(state.repository.as_ref(), &email).await?;
    Ok(Json(videos))
}

/// GET /users/{email}/workspaces
pub async fn user_workspaces(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> HandlerResult<UserWorkspaces> {
    let content = services::user_workspaces(state.repository.as_ref(), &email).await?;
    Ok(Json(content))
}

/// GET /users/{email}/credits
pub async fn user_credits(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> HandlerResult<UserCredits> {
    let credits = services::user_credits(state.repository.as_ref(), &email).await?;
    Ok(Json(credits))
}

// =============================================================================
// Analytics
// =============================================================================

/// GET /analytics/video-trend?user_email=..&days=..
pub async fn video_trend(
    State(state): State<AppState>,
    query: Result<Query<VideoTrendQuery>, QueryRejection>,
) -> HandlerResult<VideoTrend> {
    let Query(query) = query?;
    let days = validate_days(
        query.days.unwrap_or(i64::from(state.reports.default_trend_days)),
        state.reports.max_trend_days,
    )?;
    let now = Utc::now().naive_utc();

    let trend =
        services::video_trend(state.repository.as_ref(), &query.user_email, days, now).await?;
    Ok(Json(trend))
}

/// GET /analytics/workspace-usage?start_date=..&end_date=..&granularity=..
pub async fn workspace_usage(
    State(state): State<AppState>,
    query: Result<Query<WorkspaceUsageQuery>, QueryRejection>,
) -> HandlerResult<WorkspaceUsage> {
    let Query(query) = query?;
    let usage_query = UsageQuery::parse(&query.start_date, &query.end_date, &query.granularity)?;

    let usage = services::workspace_usage(state.repository.as_ref(), &usage_query).await?;
    Ok(Json(usage))
}
