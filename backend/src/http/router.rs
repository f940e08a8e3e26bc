//! Router configuration for the HTTP server.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{auth, handlers, state::AppState};

/// Create the main application router.
///
/// Report routes (`/users*`, `/analytics/*`) require an admin token only when
/// `state.protect_reports` is set.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin: Router<AppState> = Router::new()
        .route("/admin/login", post(handlers::admin_login))
        .route("/admin/create", post(handlers::create_admin))
        .route("/admin/collections", get(handlers::list_collections))
        .route(
            "/admin/collections/{name}/schema",
            get(handlers::collection_schema),
        );

    let mut reports: Router<AppState> = Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/{email}/videos", get(handlers::user_videos))
        .route("/users/{email}/workspaces", get(handlers::user_workspaces))
        .route("/users/{email}/credits", get(handlers::user_credits))
        .route("/analytics/video-trend", get(handlers::video_trend))
        .route("/analytics/workspace-usage", get(handlers::workspace_usage));

    if state.protect_reports {
        reports = reports.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));
    }

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(admin)
        .merge(reports)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
