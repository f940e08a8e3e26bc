//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::{AppConfig, ReportConfig};
use crate::db::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub auth: Arc<AuthService>,
    pub reports: ReportConfig,
    /// Require an admin token on the report routes.
    pub protect_reports: bool,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        auth: AuthService,
        reports: ReportConfig,
        protect_reports: bool,
    ) -> Self {
        Self {
            repository,
            auth: Arc::new(auth),
            reports,
            protect_reports,
        }
    }

    /// Build the state from loaded configuration.
    pub fn from_config(repository: Arc<dyn FullRepository>, config: &AppConfig) -> Self {
        let auth = AuthService::from_config(Arc::clone(&repository), &config.auth);
        Self::new(
            repository,
            auth,
            config.reports.clone(),
            config.auth.protect_reports,
        )
    }
}
