//! Analytics HTTP Server Binary
//!
//! Main entry point for the analytics REST API. Loads configuration, opens
//! the repository, sets up the router and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run against a local JSON snapshot (default)
//! LOCAL_SEED_PATH=data/seed.json cargo run --bin analytics-server
//!
//! # Run against MongoDB
//! REPOSITORY_TYPE=mongo MONGODB_URL=mongodb://localhost:27017 \
//!   cargo run --bin analytics-server --features mongo-repo
//! ```
//!
//! # Environment Variables
//!
//! - `ANALYTICS_CONFIG`: Path to a TOML config file
//! - `HOST` / `PORT`: Bind address (default: 0.0.0.0:8000)
//! - `JWT_SECRET_KEY`: Token signing secret
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use lineup_analytics::config::AppConfig;
use lineup_analytics::db::{CatalogRepository, RepositoryFactory};
use lineup_analytics::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting analytics HTTP server");

    let config = AppConfig::load()?;

    let repository = RepositoryFactory::create(&config.repository).await?;
    info!("Repository initialized ({} backend)", repository.backend_name());

    match repository.collection_stats().await {
        Ok(collections) => {
            for collection in collections {
                info!("  {}: {} documents", collection.name, collection.count);
            }
        }
        Err(e) => warn!("Could not list collections: {}", e),
    }

    let state = AppState::from_config(repository, &config);
    if state.protect_reports {
        info!("Report routes require an admin token");
    }

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
