//! Document-store access.
//!
//! This module provides abstractions over the four logical collections
//! (admins, users, workspaces, lineups) via the Repository pattern, so the
//! storage backend can be swapped without touching the services.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer / CLI                                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services (extraction, bucketing, reports, admins)       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │ LocalRepository │ MongoRepository │
//!     │  (in-memory)    │  (mongo-repo)   │
//!     └──────────────────────────────┘
//! ```
//!
//! - `repository`: trait definitions and error types
//! - `repositories::local`: in-memory implementation for tests and local development
//! - `repositories::mongo`: MongoDB implementation
//! - `factory`: creates the configured repository once at startup

#[cfg(not(any(feature = "mongo-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositorySettings;
pub use repositories::LocalRepository;
#[cfg(feature = "mongo-repo")]
pub use repositories::MongoRepository;
pub use repository::{
    AdminRepository, CatalogRepository, CollectionInfo, ErrorContext, FullRepository,
    LineupRepository, RepositoryError, RepositoryResult, UserRepository, WorkspaceRepository,
};
