//! Repository trait definitions for document-store access.
//!
//! Access is split into focused traits, one per logical collection plus a
//! catalog trait for store-level operations:
//!
//! - [`error`]: Error types for repository operations
//! - [`admin`]: Administrator accounts
//! - [`user`]: End users
//! - [`workspace`]: Workspaces and full video records
//! - [`catalog`]: Health checks and collection introspection
//!
//! Request handlers hold an `Arc<dyn FullRepository>`; services take
//! `&R where R: FullRepository + ?Sized` so they work with both.

pub mod admin;
pub mod catalog;
pub mod error;
pub mod user;
pub mod workspace;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use admin::AdminRepository;
pub use catalog::{CatalogRepository, CollectionInfo};
pub use user::UserRepository;
pub use workspace::{LineupRepository, WorkspaceRepository};

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all five
/// repository traits.
pub trait FullRepository:
    AdminRepository + UserRepository + WorkspaceRepository + LineupRepository + CatalogRepository
{
}

// Blanket implementation: any type implementing all traits automatically implements FullRepository
impl<T> FullRepository for T where
    T: AdminRepository + UserRepository + WorkspaceRepository + LineupRepository + CatalogRepository
{
}
