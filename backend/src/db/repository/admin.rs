//! Administrator account storage.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{AdminDocument, DocumentId};

/// Repository trait for the `admins` collection.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Find an administrator by exact email match.
    ///
    /// # Returns
    /// * `Ok(Some(AdminDocument))` - The matching account
    /// * `Ok(None)` - No account with that email
    /// * `Err(RepositoryError)` - If the store could not be queried
    async fn find_admin_by_email(&self, email: &str) -> RepositoryResult<Option<AdminDocument>>;

    /// Find an administrator by document id.
    async fn find_admin_by_id(&self, id: &DocumentId) -> RepositoryResult<Option<AdminDocument>>;

    /// Insert a new administrator and return its assigned id.
    ///
    /// Any `id` already set on `admin` is ignored.
    async fn insert_admin(&self, admin: &AdminDocument) -> RepositoryResult<DocumentId>;
}
