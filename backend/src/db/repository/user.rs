//! End-user lookups.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::UserDocument;

/// Repository trait for the `users` collection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List every user.
    async fn list_users(&self) -> RepositoryResult<Vec<UserDocument>>;

    /// Find a user by exact email match.
    ///
    /// # Returns
    /// * `Ok(None)` - No user with that email
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserDocument>>;
}
