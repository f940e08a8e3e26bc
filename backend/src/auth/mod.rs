//! Admin authentication.
//!
//! [`AuthService`] is the single entry point for credential checks: it issues
//! tokens on login, turns a bearer token into an [`AdminIdentity`], and
//! enforces the persisted super-admin flag.

pub mod password;
pub mod token;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::{AdminRepository, FullRepository, RepositoryError};
use crate::models::{AdminDocument, DocumentId};

pub use password::PasswordHasher;
pub use token::{Claims, TokenCodec};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Super admin privileges required")]
    Forbidden,

    #[error("Admin with email {0} already exists")]
    DuplicateAdmin(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Login response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminIdentity {
    pub id: DocumentId,
    pub email: String,
    pub is_super_admin: bool,
}

pub struct AuthService {
    repo: Arc<dyn FullRepository>,
    tokens: TokenCodec,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(repo: Arc<dyn FullRepository>, tokens: TokenCodec, hasher: PasswordHasher) -> Self {
        Self {
            repo,
            tokens,
            hasher,
        }
    }

    pub fn from_config(repo: Arc<dyn FullRepository>, config: &AuthConfig) -> Self {
        let tokens = TokenCodec::new(
            &config.secret_key,
            Duration::minutes(config.access_token_expire_minutes),
        );
        Self::new(repo, tokens, PasswordHasher::new(config.password_iterations))
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// The admin with `email` if `password` matches its stored hash.
    pub async fn verify_admin(&self, email: &str, password: &str) -> AuthResult<Option<AdminDocument>> {
        let Some(admin) = self.repo.find_admin_by_email(email).await? else {
            return Ok(None);
        };
        let Some(stored) = admin.password.clone() else {
            return Ok(None);
        };

        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || PasswordHasher::verify(&stored, &password))
            .await
            .map_err(|e| RepositoryError::internal(format!("Password check failed: {}", e)))?;
        Ok(matches.then_some(admin))
    }

    /// Check credentials and issue an access token.
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<AccessToken> {
        let admin = self
            .verify_admin(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let subject = admin.email.unwrap_or_else(|| email.to_string());
        let access_token = self.tokens.issue(&subject)?;
        log::info!("Admin {} logged in", subject);

        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Resolve a bearer token to the admin it was issued for.
    ///
    /// Fails when the signature or expiry is invalid, or when the admin no
    /// longer exists.
    pub async fn validate(&self, token: &str) -> AuthResult<AdminIdentity> {
        let claims = self.tokens.decode(token)?;
        let admin = self
            .repo
            .find_admin_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AuthError::Unauthenticated(token::INVALID_CREDENTIALS.to_string()))?;
        let id = admin
            .id
            .ok_or_else(|| AuthError::Unauthenticated(token::INVALID_CREDENTIALS.to_string()))?;

        Ok(AdminIdentity {
            id,
            email: claims.sub,
            is_super_admin: admin.is_super_admin,
        })
    }

    /// Persisted super-admin flag of the admin with `id`.
    pub async fn is_super_admin(&self, id: &DocumentId) -> AuthResult<bool> {
        Ok(self
            .repo
            .find_admin_by_id(id)
            .await?
            .is_some_and(|admin| admin.is_super_admin))
    }

    /// Pass `identity` through if the stored record is a super admin.
    pub async fn require_super_admin(&self, identity: AdminIdentity) -> AuthResult<AdminIdentity> {
        if self.is_super_admin(&identity.id).await? {
            Ok(identity)
        } else {
            log::warn!("Admin {} denied super-admin action", identity.email);
            Err(AuthError::Forbidden)
        }
    }

    /// Store a new admin with a salted password hash.
    pub async fn create_admin(
        &self,
        email: &str,
        password: &str,
        is_super_admin: bool,
    ) -> AuthResult<DocumentId> {
        if self.repo.find_admin_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateAdmin(email.to_string()));
        }

        let hasher = self.hasher;
        let plain = password.to_string();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| RepositoryError::internal(format!("Password hashing failed: {}", e)))?;

        let id = self
            .repo
            .insert_admin(&AdminDocument {
                id: None,
                email: Some(email.to_string()),
                password: Some(hashed),
                is_super_admin,
            })
            .await?;
        log::info!("Created admin {} (super admin: {})", email, is_super_admin);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;

    fn service() -> (LocalRepository, AuthService) {
        let repo = LocalRepository::new();
        let auth = AuthService::new(
            Arc::new(repo.clone()),
            TokenCodec::new("secret", Duration::minutes(30)),
            PasswordHasher::new(1_000),
        );
        (repo, auth)
    }

    #[tokio::test]
    async fn test_login_and_validate() {
        let (_, auth) = service();
        auth.create_admin("root@example.com", "pw", true).await.unwrap();

        let token = auth.authenticate("root@example.com", "pw").await.unwrap();
        assert_eq!(token.token_type, "bearer");

        let identity = auth.validate(&token.access_token).await.unwrap();
        assert_eq!(identity.email, "root@example.com");
        assert!(identity.is_super_admin);
        assert!(auth.require_super_admin(identity).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (_, auth) = service();
        auth.create_admin("a@example.com", "pw", false).await.unwrap();

        assert!(matches!(
            auth.authenticate("a@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("b@example.com", "pw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_regular_admin_forbidden() {
        let (_, auth) = service();
        auth.create_admin("a@example.com", "pw", false).await.unwrap();
        let token = auth.authenticate("a@example.com", "pw").await.unwrap();
        let identity = auth.validate(&token.access_token).await.unwrap();

        assert!(matches!(
            auth.require_super_admin(identity).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_admin_rejected() {
        let (repo, auth) = service();
        auth.create_admin("a@example.com", "pw", false).await.unwrap();
        assert!(matches!(
            auth.create_admin("a@example.com", "other", true).await,
            Err(AuthError::DuplicateAdmin(_))
        ));
        assert_eq!(repo.document_count("admins"), 1);
    }

    #[tokio::test]
    async fn test_deleted_admin_token_rejected() {
        let (repo, auth) = service();
        auth.create_admin("a@example.com", "pw", false).await.unwrap();
        let token = auth.authenticate("a@example.com", "pw").await.unwrap();

        repo.clear();
        assert!(matches!(
            auth.validate(&token.access_token).await,
            Err(AuthError::Unauthenticated(_))
        ));
    }
}
