//! Registration, login and profile changes.

use crate::app::identity::IdentityStore;
use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::views::{AuthSession, UserId, UserProfile};
use crate::infra::credentials::{validate_password, CredentialHasher};
use crate::infra::tokens::TokenCodec;
use std::sync::Arc;

/// Display name given to users who register without one.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

pub struct AuthService {
    identity: IdentityStore,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl AuthService {
    pub fn new(
        identity: IdentityStore,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            identity,
            hasher,
            tokens,
        }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> LedgerResult<AuthSession> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LedgerError::validation("email is required"));
        }
        let password = validate_password(password)?;
        let name = match name.trim() {
            "" => DEFAULT_DISPLAY_NAME,
            n => n,
        };

        let digest = self.hasher.hash(password).await?;
        let user = self.identity.create(email, name, &digest).await?;
        tracing::info!(user_id = %user.id, "user registered");
        self.session_for(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> LedgerResult<AuthSession> {
        let invalid = || LedgerError::unauthenticated("invalid credentials");

        let record = self.identity.find_by_email(email.trim()).await?.ok_or_else(invalid)?;
        if !self.hasher.verify(&record.password_hash, password.trim()).await? {
            tracing::debug!(user_id = %record.id, "password mismatch");
            return Err(invalid());
        }
        self.session_for(record.into())
    }

    pub async fn me(&self, user_id: UserId) -> LedgerResult<UserProfile> {
        self.identity
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| LedgerError::unauthenticated("user not found"))
    }

    /// Returns the stored (trimmed) name.
    pub async fn update_name(&self, user_id: UserId, name: &str) -> LedgerResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("name is required"));
        }
        self.identity.update_name(user_id, name).await?;
        Ok(name.to_string())
    }

    pub async fn update_password(&self, user_id: UserId, password: &str) -> LedgerResult<()> {
        let password = validate_password(password)?;
        let digest = self.hasher.hash(password).await?;
        self.identity.update_password_hash(user_id, &digest).await?;
        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }

    fn session_for(&self, user: UserProfile) -> LedgerResult<AuthSession> {
        Ok(AuthSession {
            token: self.tokens.issue(user.id)?,
            user,
        })
    }
}
