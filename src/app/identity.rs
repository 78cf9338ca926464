//! Identity Store: user credentials and profile.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::views::{UserId, UserProfile};
use crate::storage::Store;
use sqlx::Row;

/// A user row including the password digest. Never leaves the app layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        UserProfile {
            id: record.id,
            email: record.email,
            name: record.name,
        }
    }
}

#[derive(Clone)]
pub struct IdentityStore {
    store: Store,
}

impl IdentityStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Inserts a new user. A taken email is a conflict, decided by the unique
    /// constraint rather than a prior lookup.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> LedgerResult<UserProfile> {
        self.store
            .run(async {
                let created: Option<UserRecord> = sqlx::query_as(
                    "INSERT INTO users (email, name, password_hash)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (email) DO NOTHING
                     RETURNING id, email, name, password_hash",
                )
                .bind(email)
                .bind(name)
                .bind(password_hash)
                .fetch_optional(self.store.pool())
                .await?;

                created
                    .map(UserProfile::from)
                    .ok_or_else(|| LedgerError::conflict("email already exists"))
            })
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> LedgerResult<Option<UserRecord>> {
        self.store
            .run(async {
                Ok::<_, LedgerError>(sqlx::query_as(
                    "SELECT id, email, name, password_hash FROM users WHERE email = $1",
                )
                .bind(email)
                .fetch_optional(self.store.pool())
                .await?)
            })
            .await
    }

    pub async fn find_by_id(&self, user_id: UserId) -> LedgerResult<Option<UserProfile>> {
        self.store
            .run(async {
                let record: Option<UserRecord> = sqlx::query_as(
                    "SELECT id, email, name, password_hash FROM users WHERE id = $1",
                )
                .bind(user_id)
                .fetch_optional(self.store.pool())
                .await?;
                Ok::<_, LedgerError>(record.map(UserProfile::from))
            })
            .await
    }

    /// `name`, else `email`, else `"User"`.
    pub async fn display_name(&self, user_id: UserId) -> LedgerResult<Option<String>> {
        self.store
            .run(async {
                let row = sqlx::query(
                    "SELECT COALESCE(NULLIF(name, ''), NULLIF(email, ''), 'User') AS display_name
                     FROM users WHERE id = $1",
                )
                .bind(user_id)
                .fetch_optional(self.store.pool())
                .await?;
                Ok::<_, LedgerError>(match row {
                    Some(r) => Some(r.try_get("display_name")?),
                    None => None,
                })
            })
            .await
    }

    pub async fn update_name(&self, user_id: UserId, name: &str) -> LedgerResult<()> {
        self.update_column("UPDATE users SET name = $2 WHERE id = $1", user_id, name)
            .await
    }

    pub async fn update_password_hash(&self, user_id: UserId, password_hash: &str) -> LedgerResult<()> {
        self.update_column(
            "UPDATE users SET password_hash = $2 WHERE id = $1",
            user_id,
            password_hash,
        )
        .await
    }

    async fn update_column(&self, sql: &str, user_id: UserId, value: &str) -> LedgerResult<()> {
        self.store
            .run(async {
                let done = sqlx::query(sql)
                    .bind(user_id)
                    .bind(value)
                    .execute(self.store.pool())
                    .await?;
                if done.rows_affected() == 0 {
                    return Err(LedgerError::unauthenticated("user not found"));
                }
                Ok(())
            })
            .await
    }
}
