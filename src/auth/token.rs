use async_trait::async_trait;
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppResult;
use crate::users::model::User;

const KEY_BYTES: usize = 20;

/// Opaque per-user API token. One row per user, never rotated.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// 40 lowercase hex characters from the OS random source.
pub fn generate_key() -> String {
    let mut buf = [0u8; KEY_BYTES];
    OsRng.fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

#[async_trait]
pub trait TokenRepo: Send + Sync {
    /// Returns the user's existing token, creating it on first use.
    async fn get_or_create(&self, user_id: Uuid) -> AppResult<AuthToken>;
    /// Resolves a key to its owning user, if any.
    async fn find_user(&self, key: &str) -> AppResult<Option<User>>;
}

#[derive(Clone)]
pub struct PgTokenRepo {
    db: PgPool,
}

impl PgTokenRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepo for PgTokenRepo {
    async fn get_or_create(&self, user_id: Uuid) -> AppResult<AuthToken> {
        // ON CONFLICT keeps the first key when two logins race.
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(generate_key())
        .bind(user_id)
        .execute(&self.db)
        .await?;

        let token = sqlx::query_as::<_, AuthToken>(
            r#"SELECT key, user_id, created_at FROM auth_tokens WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(token)
    }

    async fn find_user(&self, key: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.name,
                   u.is_active, u.is_staff, u.is_superuser, u.created_at
              FROM auth_tokens t
              JOIN users u ON u.id = t.user_id
             WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
