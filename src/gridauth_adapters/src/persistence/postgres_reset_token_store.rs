use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use gridauth_core::{ResetToken, ResetTokenStore, ResetTokenStoreError};

/// Reset token records in Postgres. `claim` is a single conditional
/// UPDATE with RETURNING; concurrent redemptions of one token race on the
/// row lock and only the winner gets the record back.
pub struct PostgresResetTokenStore {
    pool: PgPool,
}

impl PostgresResetTokenStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresResetTokenStore { pool }
    }
}

fn unexpected(e: sqlx::Error) -> ResetTokenStoreError {
    ResetTokenStoreError::UnexpectedError(e.to_string())
}

fn token_from_row(row: &PgRow) -> Result<ResetToken, ResetTokenStoreError> {
    Ok(ResetToken {
        id: row.try_get("id").map_err(unexpected)?,
        user_id: row.try_get("user_id").map_err(unexpected)?,
        token_hash: row.try_get("token_hash").map_err(unexpected)?,
        expires_at: row.try_get("expires_at").map_err(unexpected)?,
        is_used: row.try_get("is_used").map_err(unexpected)?,
        used_at: row.try_get("used_at").map_err(unexpected)?,
    })
}

#[async_trait::async_trait]
impl ResetTokenStore for PostgresResetTokenStore {
    #[tracing::instrument(name = "Storing reset token", skip_all)]
    async fn create(&self, token: ResetToken) -> Result<(), ResetTokenStoreError> {
        sqlx::query(
            "INSERT INTO password_reset_tokens \
                 (id, user_id, token_hash, expires_at, is_used, used_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(token.token_hash)
        .bind(token.expires_at)
        .bind(token.is_used)
        .bind(token.used_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    #[tracing::instrument(name = "Looking up reset token", skip_all)]
    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, token_hash, expires_at, is_used, used_at \
             FROM password_reset_tokens \
             WHERE token_hash = $1 AND NOT is_used AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.as_ref().map(token_from_row).transpose()
    }

    #[tracing::instrument(name = "Claiming reset token", skip_all)]
    async fn claim(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        let row = sqlx::query(
            "UPDATE password_reset_tokens SET is_used = TRUE, used_at = $2 \
             WHERE token_hash = $1 AND NOT is_used AND expires_at > $2 \
             RETURNING id, user_id, token_hash, expires_at, is_used, used_at",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.as_ref().map(token_from_row).transpose()
    }

    #[tracing::instrument(name = "Invalidating reset tokens for user", skip_all)]
    async fn invalidate_for_user(&self, user_id: Uuid) -> Result<(), ResetTokenStoreError> {
        sqlx::query("UPDATE password_reset_tokens SET is_used = TRUE WHERE user_id = $1 AND NOT is_used")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(())
    }
}
