use sqlx::PgPool;
use uuid::Uuid;

use gridauth_core::{BackupCodeStore, BackupCodeStoreError, hash_token};

/// Backup code hashes in Postgres. `consume` is a single conditional
/// UPDATE, so a code can only be spent by one caller.
pub struct PostgresBackupCodeStore {
    pool: PgPool,
}

impl PostgresBackupCodeStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresBackupCodeStore { pool }
    }
}

#[async_trait::async_trait]
impl BackupCodeStore for PostgresBackupCodeStore {
    #[tracing::instrument(name = "Storing backup codes", skip_all)]
    async fn store_codes(
        &self,
        user_id: Uuid,
        code_hashes: Vec<String>,
    ) -> Result<(), BackupCodeStoreError> {
        for hash in code_hashes {
            sqlx::query("INSERT INTO backup_codes (user_id, code_hash, is_used) VALUES ($1, $2, FALSE)")
                .bind(user_id)
                .bind(hash)
                .execute(&self.pool)
                .await
                .map_err(|e| BackupCodeStoreError::UnexpectedError(e.to_string()))?;
        }
        Ok(())
    }

    #[tracing::instrument(name = "Consuming backup code", skip_all)]
    async fn consume(&self, user_id: Uuid, code: &str) -> Result<bool, BackupCodeStoreError> {
        let result = sqlx::query(
            "UPDATE backup_codes SET is_used = TRUE, used_at = NOW() \
             WHERE user_id = $1 AND code_hash = $2 AND NOT is_used",
        )
        .bind(user_id)
        .bind(hash_token(code))
        .execute(&self.pool)
        .await
        .map_err(|e| BackupCodeStoreError::UnexpectedError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
