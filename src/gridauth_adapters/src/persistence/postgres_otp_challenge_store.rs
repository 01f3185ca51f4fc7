use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use gridauth_core::{
    MethodKind, OtpChallenge, OtpChallengeStore, OtpChallengeStoreError, VerifyOutcome,
};

/// One live challenge per (user, kind), enforced by a unique index. The
/// verify path runs in a transaction with `FOR UPDATE`, so the
/// check-and-decrement is atomic across connections.
pub struct PostgresOtpChallengeStore {
    pool: PgPool,
}

impl PostgresOtpChallengeStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresOtpChallengeStore { pool }
    }
}

fn unexpected(e: sqlx::Error) -> OtpChallengeStoreError {
    OtpChallengeStoreError::UnexpectedError(e.to_string())
}

#[async_trait::async_trait]
impl OtpChallengeStore for PostgresOtpChallengeStore {
    #[tracing::instrument(name = "Storing OTP challenge", skip_all)]
    async fn store_challenge(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: String,
        issued_at: DateTime<Utc>,
    ) -> Result<(), OtpChallengeStoreError> {
        let challenge = OtpChallenge::new(code, issued_at);

        sqlx::query(
            "INSERT INTO otp_challenges \
                 (user_id, kind, code, attempts_remaining, is_locked, expires_at) \
             VALUES ($1, $2, $3, $4, FALSE, $5) \
             ON CONFLICT (user_id, kind) DO UPDATE \
                 SET code = EXCLUDED.code, \
                     attempts_remaining = EXCLUDED.attempts_remaining, \
                     is_locked = FALSE, \
                     expires_at = EXCLUDED.expires_at",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(challenge.code)
        .bind(challenge.attempts_remaining)
        .bind(challenge.expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    #[tracing::instrument(name = "Verifying OTP code", skip_all)]
    async fn verify_code(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, OtpChallengeStoreError> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let row = sqlx::query(
            "SELECT id, code, attempts_remaining, is_locked, expires_at \
             FROM otp_challenges WHERE user_id = $1 AND kind = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;

        let Some(row) = row else {
            return Ok(VerifyOutcome::invalid());
        };

        let id: Uuid = row.try_get("id").map_err(unexpected)?;
        let stored_code: String = row.try_get("code").map_err(unexpected)?;
        let attempts_remaining: i32 = row.try_get("attempts_remaining").map_err(unexpected)?;
        let is_locked: bool = row.try_get("is_locked").map_err(unexpected)?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at").map_err(unexpected)?;

        if is_locked {
            return Ok(VerifyOutcome::locked());
        }
        if expires_at <= now {
            return Ok(VerifyOutcome::invalid());
        }

        if stored_code == code {
            sqlx::query("DELETE FROM otp_challenges WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            tx.commit().await.map_err(unexpected)?;
            return Ok(VerifyOutcome::valid());
        }

        let remaining = (attempts_remaining - 1).max(0);
        let locked = remaining == 0;

        sqlx::query("UPDATE otp_challenges SET attempts_remaining = $2, is_locked = $3 WHERE id = $1")
            .bind(id)
            .bind(remaining)
            .bind(locked)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        Ok(VerifyOutcome {
            valid: false,
            attempts_remaining: Some(remaining),
            locked,
        })
    }
}
