use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use gridauth_core::{AuditEvent, AuditLog, AuditLogError};

/// Append-only audit table. `count_since` backs the forgot-password rate
/// window, so it filters on the normalized email column directly.
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        PostgresAuditLog { pool }
    }
}

fn unexpected(e: sqlx::Error) -> AuditLogError {
    AuditLogError::UnexpectedError(e.to_string())
}

#[async_trait::async_trait]
impl AuditLog for PostgresAuditLog {
    #[tracing::instrument(name = "Appending audit event", skip_all)]
    async fn append(&self, event: AuditEvent) -> Result<(), AuditLogError> {
        sqlx::query(
            "INSERT INTO audit_events (user_id, event_type, status, details, email, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event.user_id)
        .bind(&event.event_type)
        .bind(event.status.as_str())
        .bind(&event.details)
        .bind(&event.email)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    #[tracing::instrument(name = "Counting audit events", skip_all)]
    async fn count_since(
        &self,
        event_type: &str,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuditLogError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM audit_events \
             WHERE event_type = $1 AND email = $2 AND created_at >= $3",
        )
        .bind(event_type)
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        let count: i64 = row.try_get("count").map_err(unexpected)?;
        Ok(count as u32)
    }
}
