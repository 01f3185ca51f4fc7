use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use gridauth_core::{AuditEvent, AuditLog, AuditLogError};

/// Append-only in-memory audit log. Exposes the recorded events for
/// assertions in integration tests.
#[derive(Default, Clone)]
pub struct InMemoryAuditLog {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, event: AuditEvent) -> Result<(), AuditLogError> {
        self.events
            .write()
            .map_err(|e| AuditLogError::UnexpectedError(e.to_string()))?
            .push(event);
        Ok(())
    }

    async fn count_since(
        &self,
        event_type: &str,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuditLogError> {
        let events = self
            .events
            .read()
            .map_err(|e| AuditLogError::UnexpectedError(e.to_string()))?;

        Ok(events
            .iter()
            .filter(|e| {
                e.event_type == event_type
                    && e.email.as_deref() == Some(email)
                    && e.timestamp >= since
            })
            .count() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gridauth_core::{AuditStatus, events};

    #[tokio::test]
    async fn count_since_filters_by_type_email_and_window() {
        let log = InMemoryAuditLog::new();
        let now = Utc::now();

        log.append(
            AuditEvent::new(events::PASSWORD_RESET_REQUESTED, AuditStatus::Success, now)
                .with_email("a@example.com"),
        )
        .await
        .unwrap();
        log.append(
            AuditEvent::new(
                events::PASSWORD_RESET_REQUESTED,
                AuditStatus::Success,
                now - Duration::hours(2),
            )
            .with_email("a@example.com"),
        )
        .await
        .unwrap();
        log.append(
            AuditEvent::new(events::LOGIN, AuditStatus::Success, now).with_email("a@example.com"),
        )
        .await
        .unwrap();
        log.append(
            AuditEvent::new(events::PASSWORD_RESET_REQUESTED, AuditStatus::Success, now)
                .with_email("b@example.com"),
        )
        .await
        .unwrap();

        let count = log
            .count_since(
                events::PASSWORD_RESET_REQUESTED,
                "a@example.com",
                now - Duration::hours(1),
            )
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
