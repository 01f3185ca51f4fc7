use chrono::{DateTime, Utc};
use gridauth_core::{AuditEvent, AuditLog, AuditLogError};

/// Fire-and-forget audit sink. Every security-relevant transition goes
/// through here; a failing log store must never block the primary flow,
/// so `log` swallows append errors after tracing them.
#[derive(Clone)]
pub struct AuditLogger<A>
where
    A: AuditLog,
{
    log: A,
}

impl<A> AuditLogger<A>
where
    A: AuditLog,
{
    pub fn new(log: A) -> Self {
        Self { log }
    }

    pub async fn log(&self, event: AuditEvent) {
        let event_type = event.event_type.clone();
        if let Err(e) = self.log.append(event).await {
            tracing::warn!(event_type = %event_type, error = %e, "failed to append audit event");
        }
    }

    /// Read side of the audit trail; errors here are part of the primary
    /// flow (rate limiting) and do propagate.
    pub async fn count_since(
        &self,
        event_type: &str,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuditLogError> {
        self.log.count_since(event_type, email, since).await
    }
}
