use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use super::email::Email;

/// Identity record owned by the datastore. Login mutates the failure
/// counters and `last_login_at`; password changes update
/// `password_hash` and `password_changed_at`. Never deleted by this core.
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: Email,
    pub password_hash: Secret<String>,
    pub role: String,
    pub active: bool,
    pub locked_until: Option<DateTime<Utc>>,
    pub failed_login_attempts: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(tenant_id: Uuid, email: Email, password_hash: Secret<String>, role: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            email,
            password_hash,
            role: role.to_string(),
            active: true,
            locked_until: None,
            failed_login_attempts: 0,
            last_login_at: None,
            password_changed_at: None,
        }
    }

    /// Whether the account may authenticate at `now`. Inactive and
    /// temporarily locked accounts both fail the credential check with the
    /// same generic error upstream.
    pub fn can_authenticate(&self, now: DateTime<Utc>) -> bool {
        self.active && self.locked_until.is_none_or(|until| until <= now)
    }
}
