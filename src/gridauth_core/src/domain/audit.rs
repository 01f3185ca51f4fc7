use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical event type names.
pub mod events {
    pub const LOGIN: &str = "login";
    pub const PASSWORD_RESET_REQUESTED: &str = "password_reset_requested";
    pub const PASSWORD_RESET: &str = "password_reset";
}

/// Canonical `details.reason` codes for failed events.
pub mod reasons {
    pub const UNKNOWN_USER: &str = "unknown_user";
    pub const INCORRECT_PASSWORD: &str = "incorrect_password";
    pub const ACCOUNT_UNAVAILABLE: &str = "account_unavailable";
    pub const INVALID_2FA_CODE: &str = "invalid_2fa_code";
    pub const IS_LOCKED: &str = "is_locked";
    pub const INVALID_TOKEN: &str = "invalid_token";
    pub const PASSWORD_MISMATCH: &str = "password_mismatch";
    pub const WEAK_PASSWORD: &str = "weak_password";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[serde(rename = "pending_2fa")]
    Pending2fa,
    Success,
    Failed,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Pending2fa => "pending_2fa",
            AuditStatus::Success => "success",
            AuditStatus::Failed => "failed",
        }
    }
}

/// Append-only record of a security-relevant transition. Never mutated or
/// deleted by this core. `email` is recorded (normalized) even when no
/// user exists, so the forgot-password rate window can count requests for
/// unknown addresses too.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub status: AuditStatus,
    pub details: serde_json::Value,
    pub email: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(event_type: &str, status: AuditStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            event_type: event_type.to_string(),
            status,
            details: serde_json::Value::Null,
            email: None,
            timestamp,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
