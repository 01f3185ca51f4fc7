use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

/// Pending-2FA sessions expire 10 minutes after the password check.
pub const PENDING_SESSION_TTL_SECONDS: i64 = 600;

/// Proof of password-stage success while two-factor verification is still
/// outstanding. Carried entirely inside a signed token - no server-side
/// session state exists between login and verification.
///
/// A pending session must never be accepted as a final authentication
/// token, and vice versa; the codec enforces the disjoint claim shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSession {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Final credentials issued after password-only login or successful
/// two-factor verification. `expires_in` is seconds until `token` expires.
#[derive(Clone, Debug)]
pub struct AuthTokens {
    pub token: Secret<String>,
    pub refresh_token: Secret<String>,
    pub expires_in: i64,
}
