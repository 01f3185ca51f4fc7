use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    email::Email,
    session::{AuthTokens, PendingSession},
    user::User,
};

/// What an outbound email is for. Transports may route, tag or throttle
/// by purpose; the message text itself is opaque to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailPurpose {
    VerificationCode,
    PasswordReset,
}

impl EmailPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailPurpose::VerificationCode => "verification-code",
            EmailPurpose::PasswordReset => "password-reset",
        }
    }
}

// EmailClient port trait and errors
#[derive(Debug, Error)]
pub enum EmailClientError {
    #[error("Email client misconfigured: {0}")]
    Configuration(String),
    #[error("Email transport failed: {0}")]
    Transport(String),
    #[error("Email provider rejected the message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_email(
        &self,
        recipient: &Email,
        purpose: EmailPurpose,
        subject: &str,
        content: &str,
    ) -> Result<(), EmailClientError>;
}

#[async_trait]
impl<T: EmailClient + ?Sized> EmailClient for Arc<T> {
    async fn send_email(
        &self,
        recipient: &Email,
        purpose: EmailPurpose,
        subject: &str,
        content: &str,
    ) -> Result<(), EmailClientError> {
        (**self).send_email(recipient, purpose, subject, content).await
    }
}

// TokenIssuer port trait and errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Session token expired or invalid")]
    InvalidSession,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for TokenError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::InvalidSession, Self::InvalidSession)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Signs and verifies the two token shapes this core hands out.
///
/// Pending-2FA tokens and final tokens must be mutually unacceptable:
/// `verify_pending` rejects anything that is not a live pending-session
/// token, and a pending token must never pass for a final credential.
pub trait TokenIssuer: Send + Sync {
    /// Short-lived pending-2FA session token for `user`.
    fn issue_pending(&self, user: &User) -> Result<Secret<String>, TokenError>;
    /// Decode and validate a pending-2FA session token.
    fn verify_pending(&self, token: &Secret<String>) -> Result<PendingSession, TokenError>;
    /// Final credentials. `remember_me` only widens the TTL.
    fn issue_final(&self, user: &User, remember_me: bool) -> Result<AuthTokens, TokenError>;
}

impl<T: TokenIssuer + ?Sized> TokenIssuer for Arc<T> {
    fn issue_pending(&self, user: &User) -> Result<Secret<String>, TokenError> {
        (**self).issue_pending(user)
    }
    fn verify_pending(&self, token: &Secret<String>) -> Result<PendingSession, TokenError> {
        (**self).verify_pending(token)
    }
    fn issue_final(&self, user: &User, remember_me: bool) -> Result<AuthTokens, TokenError> {
        (**self).issue_final(user, remember_me)
    }
}

/// Injected time source so session expiry, rate windows and token TTLs are
/// testable without touching the wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
