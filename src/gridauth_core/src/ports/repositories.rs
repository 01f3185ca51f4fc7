use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    audit::AuditEvent,
    email::Email,
    password::Password,
    reset_token::ResetToken,
    two_factor::{MethodKind, TwoFactorMethod, VerifyOutcome},
    user::User,
};

// UserStore port trait and errors
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User not found")]
    UserNotFound,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::UserNotFound, Self::UserNotFound)
                | (Self::IncorrectPassword, Self::IncorrectPassword)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Lookup and mutation of identity records. Password comparison lives
/// behind the port so the hashing scheme stays an adapter concern.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<User, UserStoreError>;
    /// Compare `password` against the stored hash. Does not check
    /// `active`/`locked_until`; the caller folds those into the same
    /// generic failure.
    async fn verify_credentials(
        &self,
        email: &Email,
        password: &Secret<String>,
    ) -> Result<User, UserStoreError>;
    async fn record_login_success(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserStoreError>;
    async fn record_login_failure(&self, user_id: Uuid) -> Result<(), UserStoreError>;
    /// Replace the stored hash with a hash of `new_password` and stamp
    /// `password_changed_at`. The hashing scheme is the store's concern.
    async fn set_password(
        &self,
        user_id: Uuid,
        new_password: Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), UserStoreError>;
    async fn two_factor_methods(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TwoFactorMethod>, UserStoreError>;
}

// OtpChallengeStore port trait and errors
#[derive(Debug, Error)]
pub enum OtpChallengeStoreError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Email/SMS one-time-code challenges. `verify_code` must be atomic per
/// (user, kind): two concurrent wrong codes must not both observe a
/// positive attempt budget and slip past the lockout.
#[async_trait]
pub trait OtpChallengeStore: Send + Sync {
    async fn store_challenge(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: String,
        issued_at: DateTime<Utc>,
    ) -> Result<(), OtpChallengeStoreError>;
    async fn verify_code(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, OtpChallengeStoreError>;
}

// BackupCodeStore port trait and errors
#[derive(Debug, Error)]
pub enum BackupCodeStoreError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Single-use backup codes. `consume` atomically marks the matching
/// unused hash as spent; a reused code returns `false` exactly like a
/// code that never existed.
#[async_trait]
pub trait BackupCodeStore: Send + Sync {
    async fn store_codes(
        &self,
        user_id: Uuid,
        code_hashes: Vec<String>,
    ) -> Result<(), BackupCodeStoreError>;
    async fn consume(&self, user_id: Uuid, code: &str) -> Result<bool, BackupCodeStoreError>;
}

// ResetTokenStore port trait and errors
#[derive(Debug, Error)]
pub enum ResetTokenStoreError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Password-reset token records. `claim` is the atomic
/// read-unused-and-mark-used step; under concurrent redemption of the
/// same token exactly one caller receives the record.
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn create(&self, token: ResetToken) -> Result<(), ResetTokenStoreError>;
    /// Non-mutating lookup of a redeemable token. Unknown, used and
    /// expired tokens all read as `None`.
    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError>;
    async fn claim(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError>;
    async fn invalidate_for_user(&self, user_id: Uuid) -> Result<(), ResetTokenStoreError>;
}

// AuditLog port trait and errors
#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Append-only audit sink. `count_since` drives the forgot-password rate
/// window (requests per normalized email in the trailing hour).
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, event: AuditEvent) -> Result<(), AuditLogError>;
    async fn count_since(
        &self,
        event_type: &str,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuditLogError>;
}

// Blanket Arc impls so composed state can hand `Arc<dyn Store>` to the
// generic use cases.
#[async_trait]
impl<T: UserStore + ?Sized> UserStore for Arc<T> {
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        (**self).find_by_email(email).await
    }
    async fn find_by_id(&self, user_id: Uuid) -> Result<User, UserStoreError> {
        (**self).find_by_id(user_id).await
    }
    async fn verify_credentials(
        &self,
        email: &Email,
        password: &Secret<String>,
    ) -> Result<User, UserStoreError> {
        (**self).verify_credentials(email, password).await
    }
    async fn record_login_success(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        (**self).record_login_success(user_id, at).await
    }
    async fn record_login_failure(&self, user_id: Uuid) -> Result<(), UserStoreError> {
        (**self).record_login_failure(user_id).await
    }
    async fn set_password(
        &self,
        user_id: Uuid,
        new_password: Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        (**self).set_password(user_id, new_password, changed_at).await
    }
    async fn two_factor_methods(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TwoFactorMethod>, UserStoreError> {
        (**self).two_factor_methods(user_id).await
    }
}

#[async_trait]
impl<T: OtpChallengeStore + ?Sized> OtpChallengeStore for Arc<T> {
    async fn store_challenge(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: String,
        issued_at: DateTime<Utc>,
    ) -> Result<(), OtpChallengeStoreError> {
        (**self).store_challenge(user_id, kind, code, issued_at).await
    }
    async fn verify_code(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, OtpChallengeStoreError> {
        (**self).verify_code(user_id, kind, code, now).await
    }
}

#[async_trait]
impl<T: BackupCodeStore + ?Sized> BackupCodeStore for Arc<T> {
    async fn store_codes(
        &self,
        user_id: Uuid,
        code_hashes: Vec<String>,
    ) -> Result<(), BackupCodeStoreError> {
        (**self).store_codes(user_id, code_hashes).await
    }
    async fn consume(&self, user_id: Uuid, code: &str) -> Result<bool, BackupCodeStoreError> {
        (**self).consume(user_id, code).await
    }
}

#[async_trait]
impl<T: ResetTokenStore + ?Sized> ResetTokenStore for Arc<T> {
    async fn create(&self, token: ResetToken) -> Result<(), ResetTokenStoreError> {
        (**self).create(token).await
    }
    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        (**self).find_valid(token_hash, now).await
    }
    async fn claim(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        (**self).claim(token_hash, now).await
    }
    async fn invalidate_for_user(&self, user_id: Uuid) -> Result<(), ResetTokenStoreError> {
        (**self).invalidate_for_user(user_id).await
    }
}

#[async_trait]
impl<T: AuditLog + ?Sized> AuditLog for Arc<T> {
    async fn append(&self, event: AuditEvent) -> Result<(), AuditLogError> {
        (**self).append(event).await
    }
    async fn count_since(
        &self,
        event_type: &str,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuditLogError> {
        (**self).count_since(event_type, email, since).await
    }
}
