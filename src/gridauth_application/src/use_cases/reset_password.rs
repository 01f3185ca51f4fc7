use secrecy::{ExposeSecret, Secret};

use gridauth_core::{
    AuditEvent, AuditLog, AuditStatus, Clock, Password, PasswordError, PasswordValidator,
    ResetTokenStore, ResetTokenStoreError, UserStore, UserStoreError, events, reasons,
};

use crate::services::{audit::AuditLogger, reset_token::ResetTokenService};

#[derive(Debug, thiserror::Error)]
pub enum ResetPasswordError {
    #[error("Passwords do not match")]
    PasswordMismatch,
    /// Unknown, already-used and expired tokens all collapse here; the
    /// caller learns nothing about which it was.
    #[error("Invalid or expired reset token")]
    InvalidToken,
    #[error("Password does not meet requirements")]
    WeakPassword(Vec<PasswordError>),
    #[error("User not found")]
    UserNotFound,
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
    #[error("Reset token store error: {0}")]
    ResetTokenStoreError(#[from] ResetTokenStoreError),
}

/// Reset-password use case: redeems a one-time token for a password write.
/// Validation failures are reported before the token is burned, so the
/// user can retry with the same link.
pub struct ResetPasswordUseCase<U, R, A, C>
where
    U: UserStore,
    R: ResetTokenStore,
    A: AuditLog,
    C: Clock,
{
    user_store: U,
    reset_tokens: ResetTokenService<R>,
    audit: AuditLogger<A>,
    validator: PasswordValidator,
    clock: C,
}

impl<U, R, A, C> ResetPasswordUseCase<U, R, A, C>
where
    U: UserStore,
    R: ResetTokenStore,
    A: AuditLog,
    C: Clock,
{
    pub fn new(user_store: U, reset_tokens: ResetTokenService<R>, audit: AuditLogger<A>, clock: C) -> Self {
        Self {
            user_store,
            reset_tokens,
            audit,
            validator: PasswordValidator::new(),
            clock,
        }
    }

    #[tracing::instrument(name = "ResetPasswordUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        token: Secret<String>,
        new_password: Secret<String>,
        confirm_password: Secret<String>,
    ) -> Result<(), ResetPasswordError> {
        let now = self.clock.now();

        if new_password.expose_secret() != confirm_password.expose_secret() {
            self.log_failure(None, reasons::PASSWORD_MISMATCH).await;
            return Err(ResetPasswordError::PasswordMismatch);
        }

        let Some(record) = self.reset_tokens.find_valid(&token, now).await? else {
            self.log_failure(None, reasons::INVALID_TOKEN).await;
            return Err(ResetPasswordError::InvalidToken);
        };

        if let Err(violations) = self.validator.validate(&new_password) {
            self.log_failure(Some(record.user_id), reasons::WEAK_PASSWORD)
                .await;
            return Err(ResetPasswordError::WeakPassword(violations));
        }

        let user = match self.user_store.find_by_id(record.user_id).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => return Err(ResetPasswordError::UserNotFound),
            Err(err) => return Err(ResetPasswordError::UserStoreError(err)),
        };

        // The claim is the commit point. A concurrent redemption of the
        // same token loses here and sees InvalidToken.
        if self.reset_tokens.claim(&token, now).await?.is_none() {
            self.log_failure(Some(user.id), reasons::INVALID_TOKEN).await;
            return Err(ResetPasswordError::InvalidToken);
        }

        let password = Password::parse(new_password)
            .map_err(|e| ResetPasswordError::WeakPassword(vec![e]))?;
        self.user_store
            .set_password(user.id, password, now)
            .await
            .map_err(ResetPasswordError::UserStoreError)?;

        self.audit
            .log(
                AuditEvent::new(events::PASSWORD_RESET, AuditStatus::Success, now)
                    .with_user(user.id),
            )
            .await;

        Ok(())
    }

    async fn log_failure(&self, user_id: Option<uuid::Uuid>, reason: &str) {
        let mut event = AuditEvent::new(events::PASSWORD_RESET, AuditStatus::Failed, self.clock.now())
            .with_details(serde_json::json!({ "reason": reason }));
        if let Some(user_id) = user_id {
            event = event.with_user(user_id);
        }
        self.audit.log(event).await;
    }
}
