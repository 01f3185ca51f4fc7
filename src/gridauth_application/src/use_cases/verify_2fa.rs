use secrecy::Secret;

use gridauth_core::{
    AuditEvent, AuditLog, AuditStatus, AuthTokens, BackupCodeStore, Clock, MethodKind,
    OtpChallengeStore, TokenError, TokenIssuer, User, UserStore, UserStoreError, events, reasons,
};

use crate::services::{
    audit::AuditLogger,
    two_factor::{TwoFactorError, TwoFactorService},
};

#[derive(Debug, thiserror::Error)]
pub enum VerifyTwoFactorError {
    /// Bad signature, expired, or not a pending-2FA token. Fatal: the
    /// caller must restart login.
    #[error("Session token expired or invalid")]
    SessionInvalid,
    /// Wrong code. The pending session stays valid for further attempts;
    /// `attempts_remaining` is populated for the counted OTP methods.
    #[error("Invalid two-factor authentication code")]
    InvalidCode { attempts_remaining: Option<i32> },
    /// The challenge is locked out; the correct code no longer helps.
    #[error("Two-factor method is locked")]
    Locked,
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
    #[error("Two-factor error: {0}")]
    TwoFactorError(TwoFactorError),
    #[error("Token error: {0}")]
    TokenError(TokenError),
}

/// Verify-2FA use case: consumes a pending session and either issues the
/// final credentials or reports why it cannot.
pub struct VerifyTwoFactorUseCase<U, O, B, A, T, C>
where
    U: UserStore,
    O: OtpChallengeStore,
    B: BackupCodeStore,
    A: AuditLog,
    T: TokenIssuer,
    C: Clock,
{
    user_store: U,
    two_factor: TwoFactorService<O, B>,
    audit: AuditLogger<A>,
    tokens: T,
    clock: C,
}

impl<U, O, B, A, T, C> VerifyTwoFactorUseCase<U, O, B, A, T, C>
where
    U: UserStore,
    O: OtpChallengeStore,
    B: BackupCodeStore,
    A: AuditLog,
    T: TokenIssuer,
    C: Clock,
{
    pub fn new(
        user_store: U,
        two_factor: TwoFactorService<O, B>,
        audit: AuditLogger<A>,
        tokens: T,
        clock: C,
    ) -> Self {
        Self {
            user_store,
            two_factor,
            audit,
            tokens,
            clock,
        }
    }

    #[tracing::instrument(name = "VerifyTwoFactorUseCase::execute", skip(self, session_token, code))]
    pub async fn execute(
        &self,
        session_token: Secret<String>,
        code: String,
        method_kind: MethodKind,
    ) -> Result<(User, AuthTokens), VerifyTwoFactorError> {
        let now = self.clock.now();

        let session = self
            .tokens
            .verify_pending(&session_token)
            .map_err(|_| VerifyTwoFactorError::SessionInvalid)?;

        let methods = self
            .user_store
            .two_factor_methods(session.user_id)
            .await
            .map_err(VerifyTwoFactorError::UserStoreError)?;

        // A method the user never enabled fails like a wrong code; the
        // enabled set was already disclosed at login time, nowhere else.
        let Some(method) = methods.into_iter().find(|m| m.kind == method_kind) else {
            self.log_failure(session.user_id, reasons::INVALID_2FA_CODE, method_kind)
                .await;
            return Err(VerifyTwoFactorError::InvalidCode {
                attempts_remaining: None,
            });
        };

        let outcome = self
            .two_factor
            .verify(&method, &code, now)
            .await
            .map_err(VerifyTwoFactorError::TwoFactorError)?;

        if outcome.locked {
            self.log_failure(session.user_id, reasons::IS_LOCKED, method_kind)
                .await;
            return Err(VerifyTwoFactorError::Locked);
        }

        if !outcome.valid {
            self.log_failure(session.user_id, reasons::INVALID_2FA_CODE, method_kind)
                .await;
            return Err(VerifyTwoFactorError::InvalidCode {
                attempts_remaining: outcome.attempts_remaining,
            });
        }

        let user = self
            .user_store
            .find_by_id(session.user_id)
            .await
            .map_err(VerifyTwoFactorError::UserStoreError)?;

        let tokens = self
            .tokens
            .issue_final(&user, false)
            .map_err(VerifyTwoFactorError::TokenError)?;

        self.user_store
            .record_login_success(user.id, now)
            .await
            .map_err(VerifyTwoFactorError::UserStoreError)?;

        self.audit
            .log(
                AuditEvent::new(events::LOGIN, AuditStatus::Success, now)
                    .with_user(user.id)
                    .with_details(serde_json::json!({
                        "verification_method": method_kind,
                    })),
            )
            .await;

        Ok((user, tokens))
    }

    async fn log_failure(&self, user_id: uuid::Uuid, reason: &str, method_kind: MethodKind) {
        self.audit
            .log(
                AuditEvent::new(events::LOGIN, AuditStatus::Failed, self.clock.now())
                    .with_user(user_id)
                    .with_details(serde_json::json!({
                        "reason": reason,
                        "method": method_kind,
                    })),
            )
            .await;
    }
}
