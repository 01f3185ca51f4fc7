use secrecy::Secret;

use gridauth_core::{
    AuditEvent, AuditLog, AuditStatus, AuthTokens, BackupCodeStore, Clock, Email, EmailClient,
    EmailPurpose, MethodKind, OtpChallengeStore, TokenError, TokenIssuer, User, UserStore,
    UserStoreError, events, reasons,
};

use crate::services::{audit::AuditLogger, two_factor::TwoFactorService};

/// Response from the login use case.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials valid, no 2FA enabled - fully authenticated.
    Success { user: User, tokens: AuthTokens },
    /// Credentials valid but 2FA is outstanding. No access granted yet;
    /// the client must come back through verify-2fa with one of the
    /// listed methods.
    RequiresTwoFactor {
        session_token: Secret<String>,
        available_methods: Vec<MethodKind>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Unknown user, wrong password, inactive and locked accounts all
    /// collapse into this one variant - the caller must not learn which.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

/// Login use case: credential check, then either final token issuance or
/// a pending-2FA session token.
pub struct LoginUseCase<U, O, B, A, T, E, C>
where
    U: UserStore,
    O: OtpChallengeStore,
    B: BackupCodeStore,
    A: AuditLog,
    T: TokenIssuer,
    E: EmailClient,
    C: Clock,
{
    user_store: U,
    two_factor: TwoFactorService<O, B>,
    audit: AuditLogger<A>,
    tokens: T,
    email_client: E,
    clock: C,
}

impl<U, O, B, A, T, E, C> LoginUseCase<U, O, B, A, T, E, C>
where
    U: UserStore,
    O: OtpChallengeStore,
    B: BackupCodeStore,
    A: AuditLog,
    T: TokenIssuer,
    E: EmailClient,
    C: Clock,
{
    pub fn new(
        user_store: U,
        two_factor: TwoFactorService<O, B>,
        audit: AuditLogger<A>,
        tokens: T,
        email_client: E,
        clock: C,
    ) -> Self {
        Self {
            user_store,
            two_factor,
            audit,
            tokens,
            email_client,
            clock,
        }
    }

    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        email: Email,
        password: Secret<String>,
        remember_me: bool,
    ) -> Result<LoginOutcome, LoginError> {
        let now = self.clock.now();

        let user = match self.user_store.verify_credentials(&email, &password).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => {
                return Err(self.log_rejected(&email, reasons::UNKNOWN_USER).await);
            }
            Err(UserStoreError::IncorrectPassword) => {
                // Bump the failure counter when the account exists.
                if let Ok(user) = self.user_store.find_by_email(&email).await {
                    let _ = self.user_store.record_login_failure(user.id).await;
                }
                return Err(self.log_rejected(&email, reasons::INCORRECT_PASSWORD).await);
            }
            Err(e) => return Err(LoginError::UserStoreError(e)),
        };

        if !user.can_authenticate(now) {
            return Err(self.log_rejected(&email, reasons::ACCOUNT_UNAVAILABLE).await);
        }

        let methods = self
            .user_store
            .two_factor_methods(user.id)
            .await
            .map_err(LoginError::UserStoreError)?;

        if methods.is_empty() {
            return self.complete_without_2fa(user, remember_me).await;
        }

        self.require_two_factor(user, methods).await
    }

    /// Credential failure: audit and collapse into the generic error.
    async fn log_rejected(&self, email: &Email, reason: &str) -> LoginError {
        use secrecy::ExposeSecret;

        self.audit
            .log(
                AuditEvent::new(events::LOGIN, AuditStatus::Failed, self.clock.now())
                    .with_email(email.as_ref().expose_secret())
                    .with_details(serde_json::json!({ "reason": reason })),
            )
            .await;

        LoginError::InvalidCredentials
    }

    async fn complete_without_2fa(
        &self,
        user: User,
        remember_me: bool,
    ) -> Result<LoginOutcome, LoginError> {
        let now = self.clock.now();
        let tokens = self.tokens.issue_final(&user, remember_me)?;

        self.user_store
            .record_login_success(user.id, now)
            .await
            .map_err(LoginError::UserStoreError)?;

        self.audit
            .log(
                AuditEvent::new(events::LOGIN, AuditStatus::Success, now)
                    .with_user(user.id)
                    .with_details(serde_json::json!({ "method": "password" })),
            )
            .await;

        Ok(LoginOutcome::Success { user, tokens })
    }

    async fn require_two_factor(
        &self,
        user: User,
        methods: Vec<gridauth_core::TwoFactorMethod>,
    ) -> Result<LoginOutcome, LoginError> {
        let now = self.clock.now();
        let session_token = self.tokens.issue_pending(&user)?;

        let mut available_methods = Vec::new();
        for method in &methods {
            if !available_methods.contains(&method.kind) {
                available_methods.push(method.kind);
            }
        }

        // Kick off out-of-band code delivery for email OTP. Delivery
        // failures are logged and swallowed: the pending session stays
        // usable through the other methods.
        if let Some(method) = methods.iter().find(|m| m.kind == MethodKind::EmailOtp) {
            match self.two_factor.issue_challenge(method, now).await {
                Ok(code) => {
                    if let Err(e) = self
                        .email_client
                        .send_email(
                            &user.email,
                            EmailPurpose::VerificationCode,
                            "Your verification code",
                            &code,
                        )
                        .await
                    {
                        tracing::warn!(error = %e, "failed to deliver email OTP code");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to issue email OTP challenge"),
            }
        }
        if let Some(method) = methods.iter().find(|m| m.kind == MethodKind::SmsOtp) {
            // SMS transport is an external collaborator; the challenge is
            // stored so the gateway relay can pick it up.
            if let Err(e) = self.two_factor.issue_challenge(method, now).await {
                tracing::warn!(error = %e, "failed to issue SMS OTP challenge");
            }
        }

        self.audit
            .log(
                AuditEvent::new(events::LOGIN, AuditStatus::Pending2fa, now)
                    .with_user(user.id)
                    .with_details(serde_json::json!({
                        "available_methods": available_methods,
                    })),
            )
            .await;

        Ok(LoginOutcome::RequiresTwoFactor {
            session_token,
            available_methods,
        })
    }
}
