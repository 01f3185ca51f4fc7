use askama::Template;
use chrono::Duration;
use secrecy::ExposeSecret;

use gridauth_core::{
    AuditEvent, AuditLog, AuditLogError, AuditStatus, Clock, Email, EmailClient, EmailPurpose,
    ResetTokenStore, ResetTokenStoreError, UserStore, UserStoreError, events,
};

use crate::services::{audit::AuditLogger, reset_token::ResetTokenService};

/// The only message the endpoint ever returns, regardless of whether the
/// account exists or a reset email went out.
pub const GENERIC_RESET_MESSAGE: &str =
    "If an account exists with this email, a password reset link has been sent";

/// Requests per email allowed inside a one-hour sliding window.
pub const RESET_REQUEST_LIMIT: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ForgotPasswordError {
    #[error("Audit log error: {0}")]
    AuditLogError(#[from] AuditLogError),
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
    #[error("Reset token store error: {0}")]
    ResetTokenStoreError(#[from] ResetTokenStoreError),
    #[error("Failed to render reset email: {0}")]
    TemplateError(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "password_reset_email.html")]
struct PasswordResetEmail<'a> {
    reset_link: &'a str,
}

/// Forgot-password use case. Every outcome looks identical to the caller;
/// the request log doubles as the rate-limit counter.
pub struct ForgotPasswordUseCase<U, R, A, E, C>
where
    U: UserStore,
    R: ResetTokenStore,
    A: AuditLog,
    E: EmailClient,
    C: Clock,
{
    user_store: U,
    reset_tokens: ResetTokenService<R>,
    audit: AuditLogger<A>,
    email_client: E,
    clock: C,
    reset_base_url: String,
}

impl<U, R, A, E, C> ForgotPasswordUseCase<U, R, A, E, C>
where
    U: UserStore,
    R: ResetTokenStore,
    A: AuditLog,
    E: EmailClient,
    C: Clock,
{
    pub fn new(
        user_store: U,
        reset_tokens: ResetTokenService<R>,
        audit: AuditLogger<A>,
        email_client: E,
        clock: C,
        reset_base_url: String,
    ) -> Self {
        Self {
            user_store,
            reset_tokens,
            audit,
            email_client,
            clock,
            reset_base_url,
        }
    }

    #[tracing::instrument(name = "ForgotPasswordUseCase::execute", skip_all)]
    pub async fn execute(&self, email: Email) -> Result<(), ForgotPasswordError> {
        let now = self.clock.now();
        let email_str = email.as_ref().expose_secret().clone();

        // Over-the-limit requests are dropped without logging, so the
        // window slides open again an hour after the first request.
        let recent = self
            .audit
            .count_since(
                events::PASSWORD_RESET_REQUESTED,
                &email_str,
                now - Duration::hours(1),
            )
            .await?;
        if recent >= RESET_REQUEST_LIMIT {
            tracing::info!("password reset request dropped by rate limit");
            return Ok(());
        }

        self.audit
            .log(
                AuditEvent::new(events::PASSWORD_RESET_REQUESTED, AuditStatus::Success, now)
                    .with_email(&email_str),
            )
            .await;

        let user = match self.user_store.find_by_email(&email).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => return Ok(()),
            Err(err) => return Err(ForgotPasswordError::UserStoreError(err)),
        };

        let plaintext = self.reset_tokens.issue(user.id, now).await?;

        let reset_link = format!("{}?token={}", self.reset_base_url, plaintext.expose_secret());
        let body = PasswordResetEmail {
            reset_link: &reset_link,
        }
        .render()?;

        if let Err(err) = self
            .email_client
            .send_email(&email, EmailPurpose::PasswordReset, "Reset your password", &body)
            .await
        {
            tracing::warn!("failed to send password reset email: {err}");
        }

        Ok(())
    }
}
