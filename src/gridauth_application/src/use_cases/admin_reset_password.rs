use askama::Template;
use secrecy::ExposeSecret;
use uuid::Uuid;

use gridauth_core::{
    AuditEvent, AuditLog, AuditStatus, Clock, EmailClient, EmailPurpose, ResetTokenStore,
    ResetTokenStoreError, UserStore, UserStoreError, events,
};

use crate::services::{audit::AuditLogger, reset_token::ResetTokenService};

#[derive(Debug, thiserror::Error)]
pub enum AdminResetPasswordError {
    #[error("User not found")]
    UserNotFound,
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

/// Admin-initiated reset. Targets a user by id, so there is nothing to
/// hide: unknown users are reported, and the self-service rate window
/// does not apply.
pub struct AdminResetPasswordUseCase<U, R, A, E, C>
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

impl<U, R, A, E, C> AdminResetPasswordUseCase<U, R, A, E, C>
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

    #[tracing::instrument(name = "AdminResetPasswordUseCase::execute", skip(self))]
    pub async fn execute(&self, user_id: Uuid) -> Result<(), AdminResetPasswordError> {
        let now = self.clock.now();

        let user = match self.user_store.find_by_id(user_id).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => return Err(AdminResetPasswordError::UserNotFound),
            Err(err) => return Err(AdminResetPasswordError::UserStoreError(err)),
        };

        let plaintext = self.reset_tokens.issue(user.id, now).await?;

        self.audit
            .log(
                AuditEvent::new(events::PASSWORD_RESET_REQUESTED, AuditStatus::Success, now)
                    .with_user(user.id)
                    .with_email(user.email.as_ref().expose_secret())
                    .with_details(serde_json::json!({ "initiated_by": "admin" })),
            )
            .await;

        let reset_link = format!("{}?token={}", self.reset_base_url, plaintext.expose_secret());
        let body = PasswordResetEmail {
            reset_link: &reset_link,
        }
        .render()?;

        if let Err(err) = self
            .email_client
            .send_email(&user.email, EmailPurpose::PasswordReset, "Reset your password", &body)
            .await
        {
            tracing::warn!("failed to send password reset email: {err}");
        }

        Ok(())
    }
}
