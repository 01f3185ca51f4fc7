use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use gridauth_application::{
    AdminResetPasswordError, ForgotPasswordError, LoginError, ResetPasswordError, TwoFactorError,
    VerifyTwoFactorError,
};
use gridauth_core::{EmailError, PasswordError, TokenError, UserStoreError};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session token expired or invalid")]
    SessionInvalid,

    #[error("Invalid two-factor authentication code")]
    InvalidTwoFaCode { attempts_remaining: Option<i32> },

    #[error("Two-factor method is locked. Please restart the login process")]
    TwoFaLocked,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Password does not meet requirements")]
    WeakPassword(Vec<PasswordError>),

    #[error("User not found")]
    UserNotFound,

    #[error("Unexpected error")]
    UnexpectedError(String),
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        // The cause of an internal error goes to the trace, never the wire.
        if let AuthApiError::UnexpectedError(cause) = &self {
            tracing::error!(%cause, "request failed with internal error");
        }

        let (status_code, details, errors) = match &self {
            AuthApiError::InvalidInput(_)
            | AuthApiError::PasswordMismatch
            | AuthApiError::InvalidResetToken => (StatusCode::BAD_REQUEST, None, None),

            AuthApiError::WeakPassword(violations) => (
                StatusCode::BAD_REQUEST,
                None,
                Some(violations.iter().map(|v| v.to_string()).collect()),
            ),

            AuthApiError::InvalidCredentials | AuthApiError::SessionInvalid => {
                (StatusCode::UNAUTHORIZED, None, None)
            }

            AuthApiError::InvalidTwoFaCode { attempts_remaining } => (
                StatusCode::UNAUTHORIZED,
                attempts_remaining
                    .map(|remaining| serde_json::json!({ "attempts_remaining": remaining })),
                None,
            ),

            AuthApiError::TwoFaLocked => (
                StatusCode::UNAUTHORIZED,
                Some(serde_json::json!({ "is_locked": true })),
                None,
            ),

            AuthApiError::UserNotFound => (StatusCode::NOT_FOUND, None, None),

            AuthApiError::UnexpectedError(_) => (StatusCode::INTERNAL_SERVER_ERROR, None, None),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
            details,
            errors,
        });

        (status_code, body).into_response()
    }
}

impl From<EmailError> for AuthApiError {
    fn from(error: EmailError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<UserStoreError> for AuthApiError {
    fn from(error: UserStoreError) -> Self {
        match error {
            UserStoreError::UserNotFound => AuthApiError::UserNotFound,
            UserStoreError::IncorrectPassword => AuthApiError::InvalidCredentials,
            UserStoreError::UnexpectedError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<TokenError> for AuthApiError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::InvalidSession => AuthApiError::SessionInvalid,
            TokenError::UnexpectedError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<LoginError> for AuthApiError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::InvalidCredentials => AuthApiError::InvalidCredentials,
            LoginError::UserStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
            LoginError::TokenError(e) => e.into(),
        }
    }
}

impl From<VerifyTwoFactorError> for AuthApiError {
    fn from(error: VerifyTwoFactorError) -> Self {
        match error {
            VerifyTwoFactorError::SessionInvalid => AuthApiError::SessionInvalid,
            VerifyTwoFactorError::InvalidCode { attempts_remaining } => {
                AuthApiError::InvalidTwoFaCode { attempts_remaining }
            }
            VerifyTwoFactorError::Locked => AuthApiError::TwoFaLocked,
            VerifyTwoFactorError::UserStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
            VerifyTwoFactorError::TwoFactorError(e) => e.into(),
            VerifyTwoFactorError::TokenError(e) => e.into(),
        }
    }
}

impl From<TwoFactorError> for AuthApiError {
    fn from(error: TwoFactorError) -> Self {
        AuthApiError::UnexpectedError(error.to_string())
    }
}

impl From<ForgotPasswordError> for AuthApiError {
    fn from(error: ForgotPasswordError) -> Self {
        AuthApiError::UnexpectedError(error.to_string())
    }
}

impl From<ResetPasswordError> for AuthApiError {
    fn from(error: ResetPasswordError) -> Self {
        match error {
            ResetPasswordError::PasswordMismatch => AuthApiError::PasswordMismatch,
            ResetPasswordError::InvalidToken => AuthApiError::InvalidResetToken,
            ResetPasswordError::WeakPassword(violations) => AuthApiError::WeakPassword(violations),
            ResetPasswordError::UserNotFound => AuthApiError::UserNotFound,
            ResetPasswordError::UserStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
            ResetPasswordError::ResetTokenStoreError(e) => {
                AuthApiError::UnexpectedError(e.to_string())
            }
        }
    }
}

impl From<AdminResetPasswordError> for AuthApiError {
    fn from(error: AdminResetPasswordError) -> Self {
        match error {
            AdminResetPasswordError::UserNotFound => AuthApiError::UserNotFound,
            AdminResetPasswordError::UserStoreError(e) => {
                AuthApiError::UnexpectedError(e.to_string())
            }
            AdminResetPasswordError::ResetTokenStoreError(e) => {
                AuthApiError::UnexpectedError(e.to_string())
            }
            AdminResetPasswordError::TemplateError(e) => {
                AuthApiError::UnexpectedError(e.to_string())
            }
        }
    }
}
