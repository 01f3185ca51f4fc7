use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gridauth_application::LoginOutcome;
use gridauth_core::{AuthTokens, Email, MethodKind, User};

use crate::http::AppState;

use super::error::AuthApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Serialize)]
pub struct UserBody {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            email: user.email.as_ref().expose_secret().clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TokenBody {
    pub user: UserBody,
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct AuthenticatedBody {
    pub success: bool,
    pub data: TokenBody,
}

impl AuthenticatedBody {
    pub fn new(user: &User, tokens: AuthTokens) -> Self {
        Self {
            success: true,
            data: TokenBody {
                user: UserBody::from(user),
                token: tokens.token.expose_secret().clone(),
                refresh_token: tokens.refresh_token.expose_secret().clone(),
                expires_in: tokens.expires_in,
            },
        }
    }
}

#[derive(Serialize)]
pub struct TwoFactorRequiredBody {
    pub success: bool,
    pub requires_2fa: bool,
    pub session_token: String,
    pub available_methods: Vec<MethodKind>,
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let email = Email::try_from(request.email)?;

    let outcome = state
        .login_use_case()
        .execute(email, request.password, request.remember_me)
        .await?;

    let response = match outcome {
        LoginOutcome::Success { user, tokens } => (
            StatusCode::OK,
            Json(AuthenticatedBody::new(&user, tokens)).into_response(),
        ),
        LoginOutcome::RequiresTwoFactor {
            session_token,
            available_methods,
        } => (
            StatusCode::OK,
            Json(TwoFactorRequiredBody {
                success: true,
                requires_2fa: true,
                session_token: session_token.expose_secret().clone(),
                available_methods,
            })
            .into_response(),
        ),
    };

    Ok(response)
}
