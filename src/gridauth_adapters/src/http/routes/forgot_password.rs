use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use gridauth_application::GENERIC_RESET_MESSAGE;
use gridauth_core::Email;

use crate::http::AppState;

use super::error::AuthApiError;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Secret<String>,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

/// Always answers with the same generic message; only a syntactically
/// invalid email is distinguishable from the outside.
#[tracing::instrument(name = "Forgot password", skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let email = Email::try_from(request.email)?;

    state.forgot_password_use_case().execute(email).await?;

    Ok(Json(MessageBody {
        success: true,
        message: GENERIC_RESET_MESSAGE.to_string(),
    }))
}
