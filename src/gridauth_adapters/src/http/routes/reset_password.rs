use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;

use crate::http::AppState;

use super::{error::AuthApiError, forgot_password::MessageBody};

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Secret<String>,
    pub new_password: Secret<String>,
    pub confirm_password: Secret<String>,
}

#[tracing::instrument(name = "Reset password", skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    state
        .reset_password_use_case()
        .execute(request.token, request.new_password, request.confirm_password)
        .await?;

    Ok(Json(MessageBody {
        success: true,
        message: "Password reset successfully".to_string(),
    }))
}
