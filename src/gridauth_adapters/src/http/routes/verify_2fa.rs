use std::str::FromStr;

use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;

use gridauth_core::MethodKind;

use crate::http::AppState;

use super::{error::AuthApiError, login::AuthenticatedBody};

#[derive(Debug, Deserialize)]
pub struct VerifyTwoFactorRequest {
    pub session_token: Secret<String>,
    pub code: String,
    pub method: String,
}

#[tracing::instrument(name = "Verify 2FA", skip_all)]
pub async fn verify_2fa(
    State(state): State<AppState>,
    Json(request): Json<VerifyTwoFactorRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let method = MethodKind::from_str(&request.method)
        .map_err(|e| AuthApiError::InvalidInput(e.to_string()))?;

    let (user, tokens) = state
        .verify_two_factor_use_case()
        .execute(request.session_token, request.code, method)
        .await?;

    Ok(Json(AuthenticatedBody::new(&user, tokens)))
}
