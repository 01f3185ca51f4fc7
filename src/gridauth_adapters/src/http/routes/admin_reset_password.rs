use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::http::AppState;

use super::{error::AuthApiError, forgot_password::MessageBody};

/// Operator-initiated reset for a known user id. Unlike the self-service
/// endpoint this one reports unknown users and skips the rate window.
#[tracing::instrument(name = "Admin reset password", skip(state))]
pub async fn admin_reset_password(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthApiError> {
    state
        .admin_reset_password_use_case()
        .execute(user_id)
        .await?;

    Ok(Json(MessageBody {
        success: true,
        message: "Password reset link has been sent to the user".to_string(),
    }))
}
