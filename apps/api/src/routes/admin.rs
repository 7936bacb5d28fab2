use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AuthenticateRequest {
    pub password: String,
}

/// POST /api/admin/authenticate
/// Validates a submitted secret against the configured admin credential.
pub async fn handle_authenticate(
    State(state): State<AppState>,
    Json(request): Json<AuthenticateRequest>,
) -> Result<Json<Value>, AppError> {
    if state.validator.validate(&request.password).await {
        Ok(Json(json!({ "success": true, "message": "Authenticated" })))
    } else {
        Err(AppError::Authentication)
    }
}
