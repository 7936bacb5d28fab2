use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::SaveMode;

const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";
const ADMIN_PASSWORD_BODY_KEY: &str = "adminPassword";

/// GET /api/cv
/// Returns the stored document, or the default document if none was saved yet.
pub async fn handle_get_cv(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.store.load_document().await?))
}

/// PUT /api/cv
/// Replaces the stored document. Requires the admin credential in the
/// `x-admin-password` header (or, for older clients, an `adminPassword` key
/// in the payload — stripped before storing either way). 401 on a bad
/// credential, 400 when `personalInfo` or `contact` is missing.
pub async fn handle_update_cv(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let credential = extract_credential(&headers, &payload);
    if let Some(doc) = payload.as_object_mut() {
        doc.remove(ADMIN_PASSWORD_BODY_KEY);
    }
    state
        .store
        .save_document(&payload, SaveMode::Replace, &credential)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "CV data updated successfully"
    })))
}

fn extract_credential(headers: &HeaderMap, payload: &Value) -> String {
    headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
        .or_else(|| {
            payload
                .get(ADMIN_PASSWORD_BODY_KEY)
                .and_then(Value::as_str)
        })
        .unwrap_or_default()
        .to_string()
}
