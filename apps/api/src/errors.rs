#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Taxonomy:
/// - `Validation` — malformed/incomplete document; the user must correct input.
/// - `Authentication` — bad credential at sign-in; the user is re-prompted.
/// - `Unauthorized` — credential rejected at save time; the session is forced
///   back to unauthenticated while edits stay in memory.
/// - `Save` — transient backend failure; safe to retry, working copy untouched.
/// - `NotFound` — only surfaces for routes; a missing document resolves to the
///   default document inside the store adapters and never reaches callers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed")]
    Authentication,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Save failed: {0}")]
    Save(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized => AppError::Unauthorized,
            StoreError::InvalidDocument(msg) => AppError::Validation(msg),
            StoreError::Unavailable(msg) => AppError::Save(msg),
            StoreError::Corrupt(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Authentication => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_FAILED",
                "Invalid password".to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized. Invalid admin password.".to_string(),
            ),
            AppError::Save(msg) => {
                tracing::error!("Save error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SAVE_ERROR",
                    "The storage backend did not accept the write. Please retry.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
