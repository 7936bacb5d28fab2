//! Document store adapters — one uniform interface over three interchangeable
//! backends (local JSON files, hosted realtime tree, hosted document
//! collection). The backend is selected once at startup from configuration;
//! nothing above this boundary branches on which one is active.
//!
//! Backend/network failures are translated into `StoreError` here; raw
//! reqwest/io errors never escape this module.

pub mod firestore;
pub mod local;
pub mod realtime;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::auth::CredentialValidator;
use crate::models::cv::CVDocument;
use crate::models::view::ViewEvent;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The supplied credential was rejected. Raised before any I/O.
    #[error("Unauthorized")]
    Unauthorized,

    /// The document failed the structural check. Raised before any I/O.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Transient backend failure; the caller may retry the same write.
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    /// The backend returned data this service cannot interpret.
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

/// How `save_document` treats keys absent from the supplied document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Overwrite the whole stored document.
    Replace,
    /// Overlay only the top-level keys present in the supplied document,
    /// leaving other stored keys untouched.
    Merge,
}

/// The persistence contract. All operations are async; writes are
/// all-or-nothing from the caller's perspective — validation failures happen
/// before any backend interaction.
///
/// Concurrent writers are not coordinated: two sessions saving at once get
/// last-write-wins semantics. Accepted limitation for a single-admin CV.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Returns the stored document, or the documented default document if
    /// none was ever saved. Never fails solely because storage is empty.
    async fn load_document(&self) -> Result<Value, StoreError>;

    /// Persists `doc` under the given mode. Rejects with `Unauthorized` or
    /// `InvalidDocument` before touching the backend.
    async fn save_document(
        &self,
        doc: &Value,
        mode: SaveMode,
        credential: &str,
    ) -> Result<(), StoreError>;

    /// Appends one view event. Backends storing the event list as a single
    /// value apply the retention cap after appending, before persisting.
    async fn append_event(&self, event: &ViewEvent) -> Result<(), StoreError>;

    /// Returns all retained events in storage order (callers re-sort by
    /// timestamp when they need chronology).
    async fn list_events(&self) -> Result<Vec<ViewEvent>, StoreError>;
}

/// Shared pre-write gate: credential first, then document structure.
/// Runs before any backend I/O so a rejected save leaves no partial write.
pub(crate) async fn check_save(
    validator: &dyn CredentialValidator,
    credential: &str,
    doc: &Value,
) -> Result<(), StoreError> {
    if !validator.validate(credential).await {
        return Err(StoreError::Unauthorized);
    }
    CVDocument::validate(doc).map_err(StoreError::InvalidDocument)
}

/// Overlays the top-level keys of `incoming` onto `existing`. Non-object
/// inputs fall back to replacement, matching how a whole-document write
/// behaves when there is no structure to merge into.
pub(crate) fn merge_top_level(existing: &Value, incoming: &Value) -> Value {
    match (existing.as_object(), incoming.as_object()) {
        (Some(base), Some(overlay)) => {
            let mut merged: Map<String, Value> = base.clone();
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => incoming.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SharedSecretValidator;
    use serde_json::json;

    #[test]
    fn test_merge_overlays_only_supplied_keys() {
        let existing = json!({
            "personalInfo": {"name": "Old", "title": "Old title"},
            "contact": {"email": "old@example.com"},
            "extracurriculars": ["chess"]
        });
        let incoming = json!({
            "personalInfo": {"name": "New", "title": "New title"},
            "contact": {"email": "new@example.com"}
        });
        let merged = merge_top_level(&existing, &incoming);
        assert_eq!(merged["personalInfo"]["name"], json!("New"));
        assert_eq!(merged["contact"]["email"], json!("new@example.com"));
        // Keys absent from the payload survive.
        assert_eq!(merged["extracurriculars"], json!(["chess"]));
    }

    #[test]
    fn test_merge_replaces_top_level_values_wholesale() {
        let existing = json!({"skills": {"programming": ["C"], "tools": ["git"]}});
        let incoming = json!({"skills": {"programming": ["Rust"]}});
        let merged = merge_top_level(&existing, &incoming);
        // Merge depth is one level: the whole `skills` value is replaced.
        assert_eq!(merged["skills"], json!({"programming": ["Rust"]}));
    }

    #[test]
    fn test_merge_with_non_object_falls_back_to_replace() {
        let merged = merge_top_level(&json!(null), &json!({"a": 1}));
        assert_eq!(merged, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_check_save_rejects_bad_credential_before_validation() {
        let validator = SharedSecretValidator::new("right".to_string());
        // Document is also invalid, but the credential check comes first.
        let err = check_save(&validator, "wrong", &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_check_save_rejects_incomplete_document() {
        let validator = SharedSecretValidator::new("right".to_string());
        let err = check_save(&validator, "right", &json!({"contact": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_check_save_accepts_valid_pair() {
        let validator = SharedSecretValidator::new("right".to_string());
        let doc = crate::models::cv::CVDocument::default_value();
        assert!(check_save(&validator, "right", &doc).await.is_ok());
    }
}
